/// Calculate Simple Moving Average (SMA) of the trailing `period` values
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// SMA aligned by index: `out[i]` covers `values[i + 1 - period..=i]`
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }

    out
}

/// Exponential Moving Average (EMA) aligned by index
///
/// Undefined for `i < period - 1`. Seeded with the SMA of the first `period`
/// values, then `ema[i] = v[i] * k + ema[i - 1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);

    // Start with SMA
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);

    for (i, value) in values.iter().enumerate().skip(period) {
        ema = value * k + ema * (1.0 - k);
        out[i] = Some(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_sma_series_alignment() {
        let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = sma_series(&prices, 3);
        assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_ema_defined_from_period_minus_one() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();

        for period in [1, 7, 25] {
            let ema = ema_series(&prices, period);
            assert_eq!(ema.len(), prices.len());
            for (i, value) in ema.iter().enumerate() {
                assert_eq!(value.is_some(), i + 1 >= period, "period {} index {}", period, i);
            }
        }
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = ema_series(&prices, 5);

        assert_eq!(ema[4], Some(104.0));
        // k = 1/3: 110/3 + 104*2/3 = 106
        assert!((ema[5].unwrap() - 106.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_constant_series() {
        let prices = vec![42.0; 150];
        let ema = ema_series(&prices, 99);

        for value in ema.iter().skip(98) {
            assert!((value.unwrap() - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_insufficient_data() {
        let ema = ema_series(&[1.0, 2.0], 7);
        assert!(ema.iter().all(|v| v.is_none()));
    }
}
