use super::moving_average::sma_series;
use serde::{Deserialize, Serialize};

/// Bollinger Bands: rolling SMA ± k population standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands aligned by index, undefined for `i < period - 1`
pub fn bollinger_series(
    prices: &[f64],
    period: usize,
    num_std: f64,
) -> Vec<Option<BollingerValue>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    let middles = sma_series(prices, period);
    for (i, middle) in middles.iter().enumerate() {
        let Some(middle) = *middle else { continue };
        let window = &prices[i + 1 - period..=i];
        let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        out[i] = Some(BollingerValue {
            upper: middle + num_std * std,
            middle,
            lower: middle - num_std * std,
        });
    }

    out
}
