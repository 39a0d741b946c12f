use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TradeSide;
use crate::risk::TradeSetup;

/// Order handed to the exchange-facing sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub client_order_id: Uuid,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: f64,
}

impl OrderRequest {
    /// Build an order from a trade setup
    ///
    /// Returns None when the size is not a positive finite quantity
    /// (degenerate risk settings).
    pub fn from_setup(symbol: &str, setup: &TradeSetup) -> Option<Self> {
        if !setup.position_size.is_finite() || setup.position_size <= 0.0 {
            return None;
        }

        Some(Self {
            client_order_id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            side: setup.side,
            quantity: setup.position_size,
        })
    }
}

/// Opaque order destination (exchange client, paper account, ...)
pub trait OrderSink: Send + Sync {
    fn submit(&self, order: &OrderRequest) -> anyhow::Result<()>;
}

/// Records orders instead of sending them anywhere
#[derive(Default)]
pub struct PaperOrderSink {
    submitted: Mutex<Vec<OrderRequest>>,
}

impl PaperOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }
}

impl OrderSink for PaperOrderSink {
    fn submit(&self, order: &OrderRequest) -> anyhow::Result<()> {
        let mut submitted = self
            .submitted
            .lock()
            .map_err(|e| anyhow::anyhow!("paper order book poisoned: {}", e))?;

        tracing::info!(
            id = %order.client_order_id,
            symbol = %order.symbol,
            side = %order.side,
            quantity = order.quantity,
            "Paper order submitted"
        );

        submitted.push(order.clone());
        Ok(())
    }
}
