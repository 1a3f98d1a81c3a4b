use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inventory record. The id is assigned by the store on first insert and
/// never changes afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Derived total amount, computed on read and never persisted.
    pub fn total(&self) -> i64 {
        total(self.quantity, self.unit_price)
    }
}

/// quantity × unit price; 0 when either factor is absent so incomplete
/// records render instead of failing.
pub fn total(quantity: Option<i64>, unit_price: Option<i64>) -> i64 {
    match (quantity, unit_price) {
        (Some(q), Some(u)) => q * u,
        _ => 0,
    }
}
