use serde::{Deserialize, Serialize};

use super::Id;

/// A stock position. Prices are entered by the user; nothing here looks
/// quotes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Id,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    pub average_price: i64,
    pub current_price: i64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: i64, average_price: i64) -> Self {
        Self {
            id: Id::new(),
            symbol: symbol.into(),
            name: String::new(),
            quantity,
            average_price,
            current_price: average_price,
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_current_price(mut self, price: i64) -> Self {
        self.current_price = price;
        self
    }
}
