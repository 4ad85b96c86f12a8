use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_low_stock_threshold() -> f64 {
    10.0
}

/// A stock line the shop sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub selling_price: f64,
    #[serde(default)]
    pub stock_quantity: f64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: f64,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub deleted_at: Option<NaiveDateTime>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    pub fn stock_value(&self) -> f64 {
        self.stock_quantity * self.selling_price
    }
}

impl Record for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &str {
        &self.owner_id
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.created_at
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => FieldValue::from(self.id.as_str()),
            "owner_id" => FieldValue::from(self.owner_id.as_str()),
            "name" => FieldValue::from(self.name.as_str()),
            "category" => FieldValue::from(self.category.clone()?),
            "unit" => FieldValue::from(self.unit.as_str()),
            "selling_price" | "price" => FieldValue::from(self.selling_price),
            "stock_quantity" | "quantity" => FieldValue::from(self.stock_quantity),
            "low_stock_threshold" => FieldValue::from(self.low_stock_threshold),
            "low_stock" => FieldValue::from(self.is_low_stock()),
            "created_at" | "date" => FieldValue::from(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}
