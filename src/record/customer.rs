use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_billed: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub total_dues: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub deleted_at: Option<NaiveDateTime>,
}

impl Record for Customer {
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
            "phone" => FieldValue::from(self.phone.clone()?),
            "email" => FieldValue::from(self.email.clone()?),
            "total_billed" => FieldValue::from(self.total_billed),
            "total_paid" => FieldValue::from(self.total_paid),
            "total_dues" | "dues" => FieldValue::from(self.total_dues),
            "is_active" | "active" => FieldValue::from(self.is_active),
            "created_at" | "date" => FieldValue::from(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}
