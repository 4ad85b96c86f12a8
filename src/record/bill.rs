use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{FieldValue, Record};

/// Settlement status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BillStatus {
    Draft,
    #[default]
    Unpaid,
    Partial,
    Paid,
    Cancelled,
}

impl BillStatus {
    pub const CHOICES: &'static str = "paid, unpaid, partial, draft, cancelled";

    pub fn label(self) -> &'static str {
        match self {
            BillStatus::Draft => "Draft",
            BillStatus::Unpaid => "Unpaid",
            BillStatus::Partial => "Partial",
            BillStatus::Paid => "Paid",
            BillStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(BillStatus::Draft),
            "unpaid" | "pending" => Ok(BillStatus::Unpaid),
            "partial" => Ok(BillStatus::Partial),
            "paid" => Ok(BillStatus::Paid),
            "cancelled" | "canceled" => Ok(BillStatus::Cancelled),
            other => Err(format!("unknown bill status '{other}'")),
        }
    }
}

impl TryFrom<String> for BillStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillStatus> for String {
    fn from(value: BillStatus) -> Self {
        value.label().to_string()
    }
}

/// How a bill was (or will be) settled. Independent of [`BillStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMode {
    Cash,
    Online,
    Credit,
}

impl PaymentMode {
    pub const CHOICES: &'static str = "cash, online, credit";

    pub fn label(self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Online => "Online",
            PaymentMode::Credit => "Credit",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "online" => Ok(PaymentMode::Online),
            "credit" => Ok(PaymentMode::Credit),
            other => Err(format!("unknown payment mode '{other}'")),
        }
    }
}

impl TryFrom<String> for PaymentMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentMode> for String {
    fn from(value: PaymentMode) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub total: f64,
}

/// A sales invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    pub bill_date: NaiveDateTime,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub grand_total: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub items: Vec<BillItem>,
    #[serde(default)]
    pub deleted_at: Option<NaiveDateTime>,
}

impl Bill {
    /// Amount still owed on this bill, never negative.
    pub fn dues(&self) -> f64 {
        (self.grand_total - self.paid_amount).max(0.0)
    }

    pub fn item_quantity(&self) -> f64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl Record for Bill {
    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &str {
        &self.owner_id
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.bill_date
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => FieldValue::from(self.id.as_str()),
            "owner_id" => FieldValue::from(self.owner_id.as_str()),
            "invoice_number" => FieldValue::from(self.invoice_number.as_str()),
            "customer_id" => FieldValue::from(self.customer_id.clone()?),
            "customer_name" => FieldValue::from(self.customer_name.as_str()),
            "bill_date" | "date" => FieldValue::from(self.bill_date),
            "subtotal" => FieldValue::from(self.subtotal),
            "tax_amount" => FieldValue::from(self.tax_amount),
            "discount_amount" => FieldValue::from(self.discount_amount),
            "grand_total" | "total" => FieldValue::from(self.grand_total),
            "paid_amount" | "paid" => FieldValue::from(self.paid_amount),
            "dues" => FieldValue::from(self.dues()),
            "status" => FieldValue::from(self.status.label()),
            "payment_mode" | "mode" => FieldValue::from(self.payment_mode?.label()),
            "item_count" => FieldValue::from(self.items.len() as f64),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(total: f64, paid: f64) -> Bill {
        Bill {
            id: "b1".into(),
            owner_id: "shop".into(),
            invoice_number: "INV-1".into(),
            customer_id: None,
            customer_name: "Asha".into(),
            bill_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            subtotal: total,
            tax_amount: 0.0,
            discount_amount: 0.0,
            grand_total: total,
            paid_amount: paid,
            status: BillStatus::Partial,
            payment_mode: None,
            items: Vec::new(),
            deleted_at: None,
        }
    }

    #[test]
    fn dues_never_negative() {
        assert_eq!(bill(100.0, 40.0).dues(), 60.0);
        assert_eq!(bill(100.0, 120.0).dues(), 0.0);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("PAID".parse::<BillStatus>(), Ok(BillStatus::Paid));
        assert_eq!("Pending".parse::<BillStatus>(), Ok(BillStatus::Unpaid));
        assert!("settled".parse::<BillStatus>().is_err());
    }

    #[test]
    fn missing_optional_fields_are_absent() {
        let b = bill(10.0, 0.0);
        assert_eq!(b.field("payment_mode"), None);
        assert_eq!(b.field("customer_id"), None);
        assert_eq!(b.field("no_such_field"), None);
        assert_eq!(b.field("status"), Some(FieldValue::from("Partial")));
    }

    #[test]
    fn deserializes_upper_case_status() {
        let json = r#"{"id":"1","owner_id":"s","bill_date":"2024-03-10T10:00:00",
            "grand_total":50.0,"status":"PAID","payment_mode":"cash"}"#;
        let b: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(b.status, BillStatus::Paid);
        assert_eq!(b.payment_mode, Some(PaymentMode::Cash));
    }
}
