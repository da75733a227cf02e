use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillError;

/// Recurrence unit of a bill. `Unique` marks a one-time bill that never advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Unique,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Daily => "daily",
            BillingInterval::Weekly => "weekly",
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
            BillingInterval::Unique => "unique",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, BillingInterval::Unique)
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingInterval {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(BillingInterval::Daily),
            "weekly" => Ok(BillingInterval::Weekly),
            "monthly" => Ok(BillingInterval::Monthly),
            "yearly" => Ok(BillingInterval::Yearly),
            "unique" => Ok(BillingInterval::Unique),
            other => Err(BillError::InvalidInput(format!("unknown billing interval '{}'", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub billing_interval: BillingInterval,
    /// ISO-8601 timestamp of the next due date.
    pub next_billing_date: String,
    /// Serialized reminder schema, see `reminders::serialize_reminder_schema`.
    pub reminder_schema: Option<String>,
    pub category_group: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub created_at: String,
}

/// Input for creating a bill; the id, reminder schema and timestamps are assigned on insert.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub billing_interval: BillingInterval,
    pub next_billing_date: String,
    #[serde(default)]
    pub category_group: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: i64,
    pub bill_id: i64,
    pub bill_name: String,
    pub amount: f64,
    pub currency: String,
    /// Due date this payment settled.
    pub billing_date: String,
    pub paid_at: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category_group: String,
    pub currency: String,
    pub total: f64,
    pub payments: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub currency: String,
    pub total: f64,
}
