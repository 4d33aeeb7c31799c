//! Installments against sale and purchase debts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Money collected from a customer against a sale's debt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: EntityId,
    pub sale_id: EntityId,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(default)]
    pub notes: String,
}

/// Money paid to a seller against a purchase's debt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDebtPayment {
    pub id: EntityId,
    pub purchase_id: EntityId,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(default)]
    pub notes: String,
}
