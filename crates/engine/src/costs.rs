use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// An operating cost. Always reduces the cash balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub id: EntityId,
    pub date: NaiveDate,
    pub title: String,
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    /// Set when the cost mirrors a partner's `personal_expense`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_transaction_id: Option<EntityId>,
}
