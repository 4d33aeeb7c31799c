use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EntityId, util::in_amount_range};

/// A bought item waiting in (or gone from) the inventory.
///
/// `total_cost`, `cash_paid` and `remaining_debt` are derived fields; the
/// ledger keeps them consistent on every mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: EntityId,
    pub date: NaiveDate,
    pub model: String,
    pub buy_price: i64,
    #[serde(default)]
    pub delivery_cost: i64,
    #[serde(default)]
    pub extra_cost: i64,
    pub total_cost: i64,
    /// Debt base owed to the seller, fixed at creation/edit.
    #[serde(default)]
    pub purchase_debt: i64,
    /// Cached `max(0, purchase_debt - paid)`.
    #[serde(default)]
    pub remaining_debt: i64,
    pub cash_paid: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sold: bool,
}

impl Purchase {
    /// Checks the per-record rules. `paid` is the sum of the payments recorded
    /// against this purchase.
    pub(crate) fn check(&self, paid: i64) -> Result<(), String> {
        let id = self.id;
        if ![self.buy_price, self.delivery_cost, self.extra_cost, self.purchase_debt]
            .into_iter()
            .all(in_amount_range)
        {
            return Err(format!("purchase #{id} has an amount out of range"));
        }
        let total = self
            .buy_price
            .checked_add(self.delivery_cost)
            .and_then(|sum| sum.checked_add(self.extra_cost));
        if total != Some(self.total_cost) {
            return Err(format!("purchase #{id} total cost does not add up"));
        }
        if self.purchase_debt < 0 || self.purchase_debt > self.total_cost {
            return Err(format!("purchase #{id} debt exceeds its total cost"));
        }
        if self.cash_paid != self.total_cost - self.purchase_debt {
            return Err(format!("purchase #{id} cash paid does not add up"));
        }
        if paid > self.purchase_debt {
            return Err(format!("purchase #{id} is paid beyond its debt"));
        }
        if self.purchase_debt.checked_sub(paid) != Some(self.remaining_debt) {
            return Err(format!("purchase #{id} remaining debt is stale"));
        }
        Ok(())
    }
}
