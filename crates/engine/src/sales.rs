use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EntityId, MAX_AMOUNT, util::in_amount_range};

/// The sale of exactly one purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: EntityId,
    pub date: NaiveDate,
    pub purchase_id: EntityId,
    pub model: String,
    /// `Purchase::total_cost` at sale time.
    pub purchase_price: i64,
    pub sell_price: i64,
    /// Debt base owed by the customer, fixed at creation/edit.
    #[serde(default)]
    pub debt: i64,
    /// Cached `max(0, debt - paid)`.
    #[serde(default)]
    pub remaining_debt: i64,
    pub profit: i64,
    pub cash_received: i64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
}

impl Sale {
    pub(crate) fn check(&self, paid: i64) -> Result<(), String> {
        let id = self.id;
        // A purchase price is the sum of three capped components.
        if !in_amount_range(self.sell_price)
            || !in_amount_range(self.debt)
            || !(0..=3 * MAX_AMOUNT).contains(&self.purchase_price)
        {
            return Err(format!("sale #{id} has an amount out of range"));
        }
        if self.debt < 0 || self.debt > self.sell_price {
            return Err(format!("sale #{id} debt exceeds its sell price"));
        }
        if self.profit != self.sell_price - self.purchase_price {
            return Err(format!("sale #{id} profit does not add up"));
        }
        if self.cash_received != self.sell_price - self.debt {
            return Err(format!("sale #{id} cash received does not add up"));
        }
        if paid > self.debt {
            return Err(format!("sale #{id} is paid beyond its debt"));
        }
        if self.debt.checked_sub(paid) != Some(self.remaining_debt) {
            return Err(format!("sale #{id} remaining debt is stale"));
        }
        Ok(())
    }
}
