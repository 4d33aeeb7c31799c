//! Command structs for ledger operations.
//!
//! These types group the parameters of write operations, keeping call sites
//! readable and avoiding long argument lists. Optional parts default to zero
//! or empty text and are set with the chained setters.

use chrono::NaiveDate;

use crate::{EntityId, PartnerId, PartnerTxKind};

/// Buy a new item into the inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPurchase {
    pub date: NaiveDate,
    pub model: String,
    pub buy_price: i64,
    pub delivery_cost: i64,
    pub extra_cost: i64,
    pub purchase_debt: i64,
    pub notes: String,
}

impl NewPurchase {
    #[must_use]
    pub fn new(date: NaiveDate, model: impl Into<String>, buy_price: i64) -> Self {
        Self {
            date,
            model: model.into(),
            buy_price,
            delivery_cost: 0,
            extra_cost: 0,
            purchase_debt: 0,
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn delivery_cost(mut self, amount: i64) -> Self {
        self.delivery_cost = amount;
        self
    }

    #[must_use]
    pub fn extra_cost(mut self, amount: i64) -> Self {
        self.extra_cost = amount;
        self
    }

    #[must_use]
    pub fn purchase_debt(mut self, amount: i64) -> Self {
        self.purchase_debt = amount;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Replace the editable fields of an unsold purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseUpdate {
    pub model: String,
    pub buy_price: i64,
    pub delivery_cost: i64,
    pub extra_cost: i64,
    pub purchase_debt: i64,
    pub notes: String,
}

/// Sell an unsold purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSale {
    pub date: NaiveDate,
    pub purchase_id: EntityId,
    pub sell_price: i64,
    pub debt: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
}

impl NewSale {
    #[must_use]
    pub fn new(date: NaiveDate, purchase_id: EntityId, sell_price: i64) -> Self {
        Self {
            date,
            purchase_id,
            sell_price,
            debt: 0,
            customer_name: String::new(),
            customer_phone: String::new(),
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn debt(mut self, amount: i64) -> Self {
        self.debt = amount;
        self
    }

    #[must_use]
    pub fn customer(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self.customer_phone = phone.into();
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleUpdate {
    pub sell_price: i64,
    pub debt: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCost {
    pub date: NaiveDate,
    pub title: String,
    pub amount: i64,
    pub description: String,
}

impl NewCost {
    #[must_use]
    pub fn new(date: NaiveDate, title: impl Into<String>, amount: i64) -> Self {
        Self {
            date,
            title: title.into(),
            amount,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostUpdate {
    pub title: String,
    pub amount: i64,
    pub description: String,
}

/// One installment against a sale or purchase debt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebtPaymentNew {
    pub date: NaiveDate,
    /// Sale id or purchase id, depending on the operation.
    pub target: EntityId,
    pub amount: i64,
    pub notes: String,
}

impl DebtPaymentNew {
    #[must_use]
    pub fn new(date: NaiveDate, target: EntityId, amount: i64) -> Self {
        Self {
            date,
            target,
            amount,
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPartnerTransaction {
    pub date: NaiveDate,
    pub partner: PartnerId,
    pub kind: PartnerTxKind,
    pub amount: i64,
    pub description: String,
}

impl NewPartnerTransaction {
    #[must_use]
    pub fn new(date: NaiveDate, partner: PartnerId, kind: PartnerTxKind, amount: i64) -> Self {
        Self {
            date,
            partner,
            kind,
            amount,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
