//! Audit log rows.
//!
//! A `Transaction` mirrors the cash effect of one ledger mutation for humans
//! to read. Balances are never computed from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Capital,
    Purchase,
    Sale,
    Cost,
    SaleDebtPayment,
    PurchaseDebtPayment,
    Partner,
    Restore,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capital => "capital",
            Self::Purchase => "purchase",
            Self::Sale => "sale",
            Self::Cost => "cost",
            Self::SaleDebtPayment => "sale_debt_payment",
            Self::PurchaseDebtPayment => "purchase_debt_payment",
            Self::Partner => "partner",
            Self::Restore => "restore",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Capital => "Capital",
            Self::Purchase => "Purchase",
            Self::Sale => "Sale",
            Self::Cost => "Cost",
            Self::SaleDebtPayment => "Sale debt received",
            Self::PurchaseDebtPayment => "Purchase debt paid",
            Self::Partner => "Partner",
            Self::Restore => "Inventory restore",
        }
    }
}

/// The record a log row was written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum SourceRef {
    Purchase(EntityId),
    Sale(EntityId),
    Cost(EntityId),
    SaleDebtPayment(EntityId),
    PurchaseDebtPayment(EntityId),
    PartnerTransaction(EntityId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: EntityId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Item model, cost title or partner name.
    #[serde(default)]
    pub model: String,
    /// Signed cash effect.
    pub amount: i64,
    #[serde(default)]
    pub debt: i64,
    #[serde(default)]
    pub profit: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

impl Transaction {
    pub(crate) fn new(
        id: EntityId,
        date: NaiveDate,
        kind: TransactionKind,
        model: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            id,
            date,
            kind,
            model: model.into(),
            amount,
            debt: 0,
            profit: 0,
            description: String::new(),
            source: None,
        }
    }

    #[must_use]
    pub(crate) fn debt(mut self, debt: i64) -> Self {
        self.debt = debt;
        self
    }

    #[must_use]
    pub(crate) fn profit(mut self, profit: i64) -> Self {
        self.profit = profit;
        self
    }

    #[must_use]
    pub(crate) fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub(crate) fn source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_as_tagged_reference() {
        let json = serde_json::to_string(&SourceRef::Sale(7)).unwrap();
        assert_eq!(json, r#"{"entity":"sale","id":7}"#);
    }
}
