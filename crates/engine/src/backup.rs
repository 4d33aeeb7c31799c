//! Backup documents.
//!
//! A backup is a JSON document with a `type` discriminator:
//!
//! - `full`: the whole ledger, restorable only into an empty ledger;
//! - `inventory`: unsold purchases, each restored with its outstanding debt
//!   as the new debt base;
//! - `inventory_debt`: unsold purchases plus the payments made against them,
//!   restored with their full debt history.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, EntityId, Ledger, Purchase, PurchaseDebtPayment, ResultEngine, SourceRef,
    Transaction, TransactionKind,
    util::{in_amount_range, normalize_text},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    Full,
    Inventory,
    InventoryDebt,
}

impl BackupKind {
    pub const ALL: [BackupKind; 3] = [Self::Full, Self::Inventory, Self::InventoryDebt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Inventory => "inventory",
            Self::InventoryDebt => "inventory_debt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "Full ledger",
            Self::Inventory => "Inventory",
            Self::InventoryDebt => "Inventory with debts",
        }
    }
}

impl TryFrom<&str> for BackupKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid backup kind: {value}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackupDocument {
    Full {
        created_at: NaiveDateTime,
        ledger: Ledger,
    },
    Inventory {
        created_at: NaiveDateTime,
        items: Vec<Purchase>,
    },
    InventoryDebt {
        created_at: NaiveDateTime,
        items: Vec<Purchase>,
        #[serde(default)]
        payments: Vec<PurchaseDebtPayment>,
    },
}

impl BackupDocument {
    pub fn kind(&self) -> BackupKind {
        match self {
            Self::Full { .. } => BackupKind::Full,
            Self::Inventory { .. } => BackupKind::Inventory,
            Self::InventoryDebt { .. } => BackupKind::InventoryDebt,
        }
    }

    pub fn created_at(&self) -> NaiveDateTime {
        match self {
            Self::Full { created_at, .. }
            | Self::Inventory { created_at, .. }
            | Self::InventoryDebt { created_at, .. } => *created_at,
        }
    }

    /// Parses an uploaded document. Shape errors become `MalformedImport`.
    pub fn from_slice(bytes: &[u8]) -> ResultEngine<Self> {
        serde_json::from_slice(bytes).map_err(|err| EngineError::MalformedImport(err.to_string()))
    }

    pub fn to_json(&self) -> ResultEngine<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|err| EngineError::Persistence(err.to_string()))
    }

    /// Suggested file name, e.g. `backup_inventory_20261016_093000.json`.
    pub fn file_name(&self) -> String {
        format!(
            "backup_{}_{}.json",
            self.kind().as_str(),
            self.created_at().format("%Y%m%d_%H%M%S")
        )
    }

    /// Number of records the document would restore.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Full { ledger, .. } => ledger.purchases().len(),
            Self::Inventory { items, .. } | Self::InventoryDebt { items, .. } => items.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreSummary {
    pub kind: BackupKind,
    pub purchases: usize,
    pub payments: usize,
}

impl Ledger {
    pub fn export(&self, kind: BackupKind, created_at: NaiveDateTime) -> BackupDocument {
        let unsold = || {
            self.purchases()
                .iter()
                .filter(|p| !p.sold)
                .cloned()
                .collect::<Vec<_>>()
        };
        match kind {
            BackupKind::Full => BackupDocument::Full {
                created_at,
                ledger: self.clone(),
            },
            BackupKind::Inventory => BackupDocument::Inventory {
                created_at,
                items: unsold(),
            },
            BackupKind::InventoryDebt => {
                let items = unsold();
                let ids: HashSet<EntityId> = items.iter().map(|p| p.id).collect();
                let payments = self
                    .purchase_debt_payments()
                    .iter()
                    .filter(|p| ids.contains(&p.purchase_id))
                    .cloned()
                    .collect();
                BackupDocument::InventoryDebt {
                    created_at,
                    items,
                    payments,
                }
            }
        }
    }

    /// Applies a backup document. The whole document is checked before
    /// anything changes; on error the ledger is untouched.
    pub fn restore(&mut self, document: BackupDocument, today: NaiveDate) -> ResultEngine<RestoreSummary> {
        match document {
            BackupDocument::Full { mut ledger, .. } => {
                if !self.is_empty() {
                    return Err(EngineError::InvariantViolation(
                        "a full backup can only be restored into an empty ledger; clear it first"
                            .to_string(),
                    ));
                }
                ledger.validate()?;
                ledger.normalize();
                let summary = RestoreSummary {
                    kind: BackupKind::Full,
                    purchases: ledger.purchases().len(),
                    payments: ledger.debt_payments().len() + ledger.purchase_debt_payments().len(),
                };
                *self = ledger;
                Ok(summary)
            }
            BackupDocument::Inventory { items, .. } => {
                let mut rebased = Vec::with_capacity(items.len());
                for item in items {
                    if item.remaining_debt < 0 || item.remaining_debt > item.purchase_debt {
                        return Err(EngineError::MalformedImport(format!(
                            "item #{} has an invalid remaining debt",
                            item.id
                        )));
                    }
                    check_item(&item, item.purchase_debt - item.remaining_debt)?;
                    let debt = item.remaining_debt;
                    rebased.push(Purchase {
                        purchase_debt: debt,
                        remaining_debt: debt,
                        cash_paid: item.total_cost - debt,
                        ..item
                    });
                }
                let purchases = rebased.len();
                for item in rebased {
                    self.import_item(item, today);
                }
                Ok(RestoreSummary {
                    kind: BackupKind::Inventory,
                    purchases,
                    payments: 0,
                })
            }
            BackupDocument::InventoryDebt {
                items, payments, ..
            } => {
                let mut seen = HashSet::new();
                for item in &items {
                    if !seen.insert(item.id) {
                        return Err(EngineError::MalformedImport(format!(
                            "item #{} appears twice",
                            item.id
                        )));
                    }
                }
                for payment in &payments {
                    if payment.amount <= 0
                        || !in_amount_range(payment.amount)
                        || !seen.contains(&payment.purchase_id)
                    {
                        return Err(EngineError::MalformedImport(format!(
                            "payment #{} is invalid or references an unknown item",
                            payment.id
                        )));
                    }
                }
                for item in &items {
                    let paid = payments
                        .iter()
                        .filter(|p| p.purchase_id == item.id)
                        .fold(0, |acc: i64, p| acc.saturating_add(p.amount));
                    check_item(item, paid)?;
                }

                let purchases = items.len();
                let mut new_ids = HashMap::new();
                for item in items {
                    let old_id = item.id;
                    new_ids.insert(old_id, self.import_item(item, today));
                }
                let payment_count = payments.len();
                for payment in payments {
                    let Some(&purchase_id) = new_ids.get(&payment.purchase_id) else {
                        continue;
                    };
                    let id = self.allocate_id();
                    self.purchase_debt_payments_mut().push(PurchaseDebtPayment {
                        id,
                        purchase_id,
                        ..payment
                    });
                }
                Ok(RestoreSummary {
                    kind: BackupKind::InventoryDebt,
                    purchases,
                    payments: payment_count,
                })
            }
        }
    }

    /// Re-adds a checked item as a fresh unsold purchase dated `today`.
    fn import_item(&mut self, item: Purchase, today: NaiveDate) -> EntityId {
        let id = self.allocate_id();
        let purchase = Purchase {
            id,
            date: today,
            model: normalize_text(&item.model),
            sold: false,
            ..item
        };
        let row_id = self.allocate_id();
        let row = Transaction::new(
            row_id,
            today,
            TransactionKind::Restore,
            purchase.model.clone(),
            -purchase.cash_paid,
        )
        .debt(purchase.remaining_debt)
        .description("Restored from backup")
        .source(SourceRef::Purchase(id));
        self.purchases_mut().push(purchase);
        self.log(row);
        id
    }
}

fn check_item(item: &Purchase, paid: i64) -> ResultEngine<()> {
    if item.sold {
        return Err(EngineError::MalformedImport(format!(
            "item #{} is marked as sold",
            item.id
        )));
    }
    if item.model.trim().is_empty() {
        return Err(EngineError::MalformedImport(format!(
            "item #{} has no model",
            item.id
        )));
    }
    item.check(paid).map_err(EngineError::MalformedImport)
}
