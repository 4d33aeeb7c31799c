//! Bookkeeping for a small resale business.
//!
//! The [`Ledger`] holds purchases, sales, costs, debt payments, partner
//! transactions and the audit log. Operations on `Ledger` (see `ops`) are the
//! only way to change it; [`calc`] derives every figure from it; and
//! [`LedgerStore`] owns the live ledger and persists each committed change.

pub use backup::{BackupDocument, BackupKind, RestoreSummary};
pub use calc::{Dashboard, Inventory, PartnerStanding};
pub use commands::{
    CostUpdate, DebtPaymentNew, NewCost, NewPartnerTransaction, NewPurchase, NewSale,
    PurchaseUpdate, SaleUpdate,
};
pub use costs::Cost;
pub use error::EngineError;
pub use ledger::Ledger;
pub use money::{MAX_AMOUNT, Money};
pub use partner_transactions::{PartnerTransaction, PartnerTxKind};
pub use partners::{Partner, PartnerId, PartnerRoster};
pub use payments::{DebtPayment, PurchaseDebtPayment};
pub use purchases::Purchase;
pub use sales::Sale;
pub use store::{
    DEFAULT_IO_TIMEOUT, JsonFileStorage, LedgerStore, LedgerStoreBuilder, MemoryStorage,
    SnapshotStorage,
};
pub use transactions::{SourceRef, Transaction, TransactionKind};

mod backup;
pub mod calc;
mod commands;
mod costs;
mod error;
mod ledger;
mod money;
mod ops;
mod partner_transactions;
mod partners;
mod payments;
mod purchases;
mod sales;
mod store;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Record id. One counter is shared by every record type.
pub type EntityId = u64;
