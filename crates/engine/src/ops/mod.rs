//! Ledger mutations.
//!
//! Every operation validates first and touches state only once all checks
//! passed, then appends its audit row(s). The store runs them on a working
//! copy, so even an unexpected failure never leaks a half-applied change.

use crate::{Ledger, SourceRef, TransactionKind};

mod capital;
mod costs;
mod debts;
mod partners;
mod purchases;
mod sales;

impl Ledger {
    /// Rewrites the audit rows written for `source` with `kind`.
    fn update_log_rows(
        &mut self,
        kind: TransactionKind,
        source: SourceRef,
        mut update: impl FnMut(&mut crate::Transaction),
    ) {
        self.transactions_mut()
            .iter_mut()
            .filter(|row| row.kind == kind && row.source == Some(source))
            .for_each(|row| update(row));
    }

    /// Drops the audit rows of the given kinds written for `source`.
    fn remove_log_rows(&mut self, kinds: &[TransactionKind], source: SourceRef) {
        self.transactions_mut()
            .retain(|row| !(kinds.contains(&row.kind) && row.source == Some(source)));
    }
}
