use chrono::NaiveDate;

use crate::{Ledger, ResultEngine, Transaction, TransactionKind, util::ensure_non_negative};

impl Ledger {
    /// Sets the initial capital. Replaces any previous value.
    pub fn set_capital(&mut self, amount: i64, date: NaiveDate) -> ResultEngine<()> {
        ensure_non_negative(amount, "capital")?;
        self.set_initial_capital(amount);
        let row_id = self.allocate_id();
        self.log(
            Transaction::new(row_id, date, TransactionKind::Capital, "", amount)
                .description("Initial capital"),
        );
        Ok(())
    }

    /// Drops every record and the capital.
    pub fn clear(&mut self) {
        *self = Ledger::default();
    }
}
