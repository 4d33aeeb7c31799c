use crate::{
    DebtPayment, DebtPaymentNew, EngineError, Ledger, PurchaseDebtPayment, ResultEngine,
    SourceRef, Transaction, TransactionKind,
    util::{ensure_positive, normalize_text},
};

fn ensure_within_outstanding(amount: i64, outstanding: i64) -> ResultEngine<()> {
    ensure_positive(amount, "payment")?;
    if amount > outstanding {
        return Err(EngineError::InvariantViolation(format!(
            "payment of {amount} exceeds the outstanding debt of {outstanding}"
        )));
    }
    Ok(())
}

impl Ledger {
    /// Records money collected against a sale's debt.
    pub fn pay_sale_debt(&mut self, cmd: DebtPaymentNew) -> ResultEngine<DebtPayment> {
        let sale_id = cmd.target;
        let sale = self
            .sale(sale_id)
            .ok_or_else(|| EngineError::NotFound(format!("sale #{sale_id}")))?;
        let paid = self.paid_on_sale(sale_id);
        let outstanding = (sale.debt - paid).max(0);
        ensure_within_outstanding(cmd.amount, outstanding)?;
        let model = sale.model.clone();
        let left = outstanding - cmd.amount;

        let payment = DebtPayment {
            id: self.allocate_id(),
            sale_id,
            date: cmd.date,
            amount: cmd.amount,
            notes: normalize_text(&cmd.notes),
        };
        self.debt_payments_mut().push(payment.clone());
        self.sale_mut(sale_id)?.remaining_debt = left;

        let row_id = self.allocate_id();
        self.log(
            Transaction::new(
                row_id,
                cmd.date,
                TransactionKind::SaleDebtPayment,
                model,
                cmd.amount,
            )
            .debt(left)
            .description(payment.notes.clone())
            .source(SourceRef::SaleDebtPayment(payment.id)),
        );
        Ok(payment)
    }

    /// Records money paid to a seller against a purchase's debt.
    pub fn pay_purchase_debt(&mut self, cmd: DebtPaymentNew) -> ResultEngine<PurchaseDebtPayment> {
        let purchase_id = cmd.target;
        let purchase = self
            .purchase(purchase_id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{purchase_id}")))?;
        let paid = self.paid_on_purchase(purchase_id);
        let outstanding = (purchase.purchase_debt - paid).max(0);
        ensure_within_outstanding(cmd.amount, outstanding)?;
        let model = purchase.model.clone();
        let left = outstanding - cmd.amount;

        let payment = PurchaseDebtPayment {
            id: self.allocate_id(),
            purchase_id,
            date: cmd.date,
            amount: cmd.amount,
            notes: normalize_text(&cmd.notes),
        };
        self.purchase_debt_payments_mut().push(payment.clone());
        self.purchase_mut(purchase_id)?.remaining_debt = left;

        let row_id = self.allocate_id();
        self.log(
            Transaction::new(
                row_id,
                cmd.date,
                TransactionKind::PurchaseDebtPayment,
                model,
                -cmd.amount,
            )
            .debt(left)
            .description(payment.notes.clone())
            .source(SourceRef::PurchaseDebtPayment(payment.id)),
        );
        Ok(payment)
    }
}
