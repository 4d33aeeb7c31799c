use crate::{
    EngineError, EntityId, Ledger, NewPurchase, Purchase, PurchaseUpdate, ResultEngine,
    SourceRef, Transaction, TransactionKind,
    util::{checked_sum, ensure_non_negative, normalize_required, normalize_text},
};

struct PriceParts {
    total_cost: i64,
    cash_paid: i64,
}

fn price_parts(
    buy_price: i64,
    delivery_cost: i64,
    extra_cost: i64,
    purchase_debt: i64,
) -> ResultEngine<PriceParts> {
    ensure_non_negative(buy_price, "buy price")?;
    ensure_non_negative(delivery_cost, "delivery cost")?;
    ensure_non_negative(extra_cost, "extra cost")?;
    ensure_non_negative(purchase_debt, "purchase debt")?;
    let total_cost = checked_sum(&[buy_price, delivery_cost, extra_cost], "total cost")?;
    if purchase_debt > total_cost {
        return Err(EngineError::InvariantViolation(format!(
            "purchase debt ({purchase_debt}) exceeds the total cost ({total_cost})"
        )));
    }
    Ok(PriceParts {
        total_cost,
        cash_paid: total_cost - purchase_debt,
    })
}

impl Ledger {
    /// Adds an item to the inventory and logs the cash paid for it.
    pub fn create_purchase(&mut self, cmd: NewPurchase) -> ResultEngine<EntityId> {
        let model = normalize_required(&cmd.model, "model")?;
        let parts = price_parts(
            cmd.buy_price,
            cmd.delivery_cost,
            cmd.extra_cost,
            cmd.purchase_debt,
        )?;
        let notes = normalize_text(&cmd.notes);

        let id = self.allocate_id();
        self.purchases_mut().push(Purchase {
            id,
            date: cmd.date,
            model: model.clone(),
            buy_price: cmd.buy_price,
            delivery_cost: cmd.delivery_cost,
            extra_cost: cmd.extra_cost,
            total_cost: parts.total_cost,
            purchase_debt: cmd.purchase_debt,
            remaining_debt: cmd.purchase_debt,
            cash_paid: parts.cash_paid,
            notes: notes.clone(),
            sold: false,
        });

        let row_id = self.allocate_id();
        self.log(
            Transaction::new(row_id, cmd.date, TransactionKind::Purchase, model, -parts.cash_paid)
                .debt(cmd.purchase_debt)
                .description(notes)
                .source(SourceRef::Purchase(id)),
        );
        Ok(id)
    }

    /// Edits an unsold purchase.
    ///
    /// The new debt may not drop below what was already paid against it.
    pub fn update_purchase(&mut self, id: EntityId, cmd: PurchaseUpdate) -> ResultEngine<()> {
        let purchase = self
            .purchase(id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{id}")))?;
        if purchase.sold {
            return Err(EngineError::InvariantViolation(format!(
                "purchase #{id} is sold and can no longer be edited"
            )));
        }
        let model = normalize_required(&cmd.model, "model")?;
        let parts = price_parts(
            cmd.buy_price,
            cmd.delivery_cost,
            cmd.extra_cost,
            cmd.purchase_debt,
        )?;
        let paid = self.paid_on_purchase(id);
        if cmd.purchase_debt < paid {
            return Err(EngineError::InvariantViolation(format!(
                "purchase debt cannot be lower than the {paid} already paid"
            )));
        }
        let notes = normalize_text(&cmd.notes);

        let purchase = self.purchase_mut(id)?;
        purchase.model = model.clone();
        purchase.buy_price = cmd.buy_price;
        purchase.delivery_cost = cmd.delivery_cost;
        purchase.extra_cost = cmd.extra_cost;
        purchase.total_cost = parts.total_cost;
        purchase.purchase_debt = cmd.purchase_debt;
        purchase.remaining_debt = cmd.purchase_debt - paid;
        purchase.cash_paid = parts.cash_paid;
        purchase.notes = notes.clone();

        self.update_log_rows(TransactionKind::Purchase, SourceRef::Purchase(id), |row| {
            row.model = model.clone();
            row.amount = -parts.cash_paid;
            row.debt = cmd.purchase_debt;
            row.description = notes.clone();
        });
        Ok(())
    }

    /// Deletes an unsold purchase together with its debt payments and the
    /// audit rows that recorded it.
    pub fn delete_purchase(&mut self, id: EntityId) -> ResultEngine<Purchase> {
        let purchase = self
            .purchase(id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{id}")))?;
        if purchase.sold {
            return Err(EngineError::InvariantViolation(format!(
                "purchase #{id} is sold; delete its sale first"
            )));
        }

        let purchases = self.purchases_mut();
        let idx = purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{id}")))?;
        let removed = purchases.remove(idx);
        let payments: Vec<EntityId> = self
            .purchase_debt_payments()
            .iter()
            .filter(|p| p.purchase_id == id)
            .map(|p| p.id)
            .collect();
        self.purchase_debt_payments_mut()
            .retain(|p| p.purchase_id != id);
        for payment in payments {
            self.remove_log_rows(
                &[TransactionKind::PurchaseDebtPayment],
                SourceRef::PurchaseDebtPayment(payment),
            );
        }
        self.remove_log_rows(
            &[TransactionKind::Purchase, TransactionKind::Restore],
            SourceRef::Purchase(id),
        );
        Ok(removed)
    }
}
