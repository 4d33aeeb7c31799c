use crate::{
    EngineError, EntityId, Ledger, NewSale, ResultEngine, Sale, SaleUpdate, SourceRef,
    Transaction, TransactionKind,
    util::{ensure_non_negative, normalize_text},
};

fn check_sale_amounts(sell_price: i64, debt: i64) -> ResultEngine<()> {
    ensure_non_negative(sell_price, "sell price")?;
    ensure_non_negative(debt, "debt")?;
    if debt > sell_price {
        return Err(EngineError::InvariantViolation(format!(
            "debt ({debt}) exceeds the sell price ({sell_price})"
        )));
    }
    Ok(())
}

impl Ledger {
    /// Sells an unsold purchase, flipping it to `sold`.
    pub fn create_sale(&mut self, cmd: NewSale) -> ResultEngine<EntityId> {
        let purchase = self
            .purchase(cmd.purchase_id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{}", cmd.purchase_id)))?;
        if purchase.sold {
            return Err(EngineError::InvariantViolation(format!(
                "purchase #{} is already sold",
                cmd.purchase_id
            )));
        }
        check_sale_amounts(cmd.sell_price, cmd.debt)?;
        let model = purchase.model.clone();
        let purchase_price = purchase.total_cost;
        let profit = cmd
            .sell_price
            .checked_sub(purchase_price)
            .ok_or_else(|| EngineError::Validation("sell price is too large".to_string()))?;
        let cash_received = cmd.sell_price - cmd.debt;
        let notes = normalize_text(&cmd.notes);

        let id = self.allocate_id();
        self.sales_mut().push(Sale {
            id,
            date: cmd.date,
            purchase_id: cmd.purchase_id,
            model: model.clone(),
            purchase_price,
            sell_price: cmd.sell_price,
            debt: cmd.debt,
            remaining_debt: cmd.debt,
            profit,
            cash_received,
            customer_name: normalize_text(&cmd.customer_name),
            customer_phone: normalize_text(&cmd.customer_phone),
            notes: notes.clone(),
        });
        self.purchase_mut(cmd.purchase_id)?.sold = true;

        let row_id = self.allocate_id();
        self.log(
            Transaction::new(row_id, cmd.date, TransactionKind::Sale, model, cash_received)
                .debt(cmd.debt)
                .profit(profit)
                .description(notes)
                .source(SourceRef::Sale(id)),
        );
        Ok(id)
    }

    /// Edits a sale. The debt may not drop below what was already collected.
    pub fn update_sale(&mut self, id: EntityId, cmd: SaleUpdate) -> ResultEngine<()> {
        let sale = self
            .sale(id)
            .ok_or_else(|| EngineError::NotFound(format!("sale #{id}")))?;
        check_sale_amounts(cmd.sell_price, cmd.debt)?;
        let profit = cmd
            .sell_price
            .checked_sub(sale.purchase_price)
            .ok_or_else(|| EngineError::Validation("sell price is too large".to_string()))?;
        let paid = self.paid_on_sale(id);
        if cmd.debt < paid {
            return Err(EngineError::InvariantViolation(format!(
                "debt cannot be lower than the {paid} already collected"
            )));
        }
        let cash_received = cmd.sell_price - cmd.debt;
        let notes = normalize_text(&cmd.notes);

        let sale = self.sale_mut(id)?;
        sale.sell_price = cmd.sell_price;
        sale.debt = cmd.debt;
        sale.remaining_debt = cmd.debt - paid;
        sale.profit = profit;
        sale.cash_received = cash_received;
        sale.customer_name = normalize_text(&cmd.customer_name);
        sale.customer_phone = normalize_text(&cmd.customer_phone);
        sale.notes = notes.clone();

        self.update_log_rows(TransactionKind::Sale, SourceRef::Sale(id), |row| {
            row.amount = cash_received;
            row.debt = cmd.debt;
            row.profit = profit;
            row.description = notes.clone();
        });
        Ok(())
    }

    /// Deletes a sale, its debt payments and the audit rows of both, and puts
    /// the purchase back into the inventory.
    pub fn delete_sale(&mut self, id: EntityId) -> ResultEngine<Sale> {
        let sales = self.sales_mut();
        let idx = sales
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("sale #{id}")))?;
        let removed = sales.remove(idx);

        if let Ok(purchase) = self.purchase_mut(removed.purchase_id) {
            purchase.sold = false;
        }
        let payments: Vec<EntityId> = self
            .debt_payments()
            .iter()
            .filter(|p| p.sale_id == id)
            .map(|p| p.id)
            .collect();
        self.debt_payments_mut().retain(|p| p.sale_id != id);
        for payment in payments {
            self.remove_log_rows(
                &[TransactionKind::SaleDebtPayment],
                SourceRef::SaleDebtPayment(payment),
            );
        }
        self.remove_log_rows(&[TransactionKind::Sale], SourceRef::Sale(id));
        Ok(removed)
    }
}
