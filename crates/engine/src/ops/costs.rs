use crate::{
    Cost, CostUpdate, EngineError, EntityId, Ledger, NewCost, ResultEngine, SourceRef,
    Transaction, TransactionKind,
    util::{ensure_non_negative, normalize_required, normalize_text},
};

impl Ledger {
    pub fn create_cost(&mut self, cmd: NewCost) -> ResultEngine<EntityId> {
        let title = normalize_required(&cmd.title, "title")?;
        ensure_non_negative(cmd.amount, "amount")?;
        let description = normalize_text(&cmd.description);

        let id = self.allocate_id();
        self.costs_mut().push(Cost {
            id,
            date: cmd.date,
            title: title.clone(),
            amount: cmd.amount,
            description: description.clone(),
            partner_transaction_id: None,
        });

        let row_id = self.allocate_id();
        self.log(
            Transaction::new(row_id, cmd.date, TransactionKind::Cost, title, -cmd.amount)
                .description(description)
                .source(SourceRef::Cost(id)),
        );
        Ok(id)
    }

    pub fn update_cost(&mut self, id: EntityId, cmd: CostUpdate) -> ResultEngine<()> {
        self.ensure_standalone_cost(id)?;
        let title = normalize_required(&cmd.title, "title")?;
        ensure_non_negative(cmd.amount, "amount")?;
        let description = normalize_text(&cmd.description);

        let cost = self.cost_mut(id)?;
        cost.title = title.clone();
        cost.amount = cmd.amount;
        cost.description = description.clone();

        self.update_log_rows(TransactionKind::Cost, SourceRef::Cost(id), |row| {
            row.model = title.clone();
            row.amount = -cmd.amount;
            row.description = description.clone();
        });
        Ok(())
    }

    /// Deletes a cost and the audit row that recorded it.
    pub fn delete_cost(&mut self, id: EntityId) -> ResultEngine<Cost> {
        self.ensure_standalone_cost(id)?;
        let costs = self.costs_mut();
        let idx = costs
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("cost #{id}")))?;
        let removed = costs.remove(idx);
        self.remove_log_rows(&[TransactionKind::Cost], SourceRef::Cost(id));
        Ok(removed)
    }

    /// Costs mirroring a partner's personal expense follow that transaction.
    fn ensure_standalone_cost(&self, id: EntityId) -> ResultEngine<()> {
        let cost = self
            .cost(id)
            .ok_or_else(|| EngineError::NotFound(format!("cost #{id}")))?;
        if let Some(tx_id) = cost.partner_transaction_id {
            return Err(EngineError::InvariantViolation(format!(
                "cost #{id} belongs to partner transaction #{tx_id}; change that instead"
            )));
        }
        Ok(())
    }
}
