use crate::{
    Cost, EngineError, EntityId, Ledger, NewPartnerTransaction, PartnerRoster, PartnerTransaction,
    PartnerTxKind, ResultEngine, SourceRef, Transaction, TransactionKind,
    util::{ensure_positive, normalize_text},
};

impl Ledger {
    /// Records a partner's cash movement.
    ///
    /// A `personal_expense` also books a Cost for the same amount, so the
    /// expense lowers profit once and is owed back to the partner.
    pub fn record_partner_transaction(
        &mut self,
        cmd: NewPartnerTransaction,
        roster: &PartnerRoster,
    ) -> ResultEngine<EntityId> {
        let partner_name = roster.require(&cmd.partner)?.name.clone();
        ensure_positive(cmd.amount, "amount")?;
        let description = normalize_text(&cmd.description);

        let id = self.allocate_id();
        self.partner_transactions_mut().push(PartnerTransaction {
            id,
            partner: cmd.partner,
            kind: cmd.kind,
            amount: cmd.amount,
            date: cmd.date,
            description: description.clone(),
        });

        let cash_effect = if cmd.kind == PartnerTxKind::PersonalExpense {
            let cost_id = self.allocate_id();
            self.costs_mut().push(Cost {
                id: cost_id,
                date: cmd.date,
                title: format!("Personal expense: {partner_name}"),
                amount: cmd.amount,
                description: description.clone(),
                partner_transaction_id: Some(id),
            });
            -cmd.amount
        } else {
            cmd.kind.cash_sign() * cmd.amount
        };

        let row_id = self.allocate_id();
        let label = cmd.kind.label();
        let row_description = if description.is_empty() {
            label.to_string()
        } else {
            format!("{label}: {description}")
        };
        self.log(
            Transaction::new(row_id, cmd.date, TransactionKind::Partner, partner_name, cash_effect)
                .description(row_description)
                .source(SourceRef::PartnerTransaction(id)),
        );
        Ok(id)
    }

    /// Deletes a partner transaction with its mirrored cost and audit row.
    pub fn delete_partner_transaction(&mut self, id: EntityId) -> ResultEngine<PartnerTransaction> {
        let txs = self.partner_transactions_mut();
        let idx = txs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("partner transaction #{id}")))?;
        let removed = txs.remove(idx);
        self.costs_mut()
            .retain(|c| c.partner_transaction_id != Some(id));
        self.remove_log_rows(
            &[TransactionKind::Partner],
            SourceRef::PartnerTransaction(id),
        );
        Ok(removed)
    }
}
