//! The ledger aggregate.
//!
//! `Ledger` owns every record. Outside the engine it is read-only: all
//! changes go through the operations in `ops`, which keep derived fields and
//! cross-record rules intact.

use serde::{Deserialize, Serialize};

use crate::{
    Cost, DebtPayment, EngineError, EntityId, PartnerTransaction, Purchase, PurchaseDebtPayment,
    ResultEngine, Sale, Transaction, util::in_amount_range,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    initial_capital: i64,
    purchases: Vec<Purchase>,
    sales: Vec<Sale>,
    costs: Vec<Cost>,
    /// Newest first.
    transactions: Vec<Transaction>,
    debt_payments: Vec<DebtPayment>,
    purchase_debt_payments: Vec<PurchaseDebtPayment>,
    partner_transactions: Vec<PartnerTransaction>,
    next_id: EntityId,
}

impl Ledger {
    pub fn initial_capital(&self) -> i64 {
        self.initial_capital
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    /// Audit log, newest row first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn debt_payments(&self) -> &[DebtPayment] {
        &self.debt_payments
    }

    pub fn purchase_debt_payments(&self) -> &[PurchaseDebtPayment] {
        &self.purchase_debt_payments
    }

    pub fn partner_transactions(&self) -> &[PartnerTransaction] {
        &self.partner_transactions
    }

    /// `true` when the ledger holds no records and no capital.
    pub fn is_empty(&self) -> bool {
        self.initial_capital == 0
            && self.purchases.is_empty()
            && self.sales.is_empty()
            && self.costs.is_empty()
            && self.transactions.is_empty()
            && self.debt_payments.is_empty()
            && self.purchase_debt_payments.is_empty()
            && self.partner_transactions.is_empty()
    }

    pub fn purchase(&self, id: EntityId) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    pub fn sale(&self, id: EntityId) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn cost(&self, id: EntityId) -> Option<&Cost> {
        self.costs.iter().find(|c| c.id == id)
    }

    pub fn partner_transaction(&self, id: EntityId) -> Option<&PartnerTransaction> {
        self.partner_transactions.iter().find(|t| t.id == id)
    }

    /// The sale that consumed `purchase_id`, if any.
    pub fn sale_for_purchase(&self, purchase_id: EntityId) -> Option<&Sale> {
        self.sales.iter().find(|s| s.purchase_id == purchase_id)
    }

    /// Checks every cross-record rule. Used on imported snapshots and in tests.
    pub fn validate(&self) -> ResultEngine<()> {
        let fail = EngineError::MalformedImport;

        if !in_amount_range(self.initial_capital) {
            return Err(fail("initial capital is out of range".to_string()));
        }

        let mut ids: Vec<EntityId> = self
            .purchases
            .iter()
            .map(|p| p.id)
            .chain(self.sales.iter().map(|s| s.id))
            .chain(self.costs.iter().map(|c| c.id))
            .chain(self.debt_payments.iter().map(|p| p.id))
            .chain(self.purchase_debt_payments.iter().map(|p| p.id))
            .chain(self.partner_transactions.iter().map(|t| t.id))
            .collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(fail("record ids are not unique".to_string()));
        }

        for purchase in &self.purchases {
            let paid = self.paid_on_purchase(purchase.id);
            purchase.check(paid).map_err(fail)?;
            let sold_to = self
                .sales
                .iter()
                .filter(|s| s.purchase_id == purchase.id)
                .count();
            if sold_to > 1 {
                return Err(fail(format!("purchase #{} is sold twice", purchase.id)));
            }
            if purchase.sold != (sold_to == 1) {
                return Err(fail(format!(
                    "purchase #{} sold flag disagrees with its sales",
                    purchase.id
                )));
            }
        }

        for sale in &self.sales {
            let Some(purchase) = self.purchase(sale.purchase_id) else {
                return Err(fail(format!(
                    "sale #{} references a missing purchase",
                    sale.id
                )));
            };
            if sale.purchase_price != purchase.total_cost {
                return Err(fail(format!(
                    "sale #{} purchase price differs from its purchase",
                    sale.id
                )));
            }
            sale.check(self.paid_on_sale(sale.id)).map_err(fail)?;
        }

        for payment in &self.debt_payments {
            if payment.amount <= 0
                || !in_amount_range(payment.amount)
                || self.sale(payment.sale_id).is_none()
            {
                return Err(fail(format!("debt payment #{} is invalid", payment.id)));
            }
        }
        for payment in &self.purchase_debt_payments {
            if payment.amount <= 0
                || !in_amount_range(payment.amount)
                || self.purchase(payment.purchase_id).is_none()
            {
                return Err(fail(format!(
                    "purchase debt payment #{} is invalid",
                    payment.id
                )));
            }
        }
        for cost in &self.costs {
            if !in_amount_range(cost.amount) {
                return Err(fail(format!("cost #{} is out of range", cost.id)));
            }
            if let Some(tx_id) = cost.partner_transaction_id
                && self.partner_transaction(tx_id).is_none()
            {
                return Err(fail(format!(
                    "cost #{} mirrors a missing partner transaction",
                    cost.id
                )));
            }
        }
        for tx in &self.partner_transactions {
            if !in_amount_range(tx.amount) {
                return Err(fail(format!(
                    "partner transaction #{} is out of range",
                    tx.id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn paid_on_sale(&self, sale_id: EntityId) -> i64 {
        self.debt_payments
            .iter()
            .filter(|p| p.sale_id == sale_id)
            .fold(0, |acc: i64, p| acc.saturating_add(p.amount))
    }

    pub(crate) fn paid_on_purchase(&self, purchase_id: EntityId) -> i64 {
        self.purchase_debt_payments
            .iter()
            .filter(|p| p.purchase_id == purchase_id)
            .fold(0, |acc: i64, p| acc.saturating_add(p.amount))
    }

    /// Hands out the next id. Ids are shared by every record type.
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    /// Moves the id counter past every id already present, so snapshots that
    /// were edited by hand (or written before the counter existed) stay safe.
    pub(crate) fn normalize(&mut self) {
        let max_id = self
            .purchases
            .iter()
            .map(|p| p.id)
            .chain(self.sales.iter().map(|s| s.id))
            .chain(self.costs.iter().map(|c| c.id))
            .chain(self.transactions.iter().map(|t| t.id))
            .chain(self.debt_payments.iter().map(|p| p.id))
            .chain(self.purchase_debt_payments.iter().map(|p| p.id))
            .chain(self.partner_transactions.iter().map(|t| t.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
    }

    pub(crate) fn log(&mut self, row: Transaction) {
        self.transactions.insert(0, row);
    }

    pub(crate) fn set_initial_capital(&mut self, amount: i64) {
        self.initial_capital = amount;
    }

    pub(crate) fn purchases_mut(&mut self) -> &mut Vec<Purchase> {
        &mut self.purchases
    }

    pub(crate) fn sales_mut(&mut self) -> &mut Vec<Sale> {
        &mut self.sales
    }

    pub(crate) fn costs_mut(&mut self) -> &mut Vec<Cost> {
        &mut self.costs
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    pub(crate) fn debt_payments_mut(&mut self) -> &mut Vec<DebtPayment> {
        &mut self.debt_payments
    }

    pub(crate) fn purchase_debt_payments_mut(&mut self) -> &mut Vec<PurchaseDebtPayment> {
        &mut self.purchase_debt_payments
    }

    pub(crate) fn partner_transactions_mut(&mut self) -> &mut Vec<PartnerTransaction> {
        &mut self.partner_transactions
    }

    pub(crate) fn purchase_mut(&mut self, id: EntityId) -> ResultEngine<&mut Purchase> {
        self.purchases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("purchase #{id}")))
    }

    pub(crate) fn sale_mut(&mut self, id: EntityId) -> ResultEngine<&mut Sale> {
        self.sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("sale #{id}")))
    }

    pub(crate) fn cost_mut(&mut self, id: EntityId) -> ResultEngine<&mut Cost> {
        self.costs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("cost #{id}")))
    }
}
