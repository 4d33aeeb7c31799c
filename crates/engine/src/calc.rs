//! Derived figures.
//!
//! Everything here is a pure function of a [`Ledger`] snapshot (plus the
//! partner roster for the split). Nothing is cached: callers recompute on
//! demand, so the figures can never drift from the records.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    EntityId, Ledger, PartnerId, PartnerRoster, PartnerTransaction, PartnerTxKind, Purchase, Sale,
    util::clamped_sum,
};

/// `capital - purchases paid + sales received - costs - withdrawals + deposits`.
pub fn cash_balance(ledger: &Ledger) -> i64 {
    let capital = std::iter::once(i128::from(ledger.initial_capital()));
    let paid = ledger.purchases().iter().map(|p| -i128::from(p.cash_paid));
    let received = ledger.sales().iter().map(|s| i128::from(s.cash_received));
    let costs = ledger.costs().iter().map(|c| -i128::from(c.amount));
    let partners = ledger
        .partner_transactions()
        .iter()
        .map(|t| i128::from(t.kind.cash_sign()) * i128::from(t.amount));
    clamped_sum(capital.chain(paid).chain(received).chain(costs).chain(partners))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub count: usize,
    pub value: i64,
}

/// Unsold purchases and their total cost.
pub fn inventory(ledger: &Ledger) -> Inventory {
    let unsold = || ledger.purchases().iter().filter(|p| !p.sold);
    Inventory {
        count: unsold().count(),
        value: clamped_sum(unsold().map(|p| i128::from(p.total_cost))),
    }
}

pub fn total_profit(ledger: &Ledger) -> i64 {
    clamped_sum(ledger.sales().iter().map(|s| i128::from(s.profit)))
}

pub fn sale_paid(ledger: &Ledger, sale_id: EntityId) -> i64 {
    ledger.paid_on_sale(sale_id)
}

pub fn purchase_paid(ledger: &Ledger, purchase_id: EntityId) -> i64 {
    ledger.paid_on_purchase(purchase_id)
}

/// What the customer still owes on `sale`.
pub fn sale_outstanding(ledger: &Ledger, sale: &Sale) -> i64 {
    sale.debt.saturating_sub(sale_paid(ledger, sale.id)).max(0)
}

/// What is still owed to the seller of `purchase`.
pub fn purchase_outstanding(ledger: &Ledger, purchase: &Purchase) -> i64 {
    purchase
        .purchase_debt
        .saturating_sub(purchase_paid(ledger, purchase.id))
        .max(0)
}

pub fn remaining_sales_debt(ledger: &Ledger) -> i64 {
    clamped_sum(
        ledger
            .sales()
            .iter()
            .filter(|s| s.debt > 0)
            .map(|s| i128::from(sale_outstanding(ledger, s))),
    )
}

pub fn remaining_purchase_debt(ledger: &Ledger) -> i64 {
    clamped_sum(
        ledger
            .purchases()
            .iter()
            .filter(|p| p.purchase_debt > 0)
            .map(|p| i128::from(purchase_outstanding(ledger, p))),
    )
}

/// Sales with something left to collect, newest first.
pub fn open_sale_debts(ledger: &Ledger) -> Vec<(&Sale, i64)> {
    ledger
        .sales()
        .iter()
        .rev()
        .map(|s| (s, sale_outstanding(ledger, s)))
        .filter(|(_, left)| *left > 0)
        .collect()
}

/// Purchases with something left to pay, newest first.
pub fn open_purchase_debts(ledger: &Ledger) -> Vec<(&Purchase, i64)> {
    ledger
        .purchases()
        .iter()
        .rev()
        .map(|p| (p, purchase_outstanding(ledger, p)))
        .filter(|(_, left)| *left > 0)
        .collect()
}

/// Sum of all costs.
///
/// Personal expenses are mirrored into costs when recorded; older snapshots
/// may hold personal expenses without a mirror, and those are added here so
/// each expense counts exactly once.
pub fn total_costs(ledger: &Ledger) -> i64 {
    let mirrored: HashSet<EntityId> = ledger
        .costs()
        .iter()
        .filter_map(|c| c.partner_transaction_id)
        .collect();
    let booked = ledger.costs().iter().map(|c| i128::from(c.amount));
    let unmirrored = ledger
        .partner_transactions()
        .iter()
        .filter(|t| t.kind == PartnerTxKind::PersonalExpense && !mirrored.contains(&t.id))
        .map(|t| i128::from(t.amount));
    clamped_sum(booked.chain(unmirrored))
}

/// `(profit - costs) * weight / total weight`, truncated toward zero.
pub fn partner_share(ledger: &Ledger, roster: &PartnerRoster, partner: &PartnerId) -> i64 {
    let weight = roster.get(partner).map_or(0, |p| i64::from(p.share));
    let total = roster.total_share();
    if total == 0 {
        return 0;
    }
    let net = i128::from(total_profit(ledger)) - i128::from(total_costs(ledger));
    // i128 keeps `net * weight` exact.
    clamped_sum([net * i128::from(weight) / i128::from(total)])
}

/// Sum of the partner's own signed movements.
pub fn partner_movements(ledger: &Ledger, partner: &PartnerId) -> i64 {
    clamped_sum(partner_history(ledger, partner).map(|t| i128::from(t.signed_amount())))
}

/// Share plus own movements. Positive: the company owes the partner.
/// Negative: the partner owes the company.
pub fn partner_balance(ledger: &Ledger, roster: &PartnerRoster, partner: &PartnerId) -> i64 {
    partner_share(ledger, roster, partner).saturating_add(partner_movements(ledger, partner))
}

/// The partner's transactions, oldest first.
pub fn partner_history<'a>(
    ledger: &'a Ledger,
    partner: &'a PartnerId,
) -> impl Iterator<Item = &'a PartnerTransaction> {
    ledger
        .partner_transactions()
        .iter()
        .filter(move |t| &t.partner == partner)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartnerStanding {
    pub partner: PartnerId,
    pub name: String,
    pub share: i64,
    pub movements: i64,
    pub balance: i64,
}

pub fn partner_standings(ledger: &Ledger, roster: &PartnerRoster) -> Vec<PartnerStanding> {
    roster
        .partners()
        .iter()
        .map(|p| {
            let share = partner_share(ledger, roster, &p.id);
            let movements = partner_movements(ledger, &p.id);
            PartnerStanding {
                partner: p.id.clone(),
                name: p.name.clone(),
                share,
                movements,
                balance: share.saturating_add(movements),
            }
        })
        .collect()
}

/// Every headline figure in one value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub initial_capital: i64,
    pub cash_balance: i64,
    pub inventory: Inventory,
    pub total_profit: i64,
    pub total_costs: i64,
    pub remaining_sales_debt: i64,
    pub remaining_purchase_debt: i64,
    pub partners: Vec<PartnerStanding>,
    pub purchase_count: usize,
    pub sale_count: usize,
}

impl Dashboard {
    pub fn compute(ledger: &Ledger, roster: &PartnerRoster) -> Self {
        Self {
            initial_capital: ledger.initial_capital(),
            cash_balance: cash_balance(ledger),
            inventory: inventory(ledger),
            total_profit: total_profit(ledger),
            total_costs: total_costs(ledger),
            remaining_sales_debt: remaining_sales_debt(ledger),
            remaining_purchase_debt: remaining_purchase_debt(ledger),
            partners: partner_standings(ledger, roster),
            purchase_count: ledger.purchases().len(),
            sale_count: ledger.sales().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{NewCost, NewPurchase, NewSale, Partner};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        let ledger = Ledger::default();
        let dashboard = Dashboard::compute(&ledger, &PartnerRoster::default());
        assert_eq!(dashboard.cash_balance, 0);
        assert_eq!(dashboard.inventory, Inventory::default());
        assert!(dashboard.partners.iter().all(|p| p.balance == 0));
    }

    #[test]
    fn share_truncates_toward_zero() {
        let mut ledger = Ledger::default();
        ledger.create_cost(NewCost::new(day(), "rent", 301)).unwrap();
        let roster = PartnerRoster::default();
        for partner in roster.partners() {
            assert_eq!(partner_share(&ledger, &roster, &partner.id), -150);
        }
    }

    #[test]
    fn uneven_weights_split_proportionally() {
        let mut ledger = Ledger::default();
        let id = ledger
            .create_purchase(NewPurchase::new(day(), "A52", 1_000))
            .unwrap();
        ledger.create_sale(NewSale::new(day(), id, 4_000)).unwrap();
        let roster = PartnerRoster::new(vec![
            Partner {
                id: PartnerId::new("a"),
                name: "A".to_string(),
                share: 2,
            },
            Partner {
                id: PartnerId::new("b"),
                name: "B".to_string(),
                share: 1,
            },
        ])
        .unwrap();
        assert_eq!(partner_share(&ledger, &roster, &PartnerId::new("a")), 2_000);
        assert_eq!(partner_share(&ledger, &roster, &PartnerId::new("b")), 1_000);
        assert_eq!(partner_share(&ledger, &roster, &PartnerId::new("zz")), 0);
    }

    #[test]
    fn computations_are_idempotent() {
        let mut ledger = Ledger::default();
        ledger.set_capital(5_000, day()).unwrap();
        ledger
            .create_purchase(NewPurchase::new(day(), "A52", 1_000).purchase_debt(400))
            .unwrap();
        let roster = PartnerRoster::default();
        let first = Dashboard::compute(&ledger, &roster);
        let second = Dashboard::compute(&ledger, &roster);
        assert_eq!(first, second);
        assert_eq!(first.cash_balance, 4_400);
        assert_eq!(first.remaining_purchase_debt, 400);
    }

    #[test]
    fn huge_snapshots_saturate_instead_of_overflowing() {
        let item = |id: u64| {
            serde_json::json!({
                "id": id,
                "date": "2026-10-16",
                "model": "A52",
                "buy_price": 5_000_000_000_000_000_000_i64,
                "total_cost": 5_000_000_000_000_000_000_i64,
                "cash_paid": 5_000_000_000_000_000_000_i64,
            })
        };
        let ledger: Ledger = serde_json::from_value(serde_json::json!({
            "purchases": [item(1), item(2)],
            "next_id": 2,
        }))
        .unwrap();

        let dashboard = Dashboard::compute(&ledger, &PartnerRoster::default());
        assert_eq!(dashboard.inventory.count, 2);
        assert_eq!(dashboard.inventory.value, i64::MAX);
        assert_eq!(dashboard.cash_balance, i64::MIN);
        assert!(ledger.validate().is_err());
    }
}
