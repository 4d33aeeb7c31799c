//! Replies shown to the operator.
//!
//! Every `render_*` function returns a [`RenderableReply`]; the transport
//! decides how text and action rows are drawn.

use chrono::NaiveDate;
use engine::{
    BackupKind, Cost, Dashboard, EngineError, Ledger, Money, PartnerId, PartnerRoster,
    PartnerTxKind, Purchase, Sale, calc,
};

use crate::{
    Command, RenderableReply, ReplyAction,
    parsing::{CANCEL_TOKEN, SKIP_TOKEN},
    step::{ActiveWorkflow, Skip},
};

const LIST_LIMIT: usize = 20;
const LOG_LIMIT: usize = 15;
const PICKER_LIMIT: usize = 10;
const PARTNER_RECENT: usize = 3;
const DELETABLE_PARTNER_TXS: usize = 5;

/// `1,500,000 Toman`. An empty currency gives the bare number.
pub(crate) fn money(amount: i64, currency: &str) -> String {
    if currency.is_empty() {
        Money::new(amount).to_string()
    } else {
        format!("{} {currency}", Money::new(amount))
    }
}

pub(crate) fn date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

fn action(label: impl Into<String>, command: Command) -> ReplyAction {
    ReplyAction::new(label, &command)
}

fn back_home() -> Vec<ReplyAction> {
    vec![action("🏠 Menu", Command::Home)]
}

pub(crate) fn render_home() -> RenderableReply {
    RenderableReply::text("📒 Resale ledger\n\nChoose an action:").rows([
        vec![
            action("🛒 Buy", Command::Buy),
            action("💰 Sell", Command::Sell),
        ],
        vec![
            action("📦 Purchases", Command::Purchases),
            action("🧾 Sales", Command::Sales),
        ],
        vec![
            action("💸 Costs", Command::Costs),
            action("⏳ Debts", Command::Debts),
        ],
        vec![
            action("🤝 Partners", Command::Partners),
            action("📊 Dashboard", Command::Dashboard),
        ],
        vec![
            action("📜 Transactions", Command::Transactions),
            action("🏦 Capital", Command::Capital),
        ],
        vec![
            action("💾 Backup", Command::Backup),
            action("♻️ Restore", Command::Restore),
        ],
        vec![action("🗑 Clear all data", Command::ClearAll)],
    ])
}

pub(crate) fn render_help() -> RenderableReply {
    let text = format!(
        "ℹ️ Help\n\n\
         Use the menu buttons or these commands:\n\
         /start menu • /dashboard figures • /buy new purchase • /sell sell an item\n\
         /purchases • /sales • /costs • /transactions • /partners • /debts\n\
         /capital • /backup • /restore • /cancel\n\n\
         While answering questions:\n\
         • send {CANCEL_TOKEN} to cancel the whole action;\n\
         • send {SKIP_TOKEN} to keep the current value when editing, or to leave an optional field empty.\n\
         Amounts are whole numbers; separators like 1,500,000 are fine."
    );
    RenderableReply::text(text).row(back_home())
}

pub(crate) fn render_dashboard(dashboard: &Dashboard, currency: &str) -> RenderableReply {
    let mut text = format!(
        "📊 Dashboard\n\n\
         🏦 Initial capital: {}\n\
         💵 Cash balance: {}\n\
         📦 Inventory: {} items worth {}\n\
         📈 Total profit: {}\n\
         💸 Total costs: {}\n\
         📥 Customers owe: {}\n\
         📤 We owe sellers: {}\n\
         🛒 Purchases: {} • 🧾 Sales: {}\n",
        money(dashboard.initial_capital, currency),
        money(dashboard.cash_balance, currency),
        dashboard.inventory.count,
        money(dashboard.inventory.value, currency),
        money(dashboard.total_profit, currency),
        money(dashboard.total_costs, currency),
        money(dashboard.remaining_sales_debt, currency),
        money(dashboard.remaining_purchase_debt, currency),
        dashboard.purchase_count,
        dashboard.sale_count,
    );
    if !dashboard.partners.is_empty() {
        text.push_str("\n🤝 Partners\n");
        for standing in &dashboard.partners {
            text.push_str(&format!(
                "• {}: {}\n",
                standing.name,
                balance_phrase(standing.balance, currency)
            ));
        }
    }
    RenderableReply::text(text).row(back_home())
}

fn balance_phrase(balance: i64, currency: &str) -> String {
    match balance {
        0 => "settled".to_string(),
        b if b > 0 => format!("the company owes {}", money(b, currency)),
        b => format!("owes the company {}", money(-b, currency)),
    }
}

fn purchase_status(ledger: &Ledger, purchase: &Purchase) -> &'static str {
    if purchase.sold {
        "✅ sold"
    } else if calc::purchase_outstanding(ledger, purchase) > 0 {
        "⏳ in stock, unpaid"
    } else {
        "📦 in stock"
    }
}

pub(crate) fn render_purchases(ledger: &Ledger, currency: &str) -> RenderableReply {
    let purchases = ledger.purchases();
    if purchases.is_empty() {
        return RenderableReply::text("📦 No purchases yet.")
            .action("🛒 Buy", &Command::Buy)
            .row(back_home());
    }
    let mut text = format!("📦 Purchases (last {LIST_LIMIT})\n");
    let mut rows = Vec::new();
    for purchase in purchases.iter().rev().take(LIST_LIMIT) {
        text.push_str(&format!(
            "\n#{} • {} • {} • {} • {}",
            purchase.id,
            date(purchase.date),
            purchase.model,
            money(purchase.total_cost, currency),
            purchase_status(ledger, purchase),
        ));
        rows.push(vec![action(
            format!("#{} {}", purchase.id, purchase.model),
            Command::Purchase(purchase.id),
        )]);
    }
    RenderableReply::text(text).rows(rows).row(back_home())
}

pub(crate) fn render_purchase(ledger: &Ledger, purchase: &Purchase, currency: &str) -> RenderableReply {
    let paid = calc::purchase_paid(ledger, purchase.id);
    let outstanding = calc::purchase_outstanding(ledger, purchase);
    let mut text = format!(
        "📦 Purchase #{}\n\n\
         📅 {}\n📱 {}\n\
         💵 Buy price: {}\n🚚 Delivery: {}\n🔧 Other costs: {}\n\
         💰 Total cost: {}\n💸 Paid in cash: {}\n\
         💳 Debt to seller: {} (paid {}, outstanding {})\n\
         {}",
        purchase.id,
        date(purchase.date),
        purchase.model,
        money(purchase.buy_price, currency),
        money(purchase.delivery_cost, currency),
        money(purchase.extra_cost, currency),
        money(purchase.total_cost, currency),
        money(purchase.cash_paid, currency),
        money(purchase.purchase_debt, currency),
        money(paid, currency),
        money(outstanding, currency),
        purchase_status(ledger, purchase),
    );
    if !purchase.notes.is_empty() {
        text.push_str(&format!("\n📝 {}", purchase.notes));
    }

    let mut reply = RenderableReply::text(text);
    if !purchase.sold {
        reply = reply.row(vec![
            action("💰 Sell", Command::SellItem(purchase.id)),
            action("✏️ Edit", Command::EditPurchase(purchase.id)),
            action("🗑 Delete", Command::DeletePurchase(purchase.id)),
        ]);
    } else if let Some(sale) = ledger.sale_for_purchase(purchase.id) {
        reply = reply.action(format!("🧾 Sale #{}", sale.id), &Command::Sale(sale.id));
    }
    if outstanding > 0 {
        reply = reply.action("📤 Pay the seller", &Command::PayPurchase(purchase.id));
    }
    reply.row(vec![
        action("⬅️ Purchases", Command::Purchases),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_sales(ledger: &Ledger, currency: &str) -> RenderableReply {
    let sales = ledger.sales();
    if sales.is_empty() {
        return RenderableReply::text("🧾 No sales yet.").row(back_home());
    }
    let mut text = format!("🧾 Sales (last {LIST_LIMIT})\n");
    let mut rows = Vec::new();
    for sale in sales.iter().rev().take(LIST_LIMIT) {
        let outstanding = calc::sale_outstanding(ledger, sale);
        text.push_str(&format!(
            "\n#{} • {} • {} • {} • profit {}",
            sale.id,
            date(sale.date),
            sale.model,
            money(sale.sell_price, currency),
            money(sale.profit, currency),
        ));
        if outstanding > 0 {
            text.push_str(&format!(" • owes {}", money(outstanding, currency)));
        }
        rows.push(vec![action(
            format!("#{} {}", sale.id, sale.model),
            Command::Sale(sale.id),
        )]);
    }
    RenderableReply::text(text).rows(rows).row(back_home())
}

pub(crate) fn render_sale(ledger: &Ledger, sale: &Sale, currency: &str) -> RenderableReply {
    let paid = calc::sale_paid(ledger, sale.id);
    let outstanding = calc::sale_outstanding(ledger, sale);
    let mut text = format!(
        "🧾 Sale #{}\n\n\
         📅 {}\n📱 {} (purchase #{})\n\
         💵 Cost: {}\n💰 Sell price: {}\n📈 Profit: {}\n\
         💸 Received at sale: {}\n\
         💳 Customer debt: {} (paid {}, outstanding {})",
        sale.id,
        date(sale.date),
        sale.model,
        sale.purchase_id,
        money(sale.purchase_price, currency),
        money(sale.sell_price, currency),
        money(sale.profit, currency),
        money(sale.cash_received, currency),
        money(sale.debt, currency),
        money(paid, currency),
        money(outstanding, currency),
    );
    if !sale.customer_name.is_empty() || !sale.customer_phone.is_empty() {
        text.push_str(&format!(
            "\n👤 {} {}",
            sale.customer_name, sale.customer_phone
        ));
    }
    if !sale.notes.is_empty() {
        text.push_str(&format!("\n📝 {}", sale.notes));
    }

    let mut reply = RenderableReply::text(text).row(vec![
        action("✏️ Edit", Command::EditSale(sale.id)),
        action("🗑 Delete", Command::DeleteSale(sale.id)),
    ]);
    if outstanding > 0 {
        reply = reply.action("📥 Receive payment", &Command::PaySale(sale.id));
    }
    reply.row(vec![
        action("⬅️ Sales", Command::Sales),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_costs(ledger: &Ledger, currency: &str) -> RenderableReply {
    let costs = ledger.costs();
    let new_cost = vec![action("➕ New cost", Command::NewCost)];
    if costs.is_empty() {
        return RenderableReply::text("💸 No costs yet.")
            .row(new_cost)
            .row(back_home());
    }
    let mut text = format!(
        "💸 Costs (last {LIST_LIMIT})\nTotal: {}\n",
        money(calc::total_costs(ledger), currency)
    );
    let mut rows = Vec::new();
    for cost in costs.iter().rev().take(LIST_LIMIT) {
        text.push_str(&format!(
            "\n#{} • {} • {} • {}",
            cost.id,
            date(cost.date),
            cost.title,
            money(cost.amount, currency)
        ));
        rows.push(vec![action(
            format!("#{} {}", cost.id, cost.title),
            Command::Cost(cost.id),
        )]);
    }
    RenderableReply::text(text)
        .rows(rows)
        .row(new_cost)
        .row(back_home())
}

pub(crate) fn render_cost(cost: &Cost, currency: &str) -> RenderableReply {
    let mut text = format!(
        "💸 Cost #{}\n\n📅 {}\n📝 {}\n💵 {}",
        cost.id,
        date(cost.date),
        cost.title,
        money(cost.amount, currency)
    );
    if !cost.description.is_empty() {
        text.push_str(&format!("\n{}", cost.description));
    }
    if let Some(tx_id) = cost.partner_transaction_id {
        text.push_str(&format!(
            "\n\nℹ️ Booked by partner transaction #{tx_id}; delete that transaction to remove it."
        ));
    }
    let mut reply = RenderableReply::text(text);
    if cost.partner_transaction_id.is_none() {
        reply = reply.row(vec![
            action("✏️ Edit", Command::EditCost(cost.id)),
            action("🗑 Delete", Command::DeleteCost(cost.id)),
        ]);
    }
    reply.row(vec![
        action("⬅️ Costs", Command::Costs),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_transactions(ledger: &Ledger, currency: &str) -> RenderableReply {
    let rows = ledger.transactions();
    if rows.is_empty() {
        return RenderableReply::text("📜 No transactions yet.").row(back_home());
    }
    let mut text = format!("📜 Transactions (last {LOG_LIMIT})\n");
    for row in rows.iter().take(LOG_LIMIT) {
        text.push_str(&format!(
            "\n{} • {} • {}",
            date(row.date),
            row.kind.label(),
            money(row.amount, currency)
        ));
        if !row.model.is_empty() {
            text.push_str(&format!(" • {}", row.model));
        }
        if row.debt != 0 {
            text.push_str(&format!(" • debt {}", money(row.debt, currency)));
        }
        if !row.description.is_empty() {
            text.push_str(&format!(" • {}", row.description));
        }
    }
    RenderableReply::text(text).row(back_home())
}

pub(crate) fn render_partners(roster: &PartnerRoster) -> RenderableReply {
    let partners = roster
        .partners()
        .iter()
        .map(|p| vec![action(format!("👤 {}", p.name), Command::Partner(p.id.clone()))]);
    RenderableReply::text("🤝 Partners\n\nPick a partner to record a transaction:")
        .rows(partners)
        .row(vec![
            action("⚖️ Balances", Command::PartnerBalances),
            action("📋 History", Command::PartnerTransactions),
        ])
        .row(back_home())
}

pub(crate) fn render_partner_kinds(roster: &PartnerRoster, partner: &PartnerId) -> RenderableReply {
    let kinds = PartnerTxKind::ALL.into_iter().map(|kind| {
        vec![action(
            kind.label(),
            Command::PartnerEntry(partner.clone(), kind),
        )]
    });
    RenderableReply::text(format!(
        "👤 {}\n\nWhat kind of transaction?",
        roster.display_name(partner)
    ))
    .rows(kinds)
    .row(vec![
        action("⬅️ Partners", Command::Partners),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_partner_balances(
    ledger: &Ledger,
    roster: &PartnerRoster,
    currency: &str,
) -> RenderableReply {
    let mut text = format!(
        "⚖️ Partner balances\n\nNet profit after costs: {}\n",
        money(calc::total_profit(ledger) - calc::total_costs(ledger), currency)
    );
    for standing in calc::partner_standings(ledger, roster) {
        text.push_str(&format!(
            "\n👤 {}\n  share of profit: {}\n  own movements: {}\n  {}\n",
            standing.name,
            money(standing.share, currency),
            money(standing.movements, currency),
            balance_phrase(standing.balance, currency),
        ));
        let history: Vec<_> = calc::partner_history(ledger, &standing.partner).collect();
        for tx in history.iter().rev().take(PARTNER_RECENT) {
            text.push_str(&format!(
                "  • {} {} {}\n",
                date(tx.date),
                tx.kind.label(),
                money(tx.amount, currency)
            ));
        }
    }
    RenderableReply::text(text).row(vec![
        action("⬅️ Partners", Command::Partners),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_partner_transactions(
    ledger: &Ledger,
    roster: &PartnerRoster,
    currency: &str,
) -> RenderableReply {
    let txs = ledger.partner_transactions();
    if txs.is_empty() {
        return RenderableReply::text("📋 No partner transactions yet.").row(vec![
            action("⬅️ Partners", Command::Partners),
            action("🏠 Menu", Command::Home),
        ]);
    }
    let mut text = format!("📋 Partner transactions (last {LIST_LIMIT})\n");
    let mut rows = Vec::new();
    for (i, tx) in txs.iter().rev().take(LIST_LIMIT).enumerate() {
        text.push_str(&format!(
            "\n#{} • {} • {} • {} • {}",
            tx.id,
            date(tx.date),
            roster.display_name(&tx.partner),
            tx.kind.label(),
            money(tx.amount, currency)
        ));
        if !tx.description.is_empty() {
            text.push_str(&format!(" • {}", tx.description));
        }
        if i < DELETABLE_PARTNER_TXS {
            rows.push(vec![action(
                format!("🗑 Delete #{}", tx.id),
                Command::DeletePartnerTransaction(tx.id),
            )]);
        }
    }
    RenderableReply::text(text).rows(rows).row(vec![
        action("⬅️ Partners", Command::Partners),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_debts() -> RenderableReply {
    RenderableReply::text("⏳ Debts")
        .action("📥 Customer paid", &Command::PaySaleDebt)
        .action("📤 We paid a seller", &Command::PayPurchaseDebt)
        .action("📋 Status", &Command::DebtStatus)
        .row(back_home())
}

pub(crate) fn render_debt_status(ledger: &Ledger, currency: &str) -> RenderableReply {
    let mut text = format!(
        "📋 Debt status\n\n📥 Customers owe: {}\n",
        money(calc::remaining_sales_debt(ledger), currency)
    );
    for (sale, outstanding) in calc::open_sale_debts(ledger) {
        let customer = if sale.customer_name.is_empty() {
            String::new()
        } else {
            format!(" ({})", sale.customer_name)
        };
        text.push_str(&format!(
            "  • sale #{} {}{}: {}\n",
            sale.id,
            sale.model,
            customer,
            money(outstanding, currency)
        ));
    }
    text.push_str(&format!(
        "\n📤 We owe sellers: {}\n",
        money(calc::remaining_purchase_debt(ledger), currency)
    ));
    for (purchase, outstanding) in calc::open_purchase_debts(ledger) {
        text.push_str(&format!(
            "  • purchase #{} {}: {}\n",
            purchase.id,
            purchase.model,
            money(outstanding, currency)
        ));
    }
    RenderableReply::text(text).row(vec![
        action("⬅️ Debts", Command::Debts),
        action("🏠 Menu", Command::Home),
    ])
}

pub(crate) fn render_sell_picker(ledger: &Ledger, currency: &str) -> RenderableReply {
    let items = ledger
        .purchases()
        .iter()
        .rev()
        .filter(|p| !p.sold)
        .take(PICKER_LIMIT)
        .map(|p| {
            vec![action(
                format!("#{} {} • {}", p.id, p.model, money(p.total_cost, currency)),
                Command::SellItem(p.id),
            )]
        })
        .collect::<Vec<_>>();
    if items.is_empty() {
        return RenderableReply::text("📦 Nothing in stock to sell.").row(back_home());
    }
    RenderableReply::text("💰 Which item are you selling?")
        .rows(items)
        .row(back_home())
}

pub(crate) fn render_pay_sale_picker(ledger: &Ledger, currency: &str) -> RenderableReply {
    let items = calc::open_sale_debts(ledger)
        .into_iter()
        .take(PICKER_LIMIT)
        .map(|(sale, outstanding)| {
            vec![action(
                format!("#{} {} • {}", sale.id, sale.model, money(outstanding, currency)),
                Command::PaySale(sale.id),
            )]
        })
        .collect::<Vec<_>>();
    if items.is_empty() {
        return RenderableReply::text("📥 No customer owes anything.").row(back_home());
    }
    RenderableReply::text("📥 Which sale is the payment for?")
        .rows(items)
        .row(back_home())
}

pub(crate) fn render_pay_purchase_picker(ledger: &Ledger, currency: &str) -> RenderableReply {
    let items = calc::open_purchase_debts(ledger)
        .into_iter()
        .take(PICKER_LIMIT)
        .map(|(purchase, outstanding)| {
            vec![action(
                format!(
                    "#{} {} • {}",
                    purchase.id,
                    purchase.model,
                    money(outstanding, currency)
                ),
                Command::PayPurchase(purchase.id),
            )]
        })
        .collect::<Vec<_>>();
    if items.is_empty() {
        return RenderableReply::text("📤 We owe no seller anything.").row(back_home());
    }
    RenderableReply::text("📤 Which purchase is the payment for?")
        .rows(items)
        .row(back_home())
}

pub(crate) fn render_backup_menu() -> RenderableReply {
    let kinds = BackupKind::ALL
        .into_iter()
        .map(|kind| vec![action(format!("💾 {}", kind.label()), Command::BackupOf(kind))]);
    RenderableReply::text("💾 Which backup do you want?")
        .rows(kinds)
        .row(back_home())
}

pub(crate) fn render_confirm(question: &str) -> RenderableReply {
    RenderableReply::text(format!("⚠️ {question}")).row(vec![
        action("✅ Yes", Command::Confirm),
        action("❌ No", Command::Cancel),
    ])
}

pub(crate) fn render_error(err: &EngineError) -> RenderableReply {
    RenderableReply::text(format!("❌ {err}")).row(back_home())
}

/// The current step's question with the sentinel hints.
pub(crate) fn render_prompt(progress: &dyn ActiveWorkflow) -> RenderableReply {
    let (index, total) = progress.position();
    let mut text = format!(
        "{} ({}/{})\n\n{}\n",
        progress.kind().title(),
        index + 1,
        total,
        progress.prompt()
    );
    match progress.skip() {
        Some(Skip::Keep) => {
            text.push_str(&format!("\nSend {SKIP_TOKEN} to keep the current value."));
        }
        Some(Skip::Default) => {
            text.push_str(&format!("\nSend {SKIP_TOKEN} to leave it empty."));
        }
        None => {}
    }
    text.push_str(&format!("\nSend {CANCEL_TOKEN} to cancel."));
    RenderableReply::text(text).action("❌ Cancel", &Command::Cancel)
}

/// A rejected answer: the error, then the same question again.
pub(crate) fn render_step_error(err: &EngineError, progress: &dyn ActiveWorkflow) -> RenderableReply {
    let mut reply = render_prompt(progress);
    reply.text = format!("❌ {err}\n\n{}", reply.text);
    reply
}

pub(crate) fn render_receipt(text: String) -> RenderableReply {
    RenderableReply::text(text).row(back_home())
}

pub(crate) fn render_cancelled() -> RenderableReply {
    let mut reply = render_home();
    reply.text = format!("🚫 Cancelled. Nothing was saved.\n\n{}", reply.text);
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands_and_appends_the_currency() {
        assert_eq!(money(1_500_000, "Toman"), "1,500,000 Toman");
        assert_eq!(money(-150_000, ""), "-150,000");
    }

    #[test]
    fn dates_use_slashes() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(date(day), "2026/01/05");
    }

    #[test]
    fn confirm_offers_yes_and_no() {
        let reply = render_confirm("Delete purchase #3?");
        assert!(reply.has_command(&Command::Confirm));
        assert!(reply.has_command(&Command::Cancel));
    }

    #[test]
    fn home_reaches_every_menu() {
        let reply = render_home();
        for command in [
            Command::Buy,
            Command::Sell,
            Command::Purchases,
            Command::Sales,
            Command::Costs,
            Command::Debts,
            Command::Partners,
            Command::Dashboard,
            Command::Transactions,
            Command::Capital,
            Command::Backup,
            Command::Restore,
            Command::ClearAll,
        ] {
            assert!(reply.has_command(&command), "{command}");
        }
    }

    #[test]
    fn balance_phrases_name_the_debtor() {
        assert_eq!(balance_phrase(0, ""), "settled");
        assert_eq!(balance_phrase(150_000, ""), "the company owes 150,000");
        assert_eq!(balance_phrase(-150_000, ""), "owes the company 150,000");
    }
}
