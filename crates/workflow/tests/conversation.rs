use chrono::Utc;

use engine::{
    Dashboard, Ledger, LedgerStore, MemoryStorage, NewCost, NewPurchase, NewSale, PartnerId, calc,
};
use workflow::{Command, Conversation, Event, RenderableReply, SessionId};

const OPERATOR: SessionId = SessionId(42);
const OTHER: SessionId = SessionId(7);

struct Harness {
    conversation: Conversation,
    storage: MemoryStorage,
}

async fn harness() -> Harness {
    let storage = MemoryStorage::new();
    let store = LedgerStore::builder().storage(storage.clone()).build().await;
    Harness {
        conversation: Conversation::builder(store).currency_label("Toman").build(),
        storage,
    }
}

impl Harness {
    async fn text(&self, text: &str) -> RenderableReply {
        self.conversation
            .handle(Event::text(OPERATOR, text))
            .await
    }

    async fn command(&self, name: &str) -> RenderableReply {
        self.conversation
            .handle(Event::command(OPERATOR, name))
            .await
    }

    async fn answers(&self, inputs: &[&str]) -> RenderableReply {
        let mut last = RenderableReply::default();
        for input in inputs {
            last = self.text(input).await;
        }
        last
    }

    async fn busy(&self) -> bool {
        self.conversation.in_progress(OPERATOR).await
    }

    async fn dashboard(&self) -> Dashboard {
        let ledger = self.conversation.store().snapshot().await;
        Dashboard::compute(&ledger, self.conversation.roster())
    }

    async fn seed_purchase(&self, model: &str, price: i64, debt: i64) -> u64 {
        let today = Utc::now().date_naive();
        self.conversation
            .store()
            .mutate(|ledger| {
                ledger.create_purchase(NewPurchase::new(today, model, price).purchase_debt(debt))
            })
            .await
            .unwrap()
    }

    async fn seed_sale(&self, purchase_id: u64, price: i64, debt: i64) -> u64 {
        let today = Utc::now().date_naive();
        self.conversation
            .store()
            .mutate(|ledger| ledger.create_sale(NewSale::new(today, purchase_id, price).debt(debt)))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn buy_walks_every_step_and_commits_once() {
    let h = harness().await;

    let first = h.command("buy").await;
    assert!(first.text.contains("(1/6)"));
    assert!(first.has_command(&Command::Cancel));

    let receipt = h
        .answers(&["Galaxy A52", "8,000,000", ".", "250,000", ".", "blue"])
        .await;
    assert!(receipt.text.contains("Purchase saved"), "{}", receipt.text);
    assert!(!h.busy().await);

    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(ledger.purchases().len(), 1);
    let purchase = &ledger.purchases()[0];
    assert_eq!(purchase.model, "Galaxy A52");
    assert_eq!(purchase.delivery_cost, 0);
    assert_eq!(purchase.extra_cost, 250_000);
    assert_eq!(purchase.total_cost, 8_250_000);
    assert_eq!(purchase.cash_paid, 8_250_000);
    assert_eq!(purchase.notes, "blue");
    assert_eq!(ledger.transactions().len(), 1);
}

#[tokio::test]
async fn capital_buy_and_sell_scenario() {
    let h = harness().await;

    h.command("capital").await;
    h.text("10,000,000").await;
    h.command("buy").await;
    h.answers(&["iPhone 13", "8000000", ".", ".", ".", "."]).await;
    assert_eq!(h.dashboard().await.cash_balance, 2_000_000);

    let purchase_id = h.conversation.store().snapshot().await.purchases()[0].id;
    h.command(&format!("sell:{purchase_id}")).await;
    let receipt = h.answers(&["9,500,000", ".", "Sara", "۰۹۱۲۱۲۳۴۵۶۷", "."]).await;
    assert!(receipt.text.contains("Sale saved"), "{}", receipt.text);

    let dashboard = h.dashboard().await;
    assert_eq!(dashboard.total_profit, 1_500_000);
    assert_eq!(dashboard.cash_balance, 11_500_000);
    assert_eq!(dashboard.inventory.count, 0);

    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(ledger.sales()[0].customer_phone, "09121234567");
}

#[tokio::test]
async fn cancelling_mid_workflow_leaves_the_saved_ledger_untouched() {
    let h = harness().await;
    h.seed_purchase("Note 10", 5_000_000, 0).await;
    let before = h.storage.saved_bytes();

    h.command("buy").await;
    h.answers(&["Pixel 7", "6,000,000", "100,000"]).await;
    assert!(h.busy().await);
    let reply = h.text("-").await;

    assert!(reply.text.contains("Cancelled"));
    assert!(reply.has_command(&Command::Buy));
    assert!(!h.busy().await);
    assert_eq!(h.storage.saved_bytes(), before);
    assert_eq!(h.conversation.store().snapshot().await.purchases().len(), 1);
}

/// Row counts of every collection the workflows write to.
fn counts(ledger: &Ledger) -> [usize; 7] {
    [
        ledger.purchases().len(),
        ledger.sales().len(),
        ledger.costs().len(),
        ledger.debt_payments().len(),
        ledger.purchase_debt_payments().len(),
        ledger.partner_transactions().len(),
        ledger.transactions().len(),
    ]
}

#[tokio::test]
async fn cancelling_at_any_step_of_any_workflow_changes_nothing() {
    let h = harness().await;
    h.command("capital").await;
    h.text("50,000,000").await;
    let unsold = h.seed_purchase("Galaxy A15", 4_000_000, 1_000_000).await;
    let sold = h.seed_purchase("Galaxy A25", 6_000_000, 0).await;
    let sale = h.seed_sale(sold, 7_000_000, 2_000_000).await;
    let today = Utc::now().date_naive();
    let cost = h
        .conversation
        .store()
        .mutate(|ledger| ledger.create_cost(NewCost::new(today, "Rent", 500_000)))
        .await
        .unwrap();

    let workflows: Vec<(String, Vec<&str>)> = vec![
        ("buy".into(), vec!["Pixel 8", "9,000,000", "100", "200", "300", "boxed"]),
        (
            format!("purchase_edit:{unsold}"),
            vec![".", "4,500,000", ".", ".", ".", "."],
        ),
        (format!("sell:{unsold}"), vec!["5,000,000", "1,000", "Sara", "09121234567", "."]),
        (format!("sale_edit:{sale}"), vec!["7,500,000", ".", ".", ".", "."]),
        ("cost_new".into(), vec!["Ads", "250,000", "."]),
        (format!("cost_edit:{cost}"), vec!["Office rent", "600,000", "."]),
        (format!("pay_sale:{sale}"), vec!["500,000", "."]),
        (format!("pay_purchase:{unsold}"), vec!["500,000", "cash"]),
        ("partner:partner_a:cash_withdraw".into(), vec!["100,000", "."]),
        ("partner:partner_b:personal_expense".into(), vec!["100,000", "Sign"]),
        ("capital".into(), vec!["1,000"]),
        ("restore".into(), vec!["no file yet"]),
    ];

    let before_bytes = h.storage.saved_bytes();
    let before_counts = counts(&h.conversation.store().snapshot().await);

    for (start, answers) in &workflows {
        // The last answer would commit, so every earlier step is a cancel point.
        for step in 0..answers.len() {
            for cancel_by_command in [false, true] {
                let opened = h.command(start).await;
                assert!(h.busy().await, "{start}: {}", opened.text);
                h.answers(&answers[..step]).await;
                assert!(h.busy().await, "{start} stopped before step {step}");

                let reply = if cancel_by_command {
                    h.command("cancel").await
                } else {
                    h.text("-").await
                };
                assert!(!h.busy().await, "{start} survived a cancel at step {step}");
                assert!(reply.text.contains("Cancelled"), "{start}: {}", reply.text);
                assert_eq!(h.storage.saved_bytes(), before_bytes, "{start} at step {step}");
                assert_eq!(
                    counts(&h.conversation.store().snapshot().await),
                    before_counts,
                    "{start} at step {step}"
                );
            }
        }
    }

    for delete in [
        format!("purchase_delete:{unsold}"),
        format!("sale_delete:{sale}"),
        format!("cost_delete:{cost}"),
        "clear_all".to_string(),
    ] {
        h.command(&delete).await;
        assert!(h.busy().await, "{delete}");
        h.command("cancel").await;
        assert!(!h.busy().await, "{delete}");
        assert_eq!(h.storage.saved_bytes(), before_bytes, "{delete}");
    }
}

#[tokio::test]
async fn cancel_command_also_abandons_the_workflow() {
    let h = harness().await;
    h.command("cost_new").await;
    h.text("Rent").await;
    h.command("cancel").await;
    assert!(!h.busy().await);
    assert!(h.conversation.store().snapshot().await.costs().is_empty());
}

#[tokio::test]
async fn invalid_input_reprompts_the_same_step() {
    let h = harness().await;
    h.command("buy").await;
    h.text("Galaxy S21").await;

    let reply = h.text("twelve").await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);
    assert!(reply.text.contains("(2/6)"));
    assert!(h.busy().await);

    let reply = h.text("12000000").await;
    assert!(reply.text.contains("(3/6)"));
}

#[tokio::test]
async fn required_steps_reject_the_skip_token() {
    let h = harness().await;
    h.command("buy").await;
    let reply = h.text(".").await;
    assert!(reply.text.contains("required"), "{}", reply.text);
    assert!(reply.text.contains("(1/6)"));
    assert!(h.busy().await);
}

#[tokio::test]
async fn purchase_debt_above_total_is_rejected_at_the_step() {
    let h = harness().await;
    h.command("buy").await;
    let reply = h.answers(&["Galaxy S21", "1000", "0", "0", "2000"]).await;
    assert!(reply.text.starts_with("❌"));
    assert!(reply.text.contains("(5/6)"));

    h.answers(&["400", "."]).await;
    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(ledger.purchases()[0].purchase_debt, 400);
    assert_eq!(ledger.purchases()[0].cash_paid, 600);
}

#[tokio::test]
async fn editing_with_the_skip_token_keeps_current_values() {
    let h = harness().await;
    let id = h.seed_purchase("Redmi 12", 3_000_000, 1_000_000).await;

    h.command(&format!("purchase_edit:{id}")).await;
    let reply = h.answers(&[".", "3,200,000", ".", ".", ".", "boxed"]).await;
    assert!(reply.text.contains("Purchase updated"), "{}", reply.text);

    let ledger = h.conversation.store().snapshot().await;
    let purchase = ledger.purchase(id).unwrap();
    assert_eq!(purchase.model, "Redmi 12");
    assert_eq!(purchase.buy_price, 3_200_000);
    assert_eq!(purchase.purchase_debt, 1_000_000);
    assert_eq!(purchase.cash_paid, 2_200_000);
    assert_eq!(purchase.notes, "boxed");
}

#[tokio::test]
async fn sold_purchases_cannot_be_edited() {
    let h = harness().await;
    let id = h.seed_purchase("Redmi 12", 3_000_000, 0).await;
    h.seed_sale(id, 3_500_000, 0).await;

    let reply = h.command(&format!("purchase_edit:{id}")).await;
    assert!(reply.text.starts_with("❌"));
    assert!(!h.busy().await);
}

#[tokio::test]
async fn sale_debt_installments_and_overpayment() {
    let h = harness().await;
    let purchase = h.seed_purchase("A34", 7_000_000, 0).await;
    let sale = h.seed_sale(purchase, 9_000_000, 2_000_000).await;

    for _ in 0..2 {
        h.command(&format!("pay_sale:{sale}")).await;
        let receipt = h.answers(&["500,000", "."]).await;
        assert!(receipt.text.contains("Payment received"), "{}", receipt.text);
    }
    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(calc::remaining_sales_debt(&ledger), 1_000_000);

    h.command(&format!("pay_sale:{sale}")).await;
    let reply = h.text("1,500,000").await;
    assert!(reply.text.contains("exceeds"), "{}", reply.text);
    assert!(h.busy().await);

    let reply = h.text("0").await;
    assert!(reply.text.starts_with("❌"));
    h.text("-").await;

    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(ledger.debt_payments().len(), 2);
    assert_eq!(calc::remaining_sales_debt(&ledger), 1_000_000);
}

#[tokio::test]
async fn paying_the_seller_lowers_purchase_debt() {
    let h = harness().await;
    let purchase = h.seed_purchase("Tab S9", 20_000_000, 5_000_000).await;

    let picker = h.command("pay_purchase_debt").await;
    assert!(picker.has_command(&Command::PayPurchase(purchase)));

    h.command(&format!("pay_purchase:{purchase}")).await;
    h.answers(&["2,000,000", "cash"]).await;

    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(calc::remaining_purchase_debt(&ledger), 3_000_000);
    assert_eq!(ledger.purchase(purchase).unwrap().remaining_debt, 3_000_000);
}

#[tokio::test]
async fn deletes_wait_for_confirmation() {
    let h = harness().await;
    let id = h.seed_purchase("Moto G", 2_000_000, 0).await;

    let reply = h.command(&format!("purchase_delete:{id}")).await;
    assert!(reply.has_command(&Command::Confirm));
    assert!(h.busy().await);

    h.command("cancel").await;
    assert!(h.conversation.store().snapshot().await.purchase(id).is_some());

    h.command(&format!("purchase_delete:{id}")).await;
    let reply = h.command("confirm").await;
    assert!(reply.text.contains("deleted"), "{}", reply.text);
    assert!(h.conversation.store().snapshot().await.purchase(id).is_none());
    assert!(!h.busy().await);
}

#[tokio::test]
async fn text_during_a_confirmation_does_not_confirm() {
    let h = harness().await;
    h.seed_purchase("Moto G", 2_000_000, 0).await;

    h.command("clear_all").await;
    let reply = h.text("yes").await;
    assert!(reply.has_command(&Command::Confirm));
    assert!(h.busy().await);
    assert!(!h.conversation.store().snapshot().await.is_empty());

    h.command("confirm").await;
    assert!(h.conversation.store().snapshot().await.is_empty());
}

#[tokio::test]
async fn deleting_a_sold_purchase_is_refused_up_front() {
    let h = harness().await;
    let id = h.seed_purchase("Moto G", 2_000_000, 0).await;
    h.seed_sale(id, 2_500_000, 0).await;

    let reply = h.command(&format!("purchase_delete:{id}")).await;
    assert!(reply.text.starts_with("❌"));
    assert!(!reply.has_command(&Command::Confirm));
    assert!(!h.busy().await);
}

#[tokio::test]
async fn deleting_a_sale_returns_the_item_to_stock() {
    let h = harness().await;
    let purchase = h.seed_purchase("Moto G", 2_000_000, 0).await;
    let sale = h.seed_sale(purchase, 2_500_000, 0).await;
    assert_eq!(h.dashboard().await.inventory.count, 0);

    h.command(&format!("sale_delete:{sale}")).await;
    h.command("confirm").await;

    let dashboard = h.dashboard().await;
    assert_eq!(dashboard.inventory.count, 1);
    assert_eq!(dashboard.sale_count, 0);
}

#[tokio::test]
async fn personal_expense_splits_between_partners() {
    let h = harness().await;

    let kinds = h.command("partner:partner_a").await;
    assert!(kinds.has_command(&Command::PartnerEntry(
        PartnerId::new("partner_a"),
        engine::PartnerTxKind::PersonalExpense,
    )));

    h.command("partner:partner_a:personal_expense").await;
    let receipt = h.answers(&["300,000", "Shop sign"]).await;
    assert!(receipt.text.contains("company cost"), "{}", receipt.text);

    let dashboard = h.dashboard().await;
    assert_eq!(dashboard.total_costs, 300_000);
    let a = &dashboard.partners[0];
    let b = &dashboard.partners[1];
    assert_eq!((a.share, a.balance), (-150_000, 150_000));
    assert_eq!((b.share, b.balance), (-150_000, -150_000));
}

#[tokio::test]
async fn unknown_partners_are_reported() {
    let h = harness().await;
    let reply = h.command("partner:nobody:cash_withdraw").await;
    assert!(reply.text.starts_with("❌"));
    assert!(!h.busy().await);
}

#[tokio::test]
async fn full_backup_restores_into_an_empty_ledger() {
    let source = harness().await;
    source.command("capital").await;
    source.text("10,000,000").await;
    let purchase = source.seed_purchase("iPhone 13", 8_000_000, 0).await;
    source.seed_sale(purchase, 9_500_000, 0).await;
    source.seed_purchase("iPhone 14", 11_000_000, 1_000_000).await;

    let backup = source.command("backup:full").await;
    let attachment = backup.attachment.expect("backup file");
    assert!(attachment.file_name.starts_with("backup_full_"));

    let target = harness().await;
    let prompt = target.command("restore").await;
    assert!(prompt.text.contains("backup"));

    let reply = target.text("here it is").await;
    assert!(reply.text.starts_with("❌"));
    assert!(target.busy().await);

    let receipt = target
        .conversation
        .handle(Event::file(OPERATOR, attachment.bytes))
        .await;
    assert!(receipt.text.contains("restored"), "{}", receipt.text);
    assert_eq!(target.dashboard().await, source.dashboard().await);
}

#[tokio::test]
async fn full_backup_is_refused_into_a_non_empty_ledger() {
    let source = harness().await;
    source.seed_purchase("iPhone 13", 8_000_000, 0).await;
    let bytes = source.command("backup:full").await.attachment.unwrap().bytes;

    let target = harness().await;
    target.seed_purchase("Nokia", 1_000_000, 0).await;
    let before = target.storage.saved_bytes();

    target.command("restore").await;
    let reply = target.conversation.handle(Event::file(OPERATOR, bytes)).await;
    assert!(reply.text.starts_with("❌"));
    assert!(!target.busy().await);
    assert_eq!(target.storage.saved_bytes(), before);
}

#[tokio::test]
async fn inventory_backup_adds_unsold_items() {
    let source = harness().await;
    let sold = source.seed_purchase("Sold one", 1_000_000, 0).await;
    source.seed_sale(sold, 1_200_000, 0).await;
    source.seed_purchase("In stock", 2_000_000, 500_000).await;
    let bytes = source.command("backup:inventory").await.attachment.unwrap().bytes;

    let target = harness().await;
    target.seed_purchase("Already here", 3_000_000, 0).await;
    target.command("restore").await;
    target.conversation.handle(Event::file(OPERATOR, bytes)).await;

    let ledger = target.conversation.store().snapshot().await;
    assert_eq!(ledger.purchases().len(), 2);
    let restored = ledger
        .purchases()
        .iter()
        .find(|p| p.model == "In stock")
        .unwrap();
    assert_eq!(restored.purchase_debt, 500_000);
    assert!(!restored.sold);
}

#[tokio::test]
async fn malformed_backup_aborts_the_restore() {
    let h = harness().await;
    h.command("restore").await;
    let reply = h
        .conversation
        .handle(Event::file(OPERATOR, b"{\"type\":\"weekly\"}".to_vec()))
        .await;
    assert!(reply.text.starts_with("❌"));
    assert!(!h.busy().await);
    assert!(h.conversation.store().snapshot().await.is_empty());
}

#[tokio::test]
async fn other_commands_abandon_the_workflow() {
    let h = harness().await;
    h.command("buy").await;
    h.text("Galaxy A15").await;

    let reply = h.command("dashboard").await;
    assert!(reply.text.contains("Dashboard"));
    assert!(!h.busy().await);
    assert!(h.conversation.store().snapshot().await.purchases().is_empty());
}

#[tokio::test]
async fn unknown_commands_keep_the_workflow() {
    let h = harness().await;
    h.command("buy").await;
    let reply = h.command("fly").await;
    assert!(reply.text.starts_with("❌"));
    assert!(h.busy().await);
}

#[tokio::test]
async fn commit_fails_cleanly_when_the_item_was_sold_meanwhile() {
    let h = harness().await;
    let id = h.seed_purchase("Xperia", 4_000_000, 0).await;

    h.command(&format!("sell:{id}")).await;
    h.answers(&["5,000,000", ".", ".", "."]).await;

    // Another operator sells the same item first.
    h.conversation
        .handle(Event::command(OTHER, format!("sell:{id}")))
        .await;
    for input in ["5,100,000", ".", ".", ".", "."] {
        h.conversation.handle(Event::text(OTHER, input)).await;
    }

    let reply = h.text(".").await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);
    assert!(!h.busy().await);
    let ledger = h.conversation.store().snapshot().await;
    assert_eq!(ledger.sales().len(), 1);
    assert_eq!(ledger.sales()[0].sell_price, 5_100_000);
}

#[tokio::test]
async fn files_outside_a_restore_are_ignored() {
    let h = harness().await;
    let reply = h
        .conversation
        .handle(Event::file(OPERATOR, b"{}".to_vec()))
        .await;
    assert!(reply.has_command(&Command::Restore));
    assert!(h.conversation.store().snapshot().await.is_empty());
}

#[tokio::test]
async fn lists_link_to_details() {
    let h = harness().await;
    let purchase = h.seed_purchase("Honor 90", 6_000_000, 0).await;

    let list = h.command("purchases").await;
    assert!(list.text.contains("Honor 90"));
    assert!(list.has_command(&Command::Purchase(purchase)));

    let detail = h.command(&format!("purchase:{purchase}")).await;
    assert!(detail.has_command(&Command::SellItem(purchase)));
    assert!(detail.has_command(&Command::EditPurchase(purchase)));
    assert!(detail.has_command(&Command::DeletePurchase(purchase)));

    let picker = h.command("sell").await;
    assert!(picker.has_command(&Command::SellItem(purchase)));

    let missing = h.command("purchase:999").await;
    assert!(missing.text.contains("not found"), "{}", missing.text);
}
