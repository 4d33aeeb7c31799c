use chrono::{NaiveDate, NaiveDateTime};

use engine::{
    BackupDocument, BackupKind, DebtPaymentNew, EngineError, Ledger, NewPurchase, NewSale,
    TransactionKind, calc,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn later() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
}

fn now() -> NaiveDateTime {
    day().and_hms_opt(12, 0, 0).unwrap()
}

/// One sold item, one unsold item with a partly paid debt, one plain unsold item.
fn source_ledger() -> Ledger {
    let mut ledger = Ledger::default();
    let sold = ledger
        .create_purchase(NewPurchase::new(day(), "Sold", 1_000))
        .unwrap();
    ledger.create_sale(NewSale::new(day(), sold, 2_000)).unwrap();
    let owed = ledger
        .create_purchase(NewPurchase::new(day(), "Owed", 5_000).purchase_debt(3_000))
        .unwrap();
    ledger
        .pay_purchase_debt(DebtPaymentNew::new(day(), owed, 1_000))
        .unwrap();
    ledger
        .create_purchase(NewPurchase::new(day(), "Plain", 700).delivery_cost(50))
        .unwrap();
    ledger
}

fn reparse(document: &BackupDocument) -> BackupDocument {
    BackupDocument::from_slice(&document.to_json().unwrap()).unwrap()
}

#[test]
fn inventory_export_skips_sold_items() {
    let document = source_ledger().export(BackupKind::Inventory, now());
    assert_eq!(document.kind(), BackupKind::Inventory);
    assert_eq!(document.item_count(), 2);
}

#[test]
fn inventory_restore_rebases_debt_on_what_is_still_owed() {
    let document = reparse(&source_ledger().export(BackupKind::Inventory, now()));

    let mut target = Ledger::default();
    let summary = target.restore(document, later()).unwrap();

    assert_eq!(summary.purchases, 2);
    assert_eq!(calc::inventory(&target).count, 2);
    assert_eq!(calc::inventory(&target).value, 5_750);
    assert_eq!(calc::remaining_purchase_debt(&target), 2_000);
    let owed = target.purchases().iter().find(|p| p.model == "Owed").unwrap();
    assert_eq!(owed.purchase_debt, 2_000);
    assert_eq!(owed.cash_paid, 3_000);
    assert_eq!(owed.date, later());
    assert!(
        target
            .transactions()
            .iter()
            .all(|row| row.kind == TransactionKind::Restore)
    );
    assert!(target.validate().is_ok());
}

#[test]
fn inventory_debt_restore_keeps_payment_history() {
    let document = reparse(&source_ledger().export(BackupKind::InventoryDebt, now()));

    let mut target = Ledger::default();
    target
        .create_purchase(NewPurchase::new(day(), "Existing", 1))
        .unwrap();
    let summary = target.restore(document, later()).unwrap();

    assert_eq!(summary.payments, 1);
    assert_eq!(target.purchases().len(), 3);
    let owed = target.purchases().iter().find(|p| p.model == "Owed").unwrap();
    assert_eq!(owed.purchase_debt, 3_000);
    assert_eq!(calc::purchase_paid(&target, owed.id), 1_000);
    assert_eq!(calc::remaining_purchase_debt(&target), 2_000);
    assert!(target.validate().is_ok());
}

#[test]
fn restored_items_get_fresh_ids() {
    let source = source_ledger();
    let document = source.export(BackupKind::Inventory, now());
    let mut target = source.clone();
    target.restore(document, later()).unwrap();
    assert_eq!(target.purchases().len(), source.purchases().len() + 2);
    assert!(target.validate().is_ok());
}

#[test]
fn full_restore_requires_an_empty_ledger() {
    let document = source_ledger().export(BackupKind::Full, now());
    let mut target = source_ledger();
    let before = target.clone();
    let err = target.restore(document, later()).unwrap_err();
    assert!(matches!(err, EngineError::InvariantViolation(_)));
    assert_eq!(target, before);
}

#[test]
fn inconsistent_items_are_rejected_whole() {
    let json = r#"{
        "type": "inventory",
        "created_at": "2026-10-16T12:00:00",
        "items": [
            {"id": 1, "date": "2026-10-01", "model": "Good", "buy_price": 10,
             "total_cost": 10, "cash_paid": 10},
            {"id": 2, "date": "2026-10-01", "model": "Bad", "buy_price": 10,
             "total_cost": 99, "cash_paid": 99}
        ]
    }"#;
    let document = BackupDocument::from_slice(json.as_bytes()).unwrap();
    let mut target = Ledger::default();
    let err = target.restore(document, later()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport(_)));
    assert!(target.is_empty());
}

#[test]
fn oversized_amounts_are_malformed() {
    let json = r#"{
        "type": "inventory",
        "created_at": "2026-10-16T12:00:00",
        "items": [
            {"id": 1, "date": "2026-10-01", "model": "Huge", "buy_price": 9223372036854775807,
             "delivery_cost": 1, "total_cost": -9223372036854775808,
             "cash_paid": -9223372036854775808}
        ]
    }"#;
    let document = BackupDocument::from_slice(json.as_bytes()).unwrap();
    let mut target = Ledger::default();
    let err = target.restore(document, later()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport(_)));
    assert!(target.is_empty());
}

#[test]
fn payments_for_unknown_items_are_rejected() {
    let json = r#"{
        "type": "inventory_debt",
        "created_at": "2026-10-16T12:00:00",
        "items": [],
        "payments": [{"id": 5, "purchase_id": 77, "date": "2026-10-01", "amount": 10}]
    }"#;
    let document = BackupDocument::from_slice(json.as_bytes()).unwrap();
    let err = Ledger::default().restore(document, later()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport(_)));
}

#[test]
fn missing_type_is_malformed() {
    let err = BackupDocument::from_slice(br#"{"items": []}"#).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport(_)));
}
