use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::NaiveDate;

use engine::{
    BackupKind, EngineError, JsonFileStorage, Ledger, LedgerStore, MemoryStorage, NewCost,
    NewPurchase, NewSale, PartnerRoster, ResultEngine, SnapshotStorage, calc,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn test_file(name: &str) -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_data");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join(format!("{name}_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

/// Storage whose saves can be switched to fail.
#[derive(Clone, Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    failing: Arc<AtomicBool>,
}

impl SnapshotStorage for FlakyStorage {
    fn load(&self) -> ResultEngine<Option<Ledger>> {
        self.inner.load()
    }

    fn save(&self, ledger: &Ledger) -> ResultEngine<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Persistence("disk full".to_string()));
        }
        self.inner.save(ledger)
    }
}

#[tokio::test]
async fn mutate_persists_and_publishes() {
    let storage = MemoryStorage::new();
    let store = LedgerStore::builder().storage(storage.clone()).build().await;

    let id = store
        .mutate(|ledger| ledger.create_purchase(NewPurchase::new(day(), "A52", 1_000)))
        .await
        .unwrap();

    assert!(store.snapshot().await.purchase(id).is_some());
    let reloaded = storage.load().unwrap().unwrap();
    assert!(reloaded.purchase(id).is_some());
}

#[tokio::test]
async fn failed_operation_leaves_store_and_storage_untouched() {
    let storage = MemoryStorage::new();
    let store = LedgerStore::builder().storage(storage.clone()).build().await;
    store
        .mutate(|ledger| ledger.set_capital(100, day()))
        .await
        .unwrap();
    let before = storage.saved_bytes().unwrap();

    let err = store
        .mutate(|ledger| {
            // Partial work followed by a failure must not leak out.
            ledger.create_cost(NewCost::new(day(), "Rent", 10))?;
            ledger.create_sale(NewSale::new(day(), 999, 1))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(store.snapshot().await.costs().is_empty());
    assert_eq!(storage.saved_bytes().unwrap(), before);
}

#[tokio::test]
async fn failed_save_is_not_committed() {
    let storage = FlakyStorage::default();
    let store = LedgerStore::builder().storage(storage.clone()).build().await;
    storage.failing.store(true, Ordering::SeqCst);

    let err = store
        .mutate(|ledger| ledger.set_capital(5_000, day()))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Persistence(_)));
    assert_eq!(store.snapshot().await.initial_capital(), 0);

    storage.failing.store(false, Ordering::SeqCst);
    store
        .mutate(|ledger| ledger.set_capital(5_000, day()))
        .await
        .unwrap();
    assert_eq!(store.snapshot().await.initial_capital(), 5_000);
}

#[tokio::test]
async fn slow_save_times_out() {
    #[derive(Clone)]
    struct SlowStorage;

    impl SnapshotStorage for SlowStorage {
        fn load(&self) -> ResultEngine<Option<Ledger>> {
            Ok(None)
        }

        fn save(&self, _ledger: &Ledger) -> ResultEngine<()> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }
    }

    let store = LedgerStore::builder()
        .storage(SlowStorage)
        .io_timeout(Duration::from_millis(20))
        .build()
        .await;
    let err = store
        .mutate(|ledger| ledger.set_capital(1, day()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
    assert!(store.snapshot().await.is_empty());
}

/// Storage whose first save lands only after a delay.
#[derive(Clone, Default)]
struct LateFirstSave {
    inner: MemoryStorage,
    saves: Arc<AtomicUsize>,
}

impl SnapshotStorage for LateFirstSave {
    fn load(&self) -> ResultEngine<Option<Ledger>> {
        self.inner.load()
    }

    fn save(&self, ledger: &Ledger) -> ResultEngine<()> {
        if self.saves.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(300));
        }
        self.inner.save(ledger)
    }
}

#[tokio::test]
async fn late_save_cannot_overwrite_a_newer_one() {
    let storage = LateFirstSave::default();
    let store = LedgerStore::builder()
        .storage(storage.clone())
        .io_timeout(Duration::from_millis(50))
        .build()
        .await;

    let err = store
        .mutate(|ledger| ledger.set_capital(111, day()))
        .await
        .unwrap_err();
    assert!(matches!(&err, EngineError::Persistence(msg) if msg.contains("50ms")));
    // The discarded change does not stay on disk either.
    assert_eq!(storage.load().unwrap().unwrap().initial_capital(), 0);

    store
        .mutate(|ledger| ledger.set_capital(222, day()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let persisted = storage.load().unwrap().unwrap();
    assert_eq!(persisted.initial_capital(), 222);
    assert_eq!(persisted, store.snapshot().await);
}

#[tokio::test]
async fn json_file_round_trip() {
    let path = test_file("round_trip");
    let store = LedgerStore::builder()
        .storage(JsonFileStorage::new(&path))
        .build()
        .await;
    let purchase_id = store
        .mutate(|ledger| {
            ledger.set_capital(10_000_000, day())?;
            ledger.create_purchase(NewPurchase::new(day(), "A52", 8_000_000))
        })
        .await
        .unwrap();

    let reopened = LedgerStore::builder()
        .storage(JsonFileStorage::new(&path))
        .build()
        .await;
    let ledger = reopened.snapshot().await;
    assert_eq!(ledger, store.snapshot().await);
    assert_eq!(calc::cash_balance(&ledger), 2_000_000);

    // New ids keep counting after a reload.
    let next = reopened
        .mutate(|ledger| ledger.create_purchase(NewPurchase::new(day(), "A53", 1)))
        .await
        .unwrap();
    assert!(next > purchase_id);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn missing_file_starts_empty() {
    let path = test_file("missing");
    let store = LedgerStore::builder()
        .storage(JsonFileStorage::new(&path))
        .build()
        .await;
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn corrupt_file_starts_empty_and_is_kept_aside() {
    let path = test_file("corrupt");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let store = LedgerStore::builder()
        .storage(JsonFileStorage::new(&path))
        .build()
        .await;

    assert!(store.snapshot().await.is_empty());
    let aside = path.with_extension("json.corrupt");
    assert_eq!(std::fs::read(&aside).unwrap(), b"{ this is not json");
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(&aside);
}

#[tokio::test]
async fn concurrent_mutations_are_serialized() {
    let store = LedgerStore::builder().build().await;
    let mut handles = Vec::new();
    for n in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .mutate(|ledger| ledger.create_cost(NewCost::new(day(), format!("cost {n}"), 10)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    let ledger = store.snapshot().await;
    assert_eq!(ledger.costs().len(), 20);
    assert_eq!(calc::total_costs(&ledger), 200);
}

#[tokio::test]
async fn full_export_restores_into_an_empty_store() {
    let source = LedgerStore::builder().build().await;
    source
        .mutate(|ledger| {
            ledger.set_capital(10_000_000, day())?;
            let id = ledger.create_purchase(NewPurchase::new(day(), "A52", 8_000_000))?;
            ledger.create_sale(NewSale::new(day(), id, 9_500_000).debt(1_000))?;
            ledger.create_purchase(NewPurchase::new(day(), "A53", 500))?;
            ledger.create_cost(NewCost::new(day(), "Rent", 300))?;
            Ok(())
        })
        .await
        .unwrap();
    let exported = source
        .snapshot()
        .await
        .export(BackupKind::Full, day().and_hms_opt(9, 0, 0).unwrap());
    let bytes = exported.to_json().unwrap();

    let target = LedgerStore::builder().build().await;
    let document = engine::BackupDocument::from_slice(&bytes).unwrap();
    target
        .mutate(|ledger| ledger.restore(document, day()))
        .await
        .unwrap();

    let roster = PartnerRoster::default();
    let before = engine::Dashboard::compute(&source.snapshot().await, &roster);
    let after = engine::Dashboard::compute(&target.snapshot().await, &roster);
    assert_eq!(before, after);
    assert_eq!(
        target.snapshot().await.transactions().len(),
        source.snapshot().await.transactions().len()
    );
}
