use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, Quantity, RemoveOutcome};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "alice").await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// File-backed variant with a single pooled connection, so concurrent tasks
/// funnel through one serialized connection like independent workers on a
/// shared store.
async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!(
        "pantry_{}_{}.db",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let mut options = ConnectOptions::new(url);
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "alice").await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, path)
}

async fn seed_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec![username.into(), "password".into()],
    ))
    .await
    .unwrap();
}

fn q(value: &str) -> Quantity {
    value.parse().unwrap()
}

fn unit(engine: &Engine, name: &str) -> i64 {
    engine.catalog().unit_by_name(name).unwrap().id
}

#[tokio::test]
async fn adds_merge_into_the_standard_unit() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");
    let kg = unit(&engine, "kg");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();

    let entry = engine
        .add_to_pantry("alice", flour.id, q("5"), g)
        .await
        .unwrap();
    assert_eq!(entry.quantity, q("5"));
    assert_eq!(entry.unit_id, g);

    let entry = engine
        .add_to_pantry("alice", flour.id, q("3"), g)
        .await
        .unwrap();
    assert_eq!(entry.quantity, q("8"));

    // cross-unit add converts before merging
    let entry = engine
        .add_to_pantry("alice", flour.id, q("1"), kg)
        .await
        .unwrap();
    assert_eq!(entry.quantity, q("1008"));

    let stored = engine.pantry_entry("alice", flour.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity, q("1008"));
    assert_eq!(stored.unit_id, g);
}

#[tokio::test]
async fn removing_to_zero_deletes_the_row() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    engine
        .add_to_pantry("alice", flour.id, q("5"), g)
        .await
        .unwrap();

    let outcome = engine
        .remove_from_pantry("alice", flour.id, q("5"), g)
        .await
        .unwrap();
    assert_eq!(outcome, RemoveOutcome::Deleted);

    // Absent, not Present(0)
    assert!(engine.pantry_entry("alice", flour.id).await.unwrap().is_none());
}

#[tokio::test]
async fn overshooting_removal_deletes_and_reports_it() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    engine
        .add_to_pantry("alice", flour.id, q("5"), g)
        .await
        .unwrap();

    let outcome = engine
        .remove_from_pantry("alice", flour.id, q("8"), g)
        .await
        .unwrap();
    assert_eq!(outcome, RemoveOutcome::Deleted);
    assert!(engine.pantry_entry("alice", flour.id).await.unwrap().is_none());
}

#[tokio::test]
async fn partial_removal_keeps_the_remainder() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");
    let kg = unit(&engine, "kg");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    engine
        .add_to_pantry("alice", flour.id, q("2"), kg)
        .await
        .unwrap();

    let outcome = engine
        .remove_from_pantry("alice", flour.id, q("500"), g)
        .await
        .unwrap();
    match outcome {
        RemoveOutcome::Remaining(entry) => {
            assert_eq!(entry.quantity, q("1500"));
            assert_eq!(entry.unit_id, g);
        }
        RemoveOutcome::Deleted => panic!("entry should remain"),
    }
}

#[tokio::test]
async fn removing_from_an_absent_key_fails() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();

    let err = engine
        .remove_from_pantry("alice", flour.id, q("1"), g)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PantryNotFound { ingredient_id: flour.id });
}

#[tokio::test]
async fn non_positive_deltas_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();

    for delta in ["0", "-2"] {
        let err = engine
            .add_to_pantry("alice", flour.id, q(delta), g)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity(_)));

        let err = engine
            .remove_from_pantry("alice", flour.id, q(delta), g)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity(_)));
    }
}

#[tokio::test]
async fn clear_drops_the_entry_regardless_of_quantity() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    engine
        .add_to_pantry("alice", flour.id, q("42"), g)
        .await
        .unwrap();

    engine.clear_pantry_entry("alice", flour.id).await.unwrap();
    assert!(engine.pantry_entry("alice", flour.id).await.unwrap().is_none());

    // clearing an absent key is a no-op
    engine.clear_pantry_entry("alice", flour.id).await.unwrap();
}

#[tokio::test]
async fn first_add_fixes_the_unit_without_standard_unit() {
    let (engine, _db) = engine_with_db().await;
    let cup = unit(&engine, "cup");
    let tbsp = unit(&engine, "tbsp");

    let oats = engine.new_ingredient("oats", None, None, None).await.unwrap();

    let entry = engine
        .add_to_pantry("alice", oats.id, q("2"), cup)
        .await
        .unwrap();
    assert_eq!(entry.unit_id, cup);

    // 8 tbsp = 0.5 cup
    let entry = engine
        .add_to_pantry("alice", oats.id, q("8"), tbsp)
        .await
        .unwrap();
    assert_eq!(entry.unit_id, cup);
    assert_eq!(entry.quantity, q("2.5"));
}

#[tokio::test]
async fn density_bridges_adds_across_dimensions() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");
    let ml = unit(&engine, "ml");

    let honey = engine
        .new_ingredient("honey", None, Some(g), Some(q("1.4")))
        .await
        .unwrap();

    let entry = engine
        .add_to_pantry("alice", honey.id, q("100"), ml)
        .await
        .unwrap();
    assert_eq!(entry.quantity, q("140"));
    assert_eq!(entry.unit_id, g);

    // without a density the same add is rejected, with the ingredient named
    let syrup = engine
        .new_ingredient("syrup", None, Some(g), None)
        .await
        .unwrap();
    let err = engine
        .add_to_pantry("alice", syrup.id, q("100"), ml)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingDensity { ingredient_id: syrup.id });
}

#[tokio::test]
async fn unknown_ids_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let g = unit(&engine, "g");

    let err = engine
        .add_to_pantry("alice", 999, q("1"), g)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::IngredientNotFound { ingredient_id: 999 });

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    let err = engine
        .add_to_pantry("alice", flour.id, q("1"), 999)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnitNotFound { unit_id: 999 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_all_reflected() {
    let (engine, db, path) = engine_with_file_db().await;
    let g = unit(&engine, "g");

    let flour = engine
        .new_ingredient("flour", None, Some(g), None)
        .await
        .unwrap();
    let ingredient_id = flour.id;

    let engine = Arc::new(engine);
    let mut tasks = tokio::task::JoinSet::new();
    const WORKERS: usize = 16;

    for _ in 0..WORKERS {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            // the engine does not retry on conflict; the caller does
            loop {
                match engine.add_to_pantry("alice", ingredient_id, q("1"), g).await {
                    Ok(_) => break,
                    Err(EngineError::Conflict(_)) => continue,
                    Err(err) => panic!("unexpected error: {err}"),
                }
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    let entry = engine
        .pantry_entry("alice", ingredient_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.quantity, Quantity::from_whole(WORKERS as i64));

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}
