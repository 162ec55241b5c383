//! Versioning protocol tests
//!
//! Every scenario runs against both backends: SeaORM over SQLite and the
//! in-memory store.

mod common;

use std::collections::BTreeSet;

use futures::future::join_all;

use common::data;
use verso_common::VersoError;
use verso_persistence::ConfigPersistence;

async fn create_then_read_returns_version_one(store: &dyn ConfigPersistence) {
    let submitted = data(&[("key1", "value1"), ("key2", "value2")]);
    let created = store.config_create("billing", &submitted).await.unwrap();
    assert_eq!(created.version, 1);
    assert_eq!(created.service, "billing");

    let read = store.config_read("billing", None).await.unwrap();
    assert_eq!(read.id, created.id);
    assert_eq!(read.version, 1);
    assert_eq!(read.data, submitted);
}

async fn second_create_is_rejected(store: &dyn ConfigPersistence) {
    let original = data(&[("key1", "value1")]);
    store.config_create("billing", &original).await.unwrap();

    let err = store
        .config_create("billing", &data(&[("key1", "other")]))
        .await
        .unwrap_err();
    assert_eq!(err, VersoError::AlreadyExists("billing".to_string()));

    let read = store.config_read("billing", None).await.unwrap();
    assert_eq!(read.version, 1);
    assert_eq!(read.data, original);
}

async fn update_appends_next_version(store: &dyn ConfigPersistence) {
    store
        .config_create("billing", &data(&[("key1", "value1"), ("key2", "value2")]))
        .await
        .unwrap();

    let next = data(&[("key1", "value1"), ("key2", "value2"), ("key3", "value3")]);
    let updated = store.config_update("billing", &next).await.unwrap();
    assert_eq!(updated.version, 2);

    let read = store.config_read("billing", None).await.unwrap();
    assert_eq!(read.version, 2);
    assert_eq!(read.data, next);

    let err = store.config_update("billing", &next).await.unwrap_err();
    assert_eq!(err, VersoError::NoChange("billing".to_string()));
    assert_eq!(store.config_read("billing", None).await.unwrap().version, 2);
}

async fn unchanged_data_in_other_order_is_no_change(store: &dyn ConfigPersistence) {
    store
        .config_create("billing", &data(&[("a", "1"), ("b", "2"), ("c", "3")]))
        .await
        .unwrap();

    let err = store
        .config_update("billing", &data(&[("c", "3"), ("a", "1"), ("b", "2")]))
        .await
        .unwrap_err();
    assert_eq!(err, VersoError::NoChange("billing".to_string()));
    assert_eq!(store.config_versions("billing").await.unwrap(), vec![1]);
}

async fn history_is_immutable(store: &dyn ConfigPersistence) {
    let v1 = data(&[("mode", "one")]);
    let v2 = data(&[("mode", "two")]);
    let v3 = data(&[("mode", "three"), ("extra", "x")]);

    store.config_create("billing", &v1).await.unwrap();
    store.config_update("billing", &v2).await.unwrap();
    store.config_update("billing", &v3).await.unwrap();

    for (version, expected) in [(1, &v1), (2, &v2), (3, &v3)] {
        let read = store.config_read("billing", Some(version)).await.unwrap();
        assert_eq!(read.version, version);
        assert_eq!(&read.data, expected);
    }
    assert_eq!(store.config_versions("billing").await.unwrap(), vec![1, 2, 3]);
}

async fn missing_service_and_version(store: &dyn ConfigPersistence) {
    let missing = || VersoError::NotFound("ghost".to_string());
    assert_eq!(store.config_read("ghost", None).await.unwrap_err(), missing());
    assert_eq!(
        store.config_read("ghost", Some(1)).await.unwrap_err(),
        missing()
    );
    assert_eq!(
        store
            .config_update("ghost", &data(&[("a", "1")]))
            .await
            .unwrap_err(),
        missing()
    );
    assert_eq!(store.config_delete("ghost", None).await.unwrap_err(), missing());
    assert_eq!(store.config_versions("ghost").await.unwrap_err(), missing());

    store
        .config_create("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    assert_eq!(
        store.config_read("billing", Some(2)).await.unwrap_err(),
        VersoError::VersionNotFound("billing".to_string(), 2)
    );
    assert_eq!(
        store.config_delete("billing", Some(5)).await.unwrap_err(),
        VersoError::VersionNotFound("billing".to_string(), 5)
    );
}

async fn delete_version_removes_only_that_version(store: &dyn ConfigPersistence) {
    store
        .config_create("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    store
        .config_update("billing", &data(&[("a", "2")]))
        .await
        .unwrap();
    store
        .config_update("billing", &data(&[("a", "3")]))
        .await
        .unwrap();

    let deleted = store.config_delete("billing", Some(2)).await.unwrap();
    assert_eq!(deleted.version, Some(2));

    assert_eq!(
        store.config_read("billing", Some(2)).await.unwrap_err(),
        VersoError::VersionNotFound("billing".to_string(), 2)
    );
    assert_eq!(
        store.config_read("billing", Some(1)).await.unwrap().data,
        data(&[("a", "1")])
    );
    assert_eq!(store.config_read("billing", None).await.unwrap().version, 3);
    assert_eq!(store.config_versions("billing").await.unwrap(), vec![1, 3]);
}

async fn full_delete_then_recreate(store: &dyn ConfigPersistence) {
    let created = store
        .config_create("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    store
        .config_update("billing", &data(&[("a", "2")]))
        .await
        .unwrap();

    let deleted = store.config_delete("billing", None).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert_eq!(deleted.version, None);

    let missing = VersoError::NotFound("billing".to_string());
    assert_eq!(
        store.config_read("billing", None).await.unwrap_err(),
        missing
    );
    assert_eq!(
        store
            .config_update("billing", &data(&[("a", "3")]))
            .await
            .unwrap_err(),
        missing
    );
    assert_eq!(
        store.config_delete("billing", None).await.unwrap_err(),
        missing
    );

    let recreated = store
        .config_create("billing", &data(&[("b", "1")]))
        .await
        .unwrap();
    assert_eq!(recreated.version, 1);
    assert_eq!(store.config_versions("billing").await.unwrap(), vec![1]);
}

async fn deleting_last_version_strands_config(store: &dyn ConfigPersistence) {
    store
        .config_create("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    store.config_delete("billing", Some(1)).await.unwrap();

    assert_eq!(
        store.config_read("billing", None).await.unwrap_err(),
        VersoError::NotFound("billing".to_string())
    );
    assert_eq!(
        store.config_read("billing", Some(1)).await.unwrap_err(),
        VersoError::VersionNotFound("billing".to_string(), 1)
    );
    assert!(store.config_versions("billing").await.unwrap().is_empty());

    // Metadata row survives, so the service key stays taken
    assert_eq!(
        store
            .config_create("billing", &data(&[("a", "1")]))
            .await
            .unwrap_err(),
        VersoError::AlreadyExists("billing".to_string())
    );

    let revived = store
        .config_update("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    assert_eq!(revived.version, 1);

    store.config_delete("billing", Some(1)).await.unwrap();
    store.config_delete("billing", None).await.unwrap();
    assert_eq!(
        store.config_versions("billing").await.unwrap_err(),
        VersoError::NotFound("billing".to_string())
    );
}

async fn services_are_independent(store: &dyn ConfigPersistence) {
    let billing = store
        .config_create("billing", &data(&[("a", "1")]))
        .await
        .unwrap();
    let search = store
        .config_create("search", &data(&[("a", "1")]))
        .await
        .unwrap();
    assert_ne!(billing.id, search.id);

    store
        .config_update("billing", &data(&[("a", "2")]))
        .await
        .unwrap();
    store.config_delete("search", None).await.unwrap();

    assert_eq!(store.config_read("billing", None).await.unwrap().version, 2);
}

// The SQLite pool has a single connection, so on the SQL backend these
// updates run one after another and never collide on the version key.
// Collision retries are covered in the SQL backend's unit tests.
async fn concurrent_updates_take_distinct_versions(store: &dyn ConfigPersistence) {
    store
        .config_create("billing", &data(&[("n", "0")]))
        .await
        .unwrap();

    let payloads: Vec<_> = (1..=8)
        .map(|i| data(&[("n", i.to_string().as_str())]))
        .collect();
    let results = join_all(
        payloads
            .iter()
            .map(|payload| store.config_update("billing", payload)),
    )
    .await;

    let versions: BTreeSet<u32> = results
        .into_iter()
        .map(|r| r.expect("every distinct update must land").version)
        .collect();
    assert_eq!(versions, (2..=9).collect::<BTreeSet<u32>>());
    assert_eq!(
        store.config_versions("billing").await.unwrap(),
        (1..=9).collect::<Vec<u32>>()
    );
}

async fn concurrent_creates_admit_one(store: &dyn ConfigPersistence) {
    let payload = data(&[("a", "1")]);
    let results = join_all((0..5).map(|_| store.config_create("billing", &payload))).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| {
        *e == VersoError::AlreadyExists("billing".to_string())
    }));
    assert_eq!(store.config_versions("billing").await.unwrap(), vec![1]);
}

macro_rules! test_both_backends {
    ($($scenario:ident),* $(,)?) => {
        mod sql_backend {
            $(
                #[tokio::test]
                async fn $scenario() {
                    let store = crate::common::sqlite_store().await;
                    super::$scenario(&store).await;
                }
            )*
        }

        mod memory_backend {
            $(
                #[tokio::test]
                async fn $scenario() {
                    let store = crate::common::memory_store();
                    super::$scenario(&store).await;
                }
            )*
        }
    };
}

test_both_backends!(
    create_then_read_returns_version_one,
    second_create_is_rejected,
    update_appends_next_version,
    unchanged_data_in_other_order_is_no_change,
    history_is_immutable,
    missing_service_and_version,
    delete_version_removes_only_that_version,
    full_delete_then_recreate,
    deleting_last_version_strands_config,
    services_are_independent,
    concurrent_updates_take_distinct_versions,
    concurrent_creates_admit_one,
);
