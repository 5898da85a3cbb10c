#![allow(clippy::unwrap_used)]
// Engine behaviour against both shipped stores.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use postes_core::{
    CoreError, Device, DeviceStatus, Engine, InventoryDocument, InventoryStore, Marker,
    MemoryStore, SqliteStore, Substation, SubstationFilter, SubstationId,
};

fn document() -> InventoryDocument {
    serde_json::from_value(json!({
        "postes": [
            {
                "id_poste": 1,
                "code_poste": "P-001",
                "nom_poste": "Saint-Marcel",
                "localisation": "Marseille",
                "bo_affectee": "BO1",
                "latitude": 43.1,
                "longitude": 5.3
            },
            {
                "id_poste": 2,
                "code_poste": "P-002",
                "bo_affectee": "BO2",
                "latitude": null,
                "longitude": null
            },
            { "id_poste": 3, "code_poste": "P-003", "bo_affectee": "BO1" },
            {
                "id_poste": 4,
                "code_poste": "P-004",
                "latitude": 43.3,
                "longitude": null
            }
        ],
        "concentrateurs": [
            { "numero_serie": "A", "operateur": "EDF", "etat": "pose", "poste_id": 1,
              "date_pose": "2024-03-01T08:30:00Z", "modele": "G3" },
            { "numero_serie": "B", "operateur": "EDF", "etat": "a_tester", "poste_id": 1 },
            { "numero_serie": "C", "operateur": "Enedis", "etat": "rebut", "poste_id": 1 },
            { "numero_serie": "D", "operateur": "EDF", "etat": "pose", "poste_id": 2 },
            { "numero_serie": "E", "operateur": "EDF", "etat": "en_stock" },
            { "numero_serie": "F", "operateur": "EDF", "etat": "pose", "poste_id": 42 }
        ]
    }))
    .unwrap()
}

fn memory_engine() -> (Engine, Arc<dyn InventoryStore>) {
    let store: Arc<dyn InventoryStore> = Arc::new(MemoryStore::from_document(document()).unwrap());
    (Engine::new(Arc::clone(&store)), store)
}

async fn sqlite_engine() -> (Engine, Arc<dyn InventoryStore>) {
    let sqlite = SqliteStore::open_in_memory().unwrap();
    sqlite.import(document()).await.unwrap();
    let store: Arc<dyn InventoryStore> = Arc::new(sqlite);
    (Engine::new(Arc::clone(&store)), store)
}

fn id(raw: i64) -> SubstationId {
    SubstationId::new(raw).unwrap()
}

// ── Shared scenarios ────────────────────────────────────────────────

async fn listing_counts(engine: &Engine) {
    let views = engine.list(&SubstationFilter::all()).await.unwrap();
    let ids: Vec<i64> = views.iter().map(|v| v.id_poste.get()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let one = &views[0];
    assert_eq!(one.nb_concentrateurs, 3);
    assert_eq!(one.nb_concentrateurs_pose, 1);
    assert_eq!(one.nb_concentrateurs_a_tester, 1);
    assert_eq!(one.counts().other(), 1);
    assert_eq!(one.latitude, Some(43.1));
    assert_eq!(one.marker(), Marker::ATester);

    let two = &views[1];
    assert_eq!(two.nb_concentrateurs, 1);
    assert_eq!(two.nb_concentrateurs_pose, 1);
    assert_eq!(two.nb_concentrateurs_a_tester, 0);
    assert_eq!(two.latitude, None);
    assert_eq!(two.marker(), Marker::EnService);

    let three = &views[2];
    assert_eq!(three.nb_concentrateurs, 0);
    assert_eq!(three.marker(), Marker::SansConcentrateur);

    let half_located = &views[3];
    assert_eq!(half_located.latitude, None);
    assert_eq!(half_located.longitude, None);

    for view in &views {
        assert_eq!(
            view.nb_concentrateurs,
            view.nb_concentrateurs_pose + view.nb_concentrateurs_a_tester + view.counts().other()
        );
    }
}

async fn grouped_counts_match_naive_counts(engine: &Engine, store: &dyn InventoryStore) {
    for view in engine.list(&SubstationFilter::all()).await.unwrap() {
        let sid = view.id_poste;
        assert_eq!(store.count_devices(sid, None).await.unwrap(), view.nb_concentrateurs);
        assert_eq!(
            store.count_devices(sid, Some(&DeviceStatus::Pose)).await.unwrap(),
            view.nb_concentrateurs_pose
        );
        assert_eq!(
            store
                .count_devices(sid, Some(&DeviceStatus::ATester))
                .await
                .unwrap(),
            view.nb_concentrateurs_a_tester
        );
    }
}

async fn filters(engine: &Engine) {
    let with_coords = engine
        .list(&SubstationFilter::new(None, true).unwrap())
        .await
        .unwrap();
    let geo_ids: Vec<SubstationId> = with_coords.iter().map(|v| v.id_poste).collect();
    assert_eq!(geo_ids, vec![id(1)]);

    let bo2 = engine
        .list(&SubstationFilter::new(Some("BO2"), false).unwrap())
        .await
        .unwrap();
    assert_eq!(bo2.len(), 1);
    assert_eq!(bo2[0].id_poste, id(2));

    let bo1_geo = engine
        .list(&SubstationFilter::new(Some("BO1"), true).unwrap())
        .await
        .unwrap();
    assert_eq!(bo1_geo.len(), 1);

    let nobody = engine
        .list(&SubstationFilter::new(Some("BO9"), false).unwrap())
        .await
        .unwrap();
    assert!(nobody.is_empty());
}

async fn detail_and_not_found(engine: &Engine) {
    let detail = engine.substation(id(1)).await.unwrap();
    let listed = engine.list(&SubstationFilter::all()).await.unwrap();
    assert_eq!(detail, listed[0]);

    let err = engine.substation(id(99)).await.unwrap_err();
    assert!(matches!(err, CoreError::SubstationNotFound { .. }));
    let err = engine.substation_devices(id(99)).await.unwrap_err();
    assert!(err.is_not_found());
}

async fn device_listing(engine: &Engine) {
    let listing = engine.substation_devices(id(1)).await.unwrap();
    assert_eq!(listing.poste.code_poste, "P-001");
    assert_eq!(listing.poste.nom_poste.as_deref(), Some("Saint-Marcel"));

    let serials: Vec<&str> = listing
        .concentrateurs
        .iter()
        .map(|d| d.numero_serie.as_str())
        .collect();
    assert_eq!(serials, vec!["A", "B", "C"]);

    let a = &listing.concentrateurs[0];
    assert_eq!(a.etat, DeviceStatus::Pose);
    assert_eq!(a.modele.as_deref(), Some("G3"));
    assert_eq!(
        a.date_pose,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
    );
    assert_eq!(listing.concentrateurs[1].date_pose, None);
    assert_eq!(listing.concentrateurs[2].etat.as_str(), "rebut");

    let empty = engine.substation_devices(id(3)).await.unwrap();
    assert!(empty.concentrateurs.is_empty());
}

async fn owners_and_summary(engine: &Engine) {
    assert_eq!(engine.owners().await.unwrap(), vec!["BO1", "BO2"]);

    let summary = engine.summary(&SubstationFilter::all()).await.unwrap();
    assert_eq!(summary.nb_postes, 4);
    assert_eq!(summary.nb_postes_geolocalises, 1);
    assert_eq!(summary.nb_concentrateurs, 4);
    assert_eq!(summary.nb_concentrateurs_pose, 2);
    assert_eq!(summary.nb_concentrateurs_a_tester, 1);
    assert_eq!(summary.nb_concentrateurs_autres, 1);
    assert_eq!(summary.par_etat.values().sum::<u64>(), summary.nb_concentrateurs);

    let bo1 = engine
        .summary(&SubstationFilter::new(Some("BO1"), false).unwrap())
        .await
        .unwrap();
    assert_eq!(bo1.nb_postes, 2);
    assert_eq!(bo1.nb_concentrateurs, 3);
}

async fn repeated_calls_are_identical(engine: &Engine) {
    let filter = SubstationFilter::new(Some("BO1"), false).unwrap();
    let first = engine.list(&filter).await.unwrap();
    let second = engine.list(&filter).await.unwrap();
    assert_eq!(first, second);
}

async fn run_all(engine: &Engine, store: &dyn InventoryStore) {
    listing_counts(engine).await;
    grouped_counts_match_naive_counts(engine, store).await;
    filters(engine).await;
    detail_and_not_found(engine).await;
    device_listing(engine).await;
    owners_and_summary(engine).await;
    repeated_calls_are_identical(engine).await;
}

// ── Memory store ────────────────────────────────────────────────────

#[tokio::test]
async fn memory_store_engine() {
    let (engine, store) = memory_engine();
    assert_eq!(engine.backend_tag(), "memory");
    run_all(&engine, store.as_ref()).await;
}

#[tokio::test]
async fn memory_store_empty_inventory() {
    let engine = Engine::new(Arc::new(MemoryStore::new()));
    assert!(engine.list(&SubstationFilter::all()).await.unwrap().is_empty());
    assert!(engine.owners().await.unwrap().is_empty());
    assert_eq!(
        engine.summary(&SubstationFilter::all()).await.unwrap(),
        postes_core::FleetSummary::default()
    );
}

// ── SQLite store ────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_store_engine() {
    let (engine, store) = sqlite_engine().await;
    assert_eq!(engine.backend_tag(), "sqlite");
    run_all(&engine, store.as_ref()).await;
}

#[tokio::test]
async fn sqlite_store_lists_inventory_larger_than_bind_limit() {
    let postes: Vec<Substation> = (1..=33_000)
        .map(|raw| Substation::new(id(raw), format!("P-{raw:05}")))
        .collect();
    let mut device = Device::new("A", "EDF", DeviceStatus::Pose);
    device.poste_id = Some(id(33_000));

    let sqlite = SqliteStore::open_in_memory().unwrap();
    sqlite
        .import(InventoryDocument {
            postes,
            concentrateurs: vec![device],
        })
        .await
        .unwrap();
    let engine = Engine::new(Arc::new(sqlite));

    let views = engine.list(&SubstationFilter::all()).await.unwrap();
    assert_eq!(views.len(), 33_000);
    assert_eq!(views[32_999].nb_concentrateurs_pose, 1);
    assert_eq!(views.iter().map(|v| v.nb_concentrateurs).sum::<u64>(), 1);

    let summary = engine.summary(&SubstationFilter::all()).await.unwrap();
    assert_eq!(summary.nb_postes, 33_000);
    assert_eq!(summary.nb_concentrateurs, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sqlite_store_concurrent_reads_agree() {
    let (engine, _) = sqlite_engine().await;
    let filter = SubstationFilter::all();
    let (a, b) = tokio::join!(engine.list(&filter), engine.list(&filter));
    assert_eq!(a.unwrap(), b.unwrap());
}
