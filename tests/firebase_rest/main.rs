//! End-to-end tests of the HTTP store against an emulated Firebase REST API.

mod support;

use serde_json::json;

use firebase_orm::{
    Connection, ConnectionConfig, DocumentStore, HttpStore, OrmError, WriteMode, ID_POOL_PATH,
};
use support::{init_tracing, start_server, Animal, Creature};

#[tokio::test]
async fn animal_lifecycle() {
    init_tracing();
    let (fb, base) = start_server().await;
    let conn = Connection::open(&ConnectionConfig::new(&base)).unwrap();
    let animals = conn.dao::<Animal>();

    let mut elephant = Animal::named("Elephant");
    animals.save(&mut elephant).await.unwrap();
    assert_eq!(elephant.id, 1);
    assert_eq!(
        animals.find_all().await.unwrap(),
        vec![Animal {
            id: 1,
            name: "Elephant".into()
        }]
    );
    assert_eq!(animals.count().await.unwrap(), 1);

    let mut giraffe = Animal::named("Giraffe");
    animals.save(&mut giraffe).await.unwrap();
    assert_eq!(giraffe.id, 2);
    assert_eq!(animals.find_by_id(2).await.unwrap(), Some(giraffe.clone()));
    assert_eq!(animals.find_by_id(99).await.unwrap(), None);

    let probe = Animal {
        id: 1,
        name: String::new(),
    };
    assert_eq!(animals.delete(&probe).await.unwrap(), probe);
    assert_eq!(animals.find_all().await.unwrap(), vec![giraffe]);
    assert_eq!(animals.count().await.unwrap(), 1);

    assert_eq!(fb.document(ID_POOL_PATH), Some(json!({ "uuid": 2 })));
    assert_eq!(
        fb.document("animal.json"),
        Some(json!([{ "id": 2, "name": "Giraffe" }]))
    );
}

#[tokio::test]
async fn delete_all_then_find_all_is_empty() {
    let (fb, base) = start_server().await;
    let conn = Connection::open(&ConnectionConfig::new(&base)).unwrap();
    let animals = conn.dao::<Animal>();

    let mut elephant = Animal::named("Elephant");
    animals.save(&mut elephant).await.unwrap();
    animals.delete_all().await.unwrap();

    assert!(animals.find_all().await.unwrap().is_empty());
    assert!(animals.is_empty().await.unwrap());
    assert!(fb.document("animal.json").is_none());
    assert!(fb.document(ID_POOL_PATH).is_some());
}

#[tokio::test]
async fn override_path_addresses_its_own_document() {
    let (fb, base) = start_server().await;
    let conn = Connection::open(&ConnectionConfig::new(&base)).unwrap();
    let creatures = conn.dao::<Creature>();
    assert_eq!(creatures.collection_path(), "creatures");

    let mut kraken = Creature {
        name: "Kraken".into(),
        legs: Some(8),
        ..Default::default()
    };
    creatures.save(&mut kraken).await.unwrap();

    assert_eq!(
        fb.document("creatures.json"),
        Some(json!([{ "id": 1, "name": "Kraken", "legs": 8 }]))
    );
    assert!(fb.document("creature.json").is_none());
}

#[tokio::test]
async fn reads_push_keyed_documents() {
    let (fb, base) = start_server().await;
    fb.seed(
        "animal.json",
        json!({
            "-NqA": { "id": 4, "name": "Tapir" },
            "-NqB": { "id": 9, "name": "Quokka" }
        }),
    );
    let conn = Connection::open(&ConnectionConfig::new(&base)).unwrap();
    let animals = conn.dao::<Animal>();

    assert_eq!(animals.first().await.unwrap().map(|a| a.name), Some("Tapir".into()));
    assert_eq!(animals.last().await.unwrap().map(|a| a.name), Some("Quokka".into()));
    assert!(animals.contains(&Animal { id: 9, name: String::new() }).await.unwrap());
}

#[tokio::test]
async fn server_errors_surface_as_status() {
    let (fb, base) = start_server().await;
    let conn = Connection::open(&ConnectionConfig::new(&base)).unwrap();
    fb.fail();

    let err = conn.dao::<Animal>().find_all().await.unwrap_err();
    match err {
        OrmError::Status { method, path, status } => {
            assert_eq!(method, "GET");
            assert_eq!(path, "animal.json");
            assert_eq!(status, 503);
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let mut elephant = Animal::named("Elephant");
    assert!(conn.dao::<Animal>().save(&mut elephant).await.is_err());
    assert_eq!(elephant.id, 0);
}

#[tokio::test]
async fn best_effort_saves_keep_identifiers_increasing() {
    let (fb, base) = start_server().await;
    let config = ConnectionConfig::new(&base).with_write_mode(WriteMode::BestEffort);
    let conn = Connection::open(&config).unwrap();
    let animals = conn.dao::<Animal>();

    let mut ant = Animal::named("Ant");
    let mut bee = Animal::named("Bee");
    animals.save(&mut ant).await.unwrap();
    animals.save(&mut bee).await.unwrap();

    assert_eq!((ant.id, bee.id), (1, 2));
    assert_eq!(animals.find_all().await.unwrap(), vec![ant, bee]);
    assert_eq!(fb.document(ID_POOL_PATH), Some(json!({ "uuid": 2 })));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    // Bind and drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ConnectionConfig::new(format!("http://{addr}")).with_timeout_secs(2);
    let conn = Connection::open(&config).unwrap();

    let err = conn.dao::<Animal>().count().await.unwrap_err();
    assert!(matches!(err, OrmError::Http(_)));
}

#[tokio::test]
async fn http_store_round_trips_documents() {
    let (_fb, base) = start_server().await;
    let store = HttpStore::new(format!("{base}/"));

    assert_eq!(store.get("zoo/keepers.json").await.unwrap(), None);
    store
        .put("zoo/keepers.json", &json!({ "ada": { "id": 1 } }))
        .await
        .unwrap();
    store
        .patch("zoo/keepers.json", &json!({ "bob": { "id": 2 } }))
        .await
        .unwrap();
    assert_eq!(
        store.get("zoo/keepers.json").await.unwrap(),
        Some(json!({ "ada": { "id": 1 }, "bob": { "id": 2 } }))
    );

    store.delete("zoo/keepers.json").await.unwrap();
    assert_eq!(store.get("zoo/keepers.json").await.unwrap(), None);
}
