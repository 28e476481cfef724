//! License activation and validation against a mocked license server.

use deskplant_core::license::LemonSqueezyClient;
use deskplant_core::storage::{keys, load_json};
use deskplant_core::{
    AppCoordinator, Config, CoreError, KeyValueStore, LicenseError, LicenseRecord, MemoryStore,
    PlantType,
};
use mockito::Matcher;
use std::sync::Arc;

fn coordinator(server_url: &str, store: Arc<MemoryStore>) -> (AppCoordinator, LemonSqueezyClient) {
    let mut config = Config::default();
    config.license.api_base_url = format!("{server_url}/v1/licenses");
    config.license.instance_name = Some("deskplant-ci".into());
    let client = LemonSqueezyClient::new(&config.license.api_base_url);
    (AppCoordinator::new(config, Box::new(store)), client)
}

fn activation_body(store_id: u64, email: &str) -> String {
    format!(
        r#"{{
            "activated": true, "error": null,
            "license_key": {{"id": 1, "status": "active", "key": "KEY-1", "activation_limit": 3, "activation_usage": 1}},
            "instance": {{"id": "inst-42", "name": "deskplant-ci"}},
            "meta": {{"store_id": {store_id}, "product_id": 720905, "customer_email": "{email}"}}
        }}"#
    )
}

fn validation_body(valid: bool, status: &str) -> String {
    format!(
        r#"{{
            "valid": {valid}, "error": null,
            "license_key": {{"id": 1, "status": "{status}", "key": "KEY-1"}},
            "instance": {{"id": "inst-42", "name": "deskplant-ci"}},
            "meta": {{"store_id": 53624, "product_id": 720905, "customer_email": "ada@example.com"}}
        }}"#
    )
}

async fn activate(server: &mut mockito::ServerGuard, c: &mut AppCoordinator, client: &LemonSqueezyClient) {
    server
        .mock("POST", "/v1/licenses/activate")
        .match_body(Matcher::UrlEncoded("instance_name".into(), "deskplant-ci".into()))
        .with_status(200)
        .with_body(activation_body(53624, "ada@example.com"))
        .create_async()
        .await;
    c.activate_license(client, "KEY-1", "Ada@Example.com").await.unwrap();
}

#[tokio::test]
async fn wrong_store_is_rejected_and_nothing_is_stored() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/licenses/activate")
        .with_status(200)
        .with_body(activation_body(1, "ada@example.com"))
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let (mut c, client) = coordinator(&server.url(), store.clone());
    let err = c
        .activate_license(&client, "KEY-1", "ada@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::License(LicenseError::InvalidProduct)));
    assert!(!c.license().is_licensed());
    assert!(store.load(keys::LICENSE).unwrap().is_none());
    assert_eq!(c.license().available_plant_types(), vec![PlantType::Cactus]);
}

#[tokio::test]
async fn activation_unlocks_everything() {
    let mut server = mockito::Server::new_async().await;
    let store = Arc::new(MemoryStore::new());
    let (mut c, client) = coordinator(&server.url(), store.clone());
    activate(&mut server, &mut c, &client).await;

    assert!(c.license().is_licensed());
    assert!(c.license().can_customize_timer_durations());
    c.set_plant_type(PlantType::Monstera).unwrap();

    let record: LicenseRecord = load_json(store.as_ref(), keys::LICENSE).unwrap();
    assert_eq!(record.instance_id, "inst-42");
    assert_eq!(record.device_name, "deskplant-ci");
}

#[tokio::test]
async fn revoked_license_is_cleared_on_validation() {
    let mut server = mockito::Server::new_async().await;
    let store = Arc::new(MemoryStore::new());
    let (mut c, client) = coordinator(&server.url(), store.clone());
    activate(&mut server, &mut c, &client).await;

    server
        .mock("POST", "/v1/licenses/validate")
        .match_body(Matcher::UrlEncoded("license_key".into(), "KEY-1".into()))
        .with_status(200)
        .with_body(validation_body(true, "disabled"))
        .create_async()
        .await;

    let err = c.validate_license(&client).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::License(LicenseError::LicenseNotActive(ref status)) if status == "disabled"
    ));
    assert!(!c.license().is_licensed());
    assert!(c.license().record().is_none());
    assert!(store.load(keys::LICENSE).unwrap().is_none());
}

#[tokio::test]
async fn server_outage_keeps_the_record_for_a_retry() {
    let mut server = mockito::Server::new_async().await;
    let store = Arc::new(MemoryStore::new());
    let (mut c, client) = coordinator(&server.url(), store.clone());
    activate(&mut server, &mut c, &client).await;

    let outage = server
        .mock("POST", "/v1/licenses/validate")
        .with_status(503)
        .create_async()
        .await;
    let err = c.validate_license(&client).await.unwrap_err();
    assert!(matches!(err, CoreError::License(LicenseError::ServerError(503))));
    assert!(!c.license().is_licensed());
    assert!(c.license().record().is_some());
    assert!(matches!(
        c.set_plant_type(PlantType::Sakura),
        Err(CoreError::FeatureLocked(_))
    ));
    outage.remove_async().await;

    server
        .mock("POST", "/v1/licenses/validate")
        .with_status(200)
        .with_body(validation_body(true, "active"))
        .create_async()
        .await;
    c.validate_license(&client).await.unwrap();
    assert!(c.license().is_licensed());
}

#[tokio::test]
async fn validation_without_a_record_fails() {
    let server = mockito::Server::new_async().await;
    let (mut c, client) = coordinator(&server.url(), Arc::new(MemoryStore::new()));
    let err = c.validate_license(&client).await.unwrap_err();
    assert!(matches!(err, CoreError::License(LicenseError::NoLicenseStored)));
}
