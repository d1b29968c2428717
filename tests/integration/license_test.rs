//! Integration tests for the device license gate.

mod helpers;

use daghbas_core::error::ErrorKind;

use helpers::MASTER_KEY;

#[tokio::test]
async fn test_activate_then_validate() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    let activation = gate.activate("device-001", "Acme", MASTER_KEY).await.unwrap();
    assert_eq!(activation.device_id, "device-001");
    assert!(!activation.license_token.is_empty());

    let verdict = gate.validate("device-001", &activation.license_token).await;
    assert!(verdict.valid, "{}", verdict.message);
}

#[tokio::test]
async fn test_reactivation_returns_existing_token() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    let first = gate.activate("device-002", "Acme", MASTER_KEY).await.unwrap();
    let second = gate.activate("device-002", "Other", MASTER_KEY).await.unwrap();
    assert_eq!(first.license_token, second.license_token);
}

#[tokio::test]
async fn test_wrong_master_key_is_forbidden() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    let err = gate.activate("device-003", "Acme", "guess").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = gate.activate("", "Acme", "guess").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = gate.activate("  ", "Acme", MASTER_KEY).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_tampered_token_is_invalid() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    let activation = gate.activate("device-004", "Acme", MASTER_KEY).await.unwrap();
    let mut tampered = activation.license_token.clone();
    tampered.push('x');

    let verdict = gate.validate("device-004", &tampered).await;
    assert!(!verdict.valid);
    assert_eq!(verdict.message, "License token mismatch");
}

#[tokio::test]
async fn test_token_of_another_device_is_invalid() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    gate.activate("device-a", "Acme", MASTER_KEY).await.unwrap();
    let other = gate.activate("device-b", "Acme", MASTER_KEY).await.unwrap();

    let verdict = gate.validate("device-a", &other.license_token).await;
    assert!(!verdict.valid);

    let unknown = gate.validate("device-z", &other.license_token).await;
    assert!(!unknown.valid);
    assert_eq!(unknown.message, "Device is not activated");
}

#[tokio::test]
async fn test_deactivated_device_fails_validation() {
    let app = helpers::TestApp::new().await;
    let gate = &app.services.licenses;

    let activation = gate.activate("device-005", "Acme", MASTER_KEY).await.unwrap();
    gate.deactivate("device-005", MASTER_KEY).await.unwrap();

    let verdict = gate.validate("device-005", &activation.license_token).await;
    assert!(!verdict.valid);

    let renewed = gate.activate("device-005", "Acme", MASTER_KEY).await.unwrap();
    assert!(gate.validate("device-005", &renewed.license_token).await.valid);

    let err = gate.deactivate("device-404", MASTER_KEY).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unrepresentable_ttl_fails_activation_cleanly() {
    let mut config = helpers::test_config();
    config.license.token_ttl_days = 1_000_000_000_000;
    assert!(config.validate().is_err());

    let app = helpers::TestApp::with_config(config).await;
    let err = app
        .services
        .licenses
        .activate("device-006", "Acme", MASTER_KEY)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::License);

    let verdict = app.services.licenses.validate("device-006", "anything").await;
    assert!(!verdict.valid);
    assert_eq!(verdict.message, "Device is not activated");
}
