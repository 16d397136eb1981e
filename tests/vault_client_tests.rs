//! Secret store client tests against an in-process fake Vault

mod common;

use std::sync::atomic::Ordering;

use paseto_gate::AuthError;
use paseto_gate::vault::{SecretStore, VaultClient};

use common::{FakeVault, VAULT_TOKEN, public_key_pem, signing_key};

const SECRET_PATH: &str = "lms/paseto/keys/public";

fn client(address: &str, token: &str) -> VaultClient {
    VaultClient::new(address, token.to_string(), SECRET_PATH).unwrap()
}

#[tokio::test]
async fn fetch_returns_key_material_and_metadata() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    let client = client(&vault.address, VAULT_TOKEN);

    let material = client.fetch_public_key().await.unwrap();

    assert!(material.pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    assert_eq!(material.key_id, "key-2024-07");
    assert_eq!(material.algorithm, "EdDSA");
    assert_eq!(material.key_type, "public");
    assert_eq!(vault.fetches(), 1);
}

#[tokio::test]
async fn wrong_store_token_surfaces_status_and_body() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    let client = client(&vault.address, "s.wrong");

    let err = client.fetch_public_key().await.unwrap_err();
    match err {
        AuthError::StoreBadStatus { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("permission denied"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn store_error_status_is_surfaced() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    vault.state.serving.store(false, Ordering::SeqCst);
    let client = client(&vault.address, VAULT_TOKEN);

    let err = client.fetch_public_key().await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::StoreBadStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn missing_key_field_is_malformed_response() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    vault.state.omit_key_field.store(true, Ordering::SeqCst);
    let client = client(&vault.address, VAULT_TOKEN);

    let err = client.fetch_public_key().await.unwrap_err();
    assert!(matches!(err, AuthError::StoreMalformedResponse(_)));
}

#[tokio::test]
async fn health_check_succeeds_on_200() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    let client = client(&vault.address, VAULT_TOKEN);

    client.health_check().await.unwrap();
}

#[tokio::test]
async fn health_check_fails_on_non_200() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    vault.state.healthy.store(false, Ordering::SeqCst);
    let client = client(&vault.address, VAULT_TOKEN);

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::StoreBadStatus { status: 503, .. }
    ));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    // Nothing listens on this port
    let client = client("http://127.0.0.1:9", VAULT_TOKEN);

    let err = client.fetch_public_key().await.unwrap_err();
    assert!(matches!(err, AuthError::StoreUnreachable(_)));

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, AuthError::StoreUnreachable(_)));
}

#[tokio::test]
async fn trailing_slash_in_address_is_tolerated() {
    let vault = FakeVault::spawn(public_key_pem(&signing_key(1))).await;
    let client = client(&format!("{}/", vault.address), VAULT_TOKEN);

    assert!(client.fetch_public_key().await.is_ok());
}
