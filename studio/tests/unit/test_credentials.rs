//! Credential persistence tests

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use sheetify::authn::credential::Credential;
use sheetify::authn::store::{CredentialStore, CREDENTIAL_KEY};
use sheetify::filesys::dir::Dir;
use sheetify::storage::kv::{FileStore, KeyValueStore};

fn file_store(dir: &tempfile::TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::new(Dir::new(dir.path().join("store"))))
}

fn jwt(exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({"sub": "1", "exp": exp}),
        &EncodingKey::from_secret(b"secret"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_credential_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    let store = CredentialStore::load(file_store(&dir)).await;
    assert!(store.get().is_none());
    store.set(Some(Credential::new("tok-1"))).await.unwrap();
    assert_eq!(store.get(), Some(Credential::new("tok-1")));

    let reloaded = CredentialStore::load(file_store(&dir)).await;
    assert_eq!(reloaded.get(), Some(Credential::new("tok-1")));
}

#[tokio::test]
async fn test_sign_out_removes_entry() {
    let dir = tempfile::tempdir().unwrap();
    let backend = file_store(&dir);

    let store = CredentialStore::load(backend.clone()).await;
    store.set(Some(Credential::new("tok-1"))).await.unwrap();
    store.set(None).await.unwrap();

    assert!(backend.get(CREDENTIAL_KEY).await.unwrap().is_none());
    assert!(!dir.path().join("store").join(CREDENTIAL_KEY).exists());

    let reloaded = CredentialStore::load(file_store(&dir)).await;
    assert!(reloaded.get().is_none());
}

#[tokio::test]
async fn test_expired_jwt_is_discarded_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let backend = file_store(&dir);
    let expired = jwt(Utc::now().timestamp() - 60);
    backend.set(CREDENTIAL_KEY, &expired).await.unwrap();

    let store = CredentialStore::load(backend.clone()).await;
    assert!(!store.is_signed_in());
    assert!(backend.get(CREDENTIAL_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_valid_jwt_is_kept_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let backend = file_store(&dir);
    let valid = jwt(Utc::now().timestamp() + 3600);
    backend.set(CREDENTIAL_KEY, &valid).await.unwrap();

    let store = CredentialStore::load(backend).await;
    let credential = store.require().unwrap();
    assert_eq!(credential.expose(), valid);
    assert!(credential.expires_at().is_some());
}

#[tokio::test]
async fn test_subscribers_see_sign_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::load(file_store(&dir)).await;
    store.set(Some(Credential::new("tok-1"))).await.unwrap();

    let mut rx = store.subscribe();
    store.set(None).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_none());
}
