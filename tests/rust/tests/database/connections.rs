use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tests::db::{self, TestDatabase};
use tests::fixtures;
use tokio::sync::Mutex;
use transferdesk_core::{
    ConnectionKind, ConnectionPatch, ConnectionRepository, ConnectionSettings, ConnectionStatus,
};
use transferdesk_storage::{Database, FieldEncryptor, SqliteConnectionRepository};

#[tokio::test]
async fn test_records_survive_reopen() {
    let (shared, path, _temp_dir) = TestDatabase::new().into_shared();
    let record = fixtures::sftp_record("sftp.example.com", 2222);
    {
        let repo = db::connection_repo(shared);
        repo.create(&record).await.unwrap();
    }

    let reopened = Database::open(&path).unwrap();
    assert_eq!(reopened.schema_version().unwrap(), 1);
    let repo = db::connection_repo(Arc::new(Mutex::new(reopened)));

    let loaded = repo.get(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Partner drop");
    match loaded.settings {
        ConnectionSettings::Sftp(s) => {
            assert_eq!(s.host.as_deref(), Some("sftp.example.com"));
            assert_eq!(s.port, Some(2222));
            assert_eq!(
                s.password.unwrap().expose_secret(),
                fixtures::SFTP_PASSWORD
            );
        }
        other => panic!("unexpected settings: {:?}", other),
    }
}

#[tokio::test]
async fn test_secrets_are_not_stored_in_plaintext() {
    let (shared, _path, _temp_dir) = TestDatabase::new().into_shared();
    let repo = db::connection_repo(shared.clone());
    let record = fixtures::salesforce_record("https://login.salesforce.com");
    repo.create(&record).await.unwrap();
    repo.update(
        &record.id,
        &ConnectionPatch::status(ConnectionStatus::Connected)
            .with_access_token(SecretString::from("00Dtoken")),
    )
    .await
    .unwrap();

    let db = shared.lock().await;
    let (secret, token): (Option<String>, Option<String>) = db
        .connection()
        .query_row(
            "SELECT salesforce_consumer_secret, salesforce_access_token FROM connections WHERE id = ?1",
            [record.id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();

    let secret = secret.unwrap();
    let token = token.unwrap();
    assert!(!secret.contains(fixtures::CONSUMER_SECRET));
    assert!(!token.contains("00Dtoken"));
}

#[tokio::test]
async fn test_wrong_master_key_cannot_read_secrets() {
    let (shared, _path, _temp_dir) = TestDatabase::new().into_shared();
    let record = fixtures::sftp_record("sftp.example.com", 22);
    db::connection_repo(shared.clone())
        .create(&record)
        .await
        .unwrap();

    let other_key = FieldEncryptor::new(&[9u8; 32]).unwrap();
    let repo = SqliteConnectionRepository::new(shared, Arc::new(other_key));

    assert!(repo.get(&record.id).await.is_err());
}

#[tokio::test]
async fn test_list_filters_by_kind() {
    let (shared, _path, _temp_dir) = TestDatabase::new().into_shared();
    let repo = db::connection_repo(shared);
    repo.create(&fixtures::sftp_record("a.example.com", 22))
        .await
        .unwrap();
    repo.create(&fixtures::salesforce_record("https://login.salesforce.com"))
        .await
        .unwrap();

    assert_eq!(repo.list(None).await.unwrap().len(), 2);

    let salesforce = repo.list(Some(ConnectionKind::Salesforce)).await.unwrap();
    assert_eq!(salesforce.len(), 1);
    assert_eq!(salesforce[0].connection_type(), ConnectionKind::Salesforce);
}

#[tokio::test]
async fn test_token_patch_ignored_for_sftp() {
    let (shared, _path, _temp_dir) = TestDatabase::new().into_shared();
    let repo = db::connection_repo(shared.clone());
    let record = fixtures::sftp_record("sftp.example.com", 22);
    repo.create(&record).await.unwrap();

    repo.update(
        &record.id,
        &ConnectionPatch::status(ConnectionStatus::Connected)
            .with_access_token(SecretString::from("stray")),
    )
    .await
    .unwrap();

    let db = shared.lock().await;
    let token: Option<String> = db
        .connection()
        .query_row(
            "SELECT salesforce_access_token FROM connections WHERE id = ?1",
            [record.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert!(token.is_none());
}
