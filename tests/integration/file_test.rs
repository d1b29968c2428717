//! Integration tests for the versioning and lock engine.

mod helpers;

use std::collections::BTreeSet;

use bytes::Bytes;

use daghbas_core::error::ErrorKind;
use daghbas_entity::permission::GrantFlags;
use daghbas_entity::user::UserRole;

#[tokio::test]
async fn test_lock_save_unlock_scenario() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Engineering").await;
    let u1 = app.user(UserRole::Employee);
    let u2 = app.user(UserRole::Employee);
    app.grant(&u1, folder.id, GrantFlags::full()).await;
    app.grant(&u2, folder.id, GrantFlags::full()).await;

    let first = app
        .services
        .uploads
        .upload(&u1, folder.id, "design.docx", Bytes::from_static(b"draft one"))
        .await
        .unwrap();
    assert_eq!(first.version, 1);
    assert!(!first.saved_in_place);

    app.services.files.lock(&u1, first.file_id).await.unwrap();

    let err = app
        .services
        .uploads
        .upload(&u2, folder.id, "design.docx", Bytes::from_static(b"intruder"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let second = app
        .services
        .uploads
        .upload(&u1, folder.id, "design.docx", Bytes::from_static(b"draft two"))
        .await
        .unwrap();
    assert_eq!(second.file_id, first.file_id);
    assert_eq!(second.version, 2);
    assert!(second.saved_in_place);
    assert_eq!(app.read_payload(first.file_id).await, Bytes::from_static(b"draft two"));

    app.services.files.unlock(&u1, first.file_id).await.unwrap();
    let record = app.services.files.lock(&u2, first.file_id).await.unwrap();
    assert_eq!(record.locked_by, Some(u2.user_id));

    let saved = app
        .services
        .uploads
        .save_in_place(&u2, first.file_id, Bytes::from_static(b"draft three"))
        .await
        .unwrap();
    assert_eq!(saved.version, 3);
    assert_eq!(app.read_payload(first.file_id).await, Bytes::from_static(b"draft three"));
}

#[tokio::test]
async fn test_lock_excludes_other_users() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Shared").await;
    let holder = app.user(UserRole::Employee);
    let other = app.user(UserRole::Manager);
    app.grant(&holder, folder.id, GrantFlags::full()).await;
    app.grant(&other, folder.id, GrantFlags::full()).await;
    let target = app.root_folder("Archive").await;
    app.grant(&other, target.id, GrantFlags::full()).await;

    let file = app
        .services
        .uploads
        .upload(&holder, folder.id, "plan.xlsx", Bytes::from_static(b"v1"))
        .await
        .unwrap();
    app.services.files.lock(&holder, file.file_id).await.unwrap();

    let lock = app.services.files.lock(&other, file.file_id).await.unwrap_err();
    assert_eq!(lock.kind, ErrorKind::Conflict);

    let unlock = app.services.files.unlock(&other, file.file_id).await.unwrap_err();
    assert_eq!(unlock.kind, ErrorKind::Forbidden);

    let save = app
        .services
        .uploads
        .save_in_place(&other, file.file_id, Bytes::from_static(b"v2"))
        .await
        .unwrap_err();
    assert_eq!(save.kind, ErrorKind::Conflict);

    let moved = app
        .services
        .files
        .move_file(&other, file.file_id, target.id)
        .await
        .unwrap_err();
    assert_eq!(moved.kind, ErrorKind::Conflict);

    let deleted = app.services.files.delete(&other, file.file_id).await.unwrap_err();
    assert_eq!(deleted.kind, ErrorKind::Conflict);

    let record = app.services.files.get_file(&holder, file.file_id).await.unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.folder_id, folder.id);
    assert_eq!(record.locked_by, Some(holder.user_id));
}

#[tokio::test]
async fn test_admin_overrides_foreign_lock() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Legal").await;
    let target = app.root_folder("Legal Archive").await;
    let holder = app.user(UserRole::Employee);
    app.grant(&holder, folder.id, GrantFlags::full()).await;

    let file = app
        .services
        .uploads
        .upload(&holder, folder.id, "contract.pdf", Bytes::from_static(b"terms"))
        .await
        .unwrap();
    app.services.files.lock(&holder, file.file_id).await.unwrap();

    let saved = app
        .services
        .uploads
        .save_in_place(&app.admin, file.file_id, Bytes::from_static(b"amended"))
        .await
        .unwrap();
    assert_eq!(saved.version, 2);

    let moved = app
        .services
        .files
        .move_file(&app.admin, file.file_id, target.id)
        .await
        .unwrap();
    assert_eq!(moved.folder_id, target.id);
    assert_eq!(moved.locked_by, Some(holder.user_id));

    app.services.files.delete(&app.admin, file.file_id).await.unwrap();
    let err = app
        .services
        .files
        .get_file(&app.admin, file.file_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_admin_takes_over_lock() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Ops").await;
    let holder = app.user(UserRole::Employee);
    app.grant(&holder, folder.id, GrantFlags::full()).await;

    let file = app
        .services
        .uploads
        .upload(&holder, folder.id, "runbook.md", Bytes::from_static(b"steps"))
        .await
        .unwrap();
    app.services.files.lock(&holder, file.file_id).await.unwrap();

    let record = app.services.files.lock(&app.admin, file.file_id).await.unwrap();
    assert_eq!(record.locked_by, Some(app.admin.user_id));

    let err = app.services.files.unlock(&holder, file.file_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_lock_is_idempotent_and_always_audited() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Docs").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::read_write()).await;

    let file = app
        .services
        .uploads
        .upload(&user, folder.id, "notes.txt", Bytes::from_static(b"hello"))
        .await
        .unwrap();

    let first = app.services.files.lock(&user, file.file_id).await.unwrap();
    let before = app.audit_count().await;
    let second = app.services.files.lock(&user, file.file_id).await.unwrap();

    assert_eq!(first.locked_at, second.locked_at);
    assert_eq!(app.audit_count().await, before + 1);

    let unlocked = app.services.files.unlock(&user, file.file_id).await.unwrap();
    assert!(unlocked.locked_by.is_none());
    assert!(unlocked.locked_at.is_none());
    app.services.files.unlock(&user, file.file_id).await.unwrap();
}

#[tokio::test]
async fn test_double_delete_is_not_found() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Tmp").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::full()).await;

    let file = app
        .services
        .uploads
        .upload(&user, folder.id, "scratch.txt", Bytes::from_static(b"x"))
        .await
        .unwrap();

    app.services.files.delete(&user, file.file_id).await.unwrap();
    assert_eq!(app.storage.blob_count(), 0);

    let err = app.services.files.delete(&user, file.file_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_concurrent_same_name_uploads_serialize() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Race").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::read_write()).await;

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let services = app.services.clone();
        let user = user.clone();
        let folder_id = folder.id;
        handles.push(tokio::spawn(async move {
            services
                .uploads
                .upload(&user, folder_id, "report.csv", Bytes::from(vec![i; 16]))
                .await
        }));
    }

    let mut versions = BTreeSet::new();
    let mut created = 0;
    let mut file_ids = BTreeSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        versions.insert(outcome.version);
        file_ids.insert(outcome.file_id);
        if !outcome.saved_in_place {
            created += 1;
        }
    }

    assert_eq!(versions, (1..=8).collect::<BTreeSet<i32>>());
    assert_eq!(created, 1);
    assert_eq!(file_ids.len(), 1);
    assert_eq!(app.storage.blob_count(), 1);
}

#[tokio::test]
async fn test_failed_blob_write_leaves_no_record() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Media").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::read_write()).await;
    let before = app.audit_count().await;

    app.storage.fail_writes(true);
    let err = app
        .services
        .uploads
        .upload(&user, folder.id, "video.mp4", Bytes::from_static(b"frames"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    let files = app.services.files.list_files(&user, folder.id).await.unwrap();
    assert!(files.is_empty());
    assert_eq!(app.audit_count().await, before);
    assert_eq!(app.storage.blob_count(), 0);
}

#[tokio::test]
async fn test_failed_save_keeps_version() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Finance").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::read_write()).await;

    let file = app
        .services
        .uploads
        .upload(&user, folder.id, "budget.xlsx", Bytes::from_static(b"q1"))
        .await
        .unwrap();

    app.storage.fail_writes(true);
    let err = app
        .services
        .uploads
        .save_in_place(&user, file.file_id, Bytes::from_static(b"q2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    app.storage.fail_writes(false);

    let record = app.services.files.get_file(&user, file.file_id).await.unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(app.read_payload(file.file_id).await, Bytes::from_static(b"q1"));
}

#[tokio::test]
async fn test_failed_audit_restores_previous_payload() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Legal").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::read_write()).await;

    let file = app
        .services
        .uploads
        .upload(&user, folder.id, "contract.pdf", Bytes::from_static(b"signed"))
        .await
        .unwrap();
    let blobs = app.storage.blob_count();

    app.store.fail_audit(true);
    let save = app
        .services
        .uploads
        .save_in_place(&user, file.file_id, Bytes::from_static(b"redlined"))
        .await
        .unwrap_err();
    assert_eq!(save.kind, ErrorKind::Database);

    let replace = app
        .services
        .uploads
        .upload(&user, folder.id, "contract.pdf", Bytes::from_static(b"overwritten"))
        .await
        .unwrap_err();
    assert_eq!(replace.kind, ErrorKind::Database);

    let fresh = app
        .services
        .uploads
        .upload(&user, folder.id, "annex.pdf", Bytes::from_static(b"new"))
        .await
        .unwrap_err();
    assert_eq!(fresh.kind, ErrorKind::Database);
    app.store.fail_audit(false);

    let record = app.services.files.get_file(&user, file.file_id).await.unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.size_bytes, 6);
    assert_eq!(app.read_payload(file.file_id).await, Bytes::from_static(b"signed"));
    assert_eq!(app.storage.blob_count(), blobs);
}

#[tokio::test]
async fn test_download_does_not_check_grants() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Private").await;
    let owner = app.user(UserRole::Employee);
    let stranger = app.user(UserRole::ReadOnly);
    app.grant(&owner, folder.id, GrantFlags::read_write()).await;

    let file = app
        .services
        .uploads
        .upload(&owner, folder.id, "secret.txt", Bytes::from_static(b"payload"))
        .await
        .unwrap();

    let download = app
        .services
        .downloads
        .download(&stranger, file.file_id)
        .await
        .unwrap();
    assert_eq!(download.record.id, file.file_id);

    let err = app
        .services
        .files
        .get_file(&stranger, file.file_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_inactive_principal_is_rejected() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Any").await;
    let mut user = app.user(UserRole::Admin);
    user.active = false;

    let err = app
        .services
        .uploads
        .upload(&user, folder.id, "a.txt", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_upload_input_validation() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Inbox").await;

    let empty = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "  ", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert_eq!(empty.kind, ErrorKind::Validation);

    let traversal = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "../etc/passwd", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert_eq!(traversal.kind, ErrorKind::Validation);

    let limit = app.config.storage.max_upload_size_bytes as usize;
    let oversized = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "big.bin", Bytes::from(vec![0u8; limit + 1]))
        .await
        .unwrap_err();
    assert_eq!(oversized.kind, ErrorKind::Validation);

    let missing = app
        .services
        .uploads
        .upload(&app.admin, uuid::Uuid::new_v4(), "a.txt", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert_eq!(missing.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_move_rejects_name_clash() {
    let app = helpers::TestApp::new().await;
    let source = app.root_folder("Drafts").await;
    let target = app.root_folder("Final").await;

    let draft = app
        .services
        .uploads
        .upload(&app.admin, source.id, "report.pdf", Bytes::from_static(b"draft"))
        .await
        .unwrap();
    app.services
        .uploads
        .upload(&app.admin, target.id, "report.pdf", Bytes::from_static(b"final"))
        .await
        .unwrap();

    let err = app
        .services
        .files
        .move_file(&app.admin, draft.file_id, target.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}
