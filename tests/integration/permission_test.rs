//! Integration tests for folder grants.

mod helpers;

use bytes::Bytes;
use uuid::Uuid;

use daghbas_core::error::ErrorKind;
use daghbas_entity::permission::GrantFlags;
use daghbas_entity::user::UserRole;

#[tokio::test]
async fn test_read_only_grant_blocks_mutations() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Handbook").await;
    let reader = app.user(UserRole::Employee);
    app.grant(&reader, folder.id, GrantFlags::read_only()).await;

    let file = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "policy.pdf", Bytes::from_static(b"rules"))
        .await
        .unwrap();

    let listed = app.services.files.list_files(&reader, folder.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    app.services.files.get_file(&reader, file.file_id).await.unwrap();

    let upload = app
        .services
        .uploads
        .upload(&reader, folder.id, "policy.pdf", Bytes::from_static(b"edit"))
        .await
        .unwrap_err();
    assert_eq!(upload.kind, ErrorKind::Forbidden);

    let lock = app.services.files.lock(&reader, file.file_id).await.unwrap_err();
    assert_eq!(lock.kind, ErrorKind::Forbidden);

    let delete = app.services.files.delete(&reader, file.file_id).await.unwrap_err();
    assert_eq!(delete.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_delete_needs_delete_flag() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Projects").await;
    let writer = app.user(UserRole::Employee);
    app.grant(&writer, folder.id, GrantFlags::read_write()).await;

    let file = app
        .services
        .uploads
        .upload(&writer, folder.id, "spec.md", Bytes::from_static(b"draft"))
        .await
        .unwrap();

    let err = app.services.files.delete(&writer, file.file_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    app.grant(&writer, folder.id, GrantFlags::full()).await;
    app.services.files.delete(&writer, file.file_id).await.unwrap();
}

#[tokio::test]
async fn test_grants_are_not_inherited() {
    let app = helpers::TestApp::new().await;
    let parent = app.root_folder("Company").await;
    let child = app
        .services
        .folders
        .create_folder(&app.admin, "HR", Some(parent.id))
        .await
        .unwrap();
    let user = app.user(UserRole::Employee);
    app.grant(&user, parent.id, GrantFlags::full()).await;

    app.services
        .uploads
        .upload(&user, parent.id, "memo.txt", Bytes::from_static(b"hi"))
        .await
        .unwrap();

    let err = app
        .services
        .uploads
        .upload(&user, child.id, "memo.txt", Bytes::from_static(b"hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_grant_replaces_flags_and_revoke_removes() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Sales").await;
    let user = app.user(UserRole::Employee);

    app.grant(&user, folder.id, GrantFlags::read_only()).await;
    app.grant(&user, folder.id, GrantFlags::read_write()).await;

    let grants = app
        .services
        .permissions
        .list_for_folder(&app.admin, folder.id)
        .await
        .unwrap();
    assert_eq!(grants.len(), 1);
    assert!(grants[0].can_write);
    assert!(!grants[0].can_delete);

    app.services
        .permissions
        .revoke(&app.admin, user.user_id, folder.id)
        .await
        .unwrap();
    let err = app
        .services
        .files
        .list_files(&user, folder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let again = app
        .services
        .permissions
        .revoke(&app.admin, user.user_id, folder.id)
        .await
        .unwrap_err();
    assert_eq!(again.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_only_admins_manage_grants() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Board").await;
    let manager = app.user(UserRole::Manager);

    let err = app
        .services
        .permissions
        .grant(&manager, manager.user_id, folder.id, GrantFlags::full())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let missing = app
        .services
        .permissions
        .grant(&app.admin, manager.user_id, Uuid::new_v4(), GrantFlags::full())
        .await
        .unwrap_err();
    assert_eq!(missing.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unenforced_grants_leave_only_lock_checks() {
    let mut config = helpers::test_config();
    config.access.enforce_grants = false;
    let app = helpers::TestApp::with_config(config).await;
    let folder = app.root_folder("Open").await;
    let u1 = app.user(UserRole::Employee);
    let u2 = app.user(UserRole::Employee);

    let file = app
        .services
        .uploads
        .upload(&u1, folder.id, "open.txt", Bytes::from_static(b"one"))
        .await
        .unwrap();
    app.services.files.lock(&u1, file.file_id).await.unwrap();

    let err = app
        .services
        .uploads
        .save_in_place(&u2, file.file_id, Bytes::from_static(b"two"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_admin_needs_grant_without_bypass() {
    let mut config = helpers::test_config();
    config.access.admin_bypasses_grants = false;
    let app = helpers::TestApp::with_config(config).await;
    let folder = app.root_folder("Strict").await;

    let err = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "a.txt", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    app.grant(&app.admin, folder.id, GrantFlags::read_write()).await;
    app.services
        .uploads
        .upload(&app.admin, folder.id, "a.txt", Bytes::from_static(b"a"))
        .await
        .unwrap();
}
