//! Integration tests for the folder directory and audit trail.

mod helpers;

use bytes::Bytes;

use daghbas_core::error::ErrorKind;
use daghbas_entity::audit::TargetType;
use daghbas_entity::permission::GrantFlags;
use daghbas_entity::user::UserRole;

#[tokio::test]
async fn test_root_folders_need_admin() {
    let app = helpers::TestApp::new().await;
    let manager = app.user(UserRole::Manager);

    let err = app
        .services
        .folders
        .create_folder(&manager, "Mine", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let empty = app
        .services
        .folders
        .create_folder(&app.admin, "   ", None)
        .await
        .unwrap_err();
    assert_eq!(empty.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_child_folder_needs_write_on_parent() {
    let app = helpers::TestApp::new().await;
    let parent = app.root_folder("Teams").await;
    let user = app.user(UserRole::Employee);

    let denied = app
        .services
        .folders
        .create_folder(&user, "Alpha", Some(parent.id))
        .await
        .unwrap_err();
    assert_eq!(denied.kind, ErrorKind::Forbidden);

    app.grant(&user, parent.id, GrantFlags::read_write()).await;
    let child = app
        .services
        .folders
        .create_folder(&user, "Alpha", Some(parent.id))
        .await
        .unwrap();
    assert_eq!(child.parent_id, Some(parent.id));
    assert_eq!(child.created_by, user.user_id);

    let children = app
        .services
        .folders
        .list_children(&user, parent.id)
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);

    let all = app.services.folders.list_folders(&user).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(app.services.folders.exists(child.id).await.unwrap());
}

#[tokio::test]
async fn test_non_empty_folder_cannot_be_deleted() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Quarterly").await;

    let file = app
        .services
        .uploads
        .upload(&app.admin, folder.id, "q3.pdf", Bytes::from_static(b"numbers"))
        .await
        .unwrap();

    let err = app
        .services
        .folders
        .delete_folder(&app.admin, folder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    app.services.files.delete(&app.admin, file.file_id).await.unwrap();
    app.services
        .folders
        .delete_folder(&app.admin, folder.id)
        .await
        .unwrap();
    assert!(!app.services.folders.exists(folder.id).await.unwrap());

    let again = app
        .services
        .folders
        .delete_folder(&app.admin, folder.id)
        .await
        .unwrap_err();
    assert_eq!(again.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_folder_with_children_cannot_be_deleted() {
    let app = helpers::TestApp::new().await;
    let parent = app.root_folder("Root").await;
    app.services
        .folders
        .create_folder(&app.admin, "Leaf", Some(parent.id))
        .await
        .unwrap();

    let err = app
        .services
        .folders
        .delete_folder(&app.admin, parent.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_audit_trail_records_mutations() {
    let app = helpers::TestApp::new().await;
    let folder = app.root_folder("Audited").await;
    let user = app.user(UserRole::Employee);
    app.grant(&user, folder.id, GrantFlags::full()).await;

    let file = app
        .services
        .uploads
        .upload(&user, folder.id, "log.txt", Bytes::from_static(b"1"))
        .await
        .unwrap();
    app.services.files.lock(&user, file.file_id).await.unwrap();
    app.services
        .uploads
        .save_in_place(&user, file.file_id, Bytes::from_static(b"2"))
        .await
        .unwrap();
    app.services.files.unlock(&user, file.file_id).await.unwrap();

    let trail = app
        .services
        .audit
        .for_target(&app.admin, TargetType::File, &file.file_id.to_string())
        .await
        .unwrap();
    let actions: Vec<&str> = trail.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["unlock", "save_in_place", "lock", "upload"]);
    assert!(trail.iter().all(|e| e.actor_id == user.user_id));

    let folder_trail = app
        .services
        .audit
        .for_target(&app.admin, TargetType::Folder, &folder.id.to_string())
        .await
        .unwrap();
    let actions: Vec<&str> = folder_trail.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["permission_grant", "folder_create"]);
}

#[tokio::test]
async fn test_audit_reads_need_manager() {
    let app = helpers::TestApp::new().await;
    app.root_folder("One").await;
    let employee = app.user(UserRole::Employee);
    let manager = app.user(UserRole::Manager);

    let err = app.services.audit.recent(&employee, 10).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let entries = app.services.audit.recent(&manager, 0).await.unwrap();
    assert_eq!(entries.len(), 1);
}
