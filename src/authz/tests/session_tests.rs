//! Session persistence tests

use campus_authz::identity::{current_identity, FileSessionStore, InMemorySessionStore};
use campus_authz::{AccessEngine, ActionKind, Identity, IdentityState, Role, Session, SessionStore};
use std::sync::Arc;
use tempfile::TempDir;

fn lecturer_session() -> Session {
    Session::new(
        "gv042",
        "Trần Thị B",
        Identity::new([Role::Lecturer, Role::DepartmentHead]),
    )
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));

    assert!(store.load().await.unwrap().is_none());

    let session = lecturer_session();
    store.save(&session).await.unwrap();

    let loaded = store.load().await.unwrap().expect("session should be stored");
    assert_eq!(loaded, session);
    assert_eq!(loaded.identity.state(), IdentityState::Authenticated);
}

#[tokio::test]
async fn test_file_store_relogin_replaces_session() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));

    store.save(&lecturer_session()).await.unwrap();
    let student = Session::new("sv001", "Nguyễn Văn A", Identity::new([Role::Student]));
    store.save(&student).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.user_id, "sv001");
    assert!(!loaded.identity.has_role(Role::Lecturer));
}

#[tokio::test]
async fn test_file_store_clear_is_logout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let store = FileSessionStore::new(&path);

    store.save(&lecturer_session()).await.unwrap();
    store.clear().await.unwrap();

    assert!(!path.exists());
    assert!(store.load().await.unwrap().is_none());
    // Clearing twice is fine
    store.clear().await.unwrap();
}

#[tokio::test]
async fn test_unknown_role_in_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(
        &path,
        r#"{
            "user_id": "x",
            "display_name": "x",
            "identity": {"roles": ["SINH_VIEN", "SUPER_ADMIN"]},
            "authenticated_at": "2024-05-01T08:00:00Z"
        }"#,
    )
    .await
    .unwrap();

    let store = FileSessionStore::new(&path);
    assert!(store.load().await.unwrap().is_none());
    assert!(!path.exists(), "corrupt session file should be removed");
}

#[tokio::test]
async fn test_garbage_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "not json").await.unwrap();

    let store = FileSessionStore::new(&path);
    let identity = current_identity(&store).await.unwrap();
    assert_eq!(identity.state(), IdentityState::Unauthenticated);
}

#[tokio::test]
async fn test_login_check_logout_flow() {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let engine = AccessEngine::builtin();

    // Before login
    let identity = current_identity(store.as_ref()).await.unwrap();
    assert!(!engine.has_access(&identity, ActionKind::Approve, "YeuCauMuonPhong"));

    // Login as facility manager
    let session = Session::new("ql01", "Lê Văn C", Identity::new([Role::FacilityManager]));
    store.save(&session).await.unwrap();
    let identity = current_identity(store.as_ref()).await.unwrap();
    assert!(engine.has_access(&identity, ActionKind::Approve, "YeuCauMuonPhong"));

    // Logout
    store.clear().await.unwrap();
    let identity = current_identity(store.as_ref()).await.unwrap();
    assert!(!engine.has_access(&identity, ActionKind::Approve, "YeuCauMuonPhong"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_leave_one_valid_session() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));

    for round in 0..10 {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let session = Session::new(
                        format!("u{}-{}", round, i),
                        "Người dùng",
                        Identity::new([Role::ALL[i % Role::ALL.len()]]),
                    );
                    store.save(&session).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = store.load().await.unwrap().expect("a session should survive");
        assert!(loaded.user_id.starts_with(&format!("u{}-", round)));
        assert!(loaded.identity.is_authenticated());
    }
}
