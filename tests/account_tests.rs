//! Account controller scenarios: authorization, self-action guard and the
//! messages returned to the admin panel.

use std::path::PathBuf;
use tenantry::config::Config;
use tenantry::domain::{Caller, UserId};
use tenantry::services::account::{MSG_ACCESS_DENIED, MSG_MISSING_FIELDS, MSG_NOT_LOGGED_IN};
use tenantry::services::{AccountAction, AccountView, ActionOutcome, Role};
use tenantry::state::SharedState;

struct TestApp {
    state: SharedState,
    root: PathBuf,
    admin: Caller,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

async fn spawn_app() -> TestApp {
    let root =
        std::env::temp_dir().join(format!("tenantry-account-test-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", root.join("auth.db").display());
    config.workspace.root = root.join("user_dbs").display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = SharedState::new(config)
        .await
        .expect("failed to create shared state");

    let admin = state
        .store
        .get_user_by_username("sweet")
        .await
        .expect("failed to query admin")
        .expect("missing bootstrap admin");

    TestApp {
        state,
        root,
        admin: Caller::user(admin.id),
    }
}

impl TestApp {
    async fn member(&self, username: &str) -> Caller {
        let user = self
            .state
            .auth_service
            .create_user(username, "secret123", false)
            .await
            .expect("failed to create member");
        Caller::user(user.id)
    }

    async fn user_id(&self, username: &str) -> UserId {
        self.state
            .store
            .get_user_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn admin_creates_user() {
    let app = spawn_app().await;
    let accounts = &app.state.accounts;

    let outcome = accounts
        .create_user_action(&app.admin, "  alice ", "secret123")
        .await
        .unwrap();

    assert_eq!(outcome.message, "User 'alice' created successfully.");
    assert!(outcome.username.is_empty());
    assert!(outcome.password.is_empty());

    let alice = outcome
        .users
        .iter()
        .find(|u| u.username == "alice")
        .expect("alice is listed");
    assert!(!alice.is_admin);
    assert!(!alice.is_blocked);

    assert_eq!(accounts.refresh_user_list(&app.admin).await.unwrap(), outcome.users);
}

#[tokio::test]
async fn create_user_rejections_keep_or_clear_fields() {
    let app = spawn_app().await;
    let accounts = &app.state.accounts;

    let anonymous = accounts
        .create_user_action(&Caller::anonymous(), "alice", "secret123")
        .await
        .unwrap();
    assert_eq!(anonymous.message, MSG_NOT_LOGGED_IN);
    assert!(anonymous.users.is_empty());

    let member = app.member("bob").await;
    let denied = accounts
        .create_user_action(&member, "alice", "secret123")
        .await
        .unwrap();
    assert_eq!(denied.message, MSG_ACCESS_DENIED);
    assert!(denied.users.is_empty());

    let missing = accounts
        .create_user_action(&app.admin, "alice", "")
        .await
        .unwrap();
    assert_eq!(missing.message, MSG_MISSING_FIELDS);
    assert_eq!(missing.username, "alice");

    accounts
        .create_user_action(&app.admin, "alice", "secret123")
        .await
        .unwrap();
    let duplicate = accounts
        .create_user_action(&app.admin, "alice", "another")
        .await
        .unwrap();
    assert!(duplicate.message.starts_with("Error:"));
    assert!(duplicate.message.contains("alice"));
    assert_eq!(duplicate.username, "alice");
    assert_eq!(duplicate.password, "another");

    let store_users = app.state.auth_service.list_users().await.unwrap();
    assert_eq!(store_users.iter().filter(|u| u.username == "alice").count(), 1);
}

#[tokio::test]
async fn blocking_a_user_prevents_login() {
    let app = spawn_app().await;
    app.member("alice").await;
    let alice_id = app.user_id("alice").await;

    let users = app
        .state
        .accounts
        .toggle_block_action(&app.admin, alice_id)
        .await
        .unwrap();
    assert!(users.iter().any(|u| u.id == alice_id && u.is_blocked));

    assert!(
        app.state
            .auth_service
            .authenticate("alice", "secret123")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn non_admin_cannot_delete_or_block() {
    let app = spawn_app().await;
    let mallory = app.member("mallory").await;
    app.member("alice").await;
    let alice_id = app.user_id("alice").await;
    let admin_id = app.admin.user_id.unwrap();
    let before = app.state.auth_service.list_users().await.unwrap();

    let deleted = app
        .state
        .accounts
        .delete_user_action(&mallory, alice_id)
        .await
        .unwrap();
    let blocked = app
        .state
        .accounts
        .toggle_block_action(&mallory, admin_id)
        .await
        .unwrap();

    assert!(deleted.is_empty());
    assert!(blocked.is_empty());
    assert_eq!(app.state.auth_service.list_users().await.unwrap(), before);
}

#[tokio::test]
async fn session_admin_hint_grants_nothing() {
    let app = spawn_app().await;
    let mut member = app.member("alice").await;
    member.admin_hint = true;

    assert!(
        app.state
            .accounts
            .refresh_user_list(&member)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(matches!(
        app.state.accounts.view(&member).await.unwrap(),
        AccountView::Member { .. }
    ));
}

#[tokio::test]
async fn admins_cannot_act_on_themselves() {
    let app = spawn_app().await;
    let admin_id = app.admin.user_id.unwrap();
    let before = app.state.auth_service.get_user(admin_id).await.unwrap();

    app.state
        .accounts
        .toggle_block_action(&app.admin, admin_id)
        .await
        .unwrap();
    let users = app
        .state
        .accounts
        .delete_user_action(&app.admin, admin_id)
        .await
        .unwrap();

    assert_eq!(app.state.auth_service.get_user(admin_id).await.unwrap(), before);
    assert!(users.iter().any(|u| u.id == admin_id && !u.is_blocked));
}

#[tokio::test]
async fn blocked_admin_loses_the_panel() {
    let app = spawn_app().await;
    let second = app
        .state
        .auth_service
        .create_user("deputy", "secret123", true)
        .await
        .unwrap();
    let deputy = Caller::user(second.id);

    assert!(!app.state.accounts.refresh_user_list(&deputy).await.unwrap().is_empty());

    app.state
        .accounts
        .toggle_block_action(&app.admin, second.id)
        .await
        .unwrap();

    assert!(app.state.accounts.refresh_user_list(&deputy).await.unwrap().is_empty());
    let admin_id = app.admin.user_id.unwrap();
    app.state
        .accounts
        .delete_user_action(&deputy, admin_id)
        .await
        .unwrap();
    assert!(app.state.auth_service.get_user(admin_id).await.unwrap().is_some());
}

#[tokio::test]
async fn views_follow_the_caller_state() {
    let app = spawn_app().await;
    let accounts = &app.state.accounts;

    assert!(matches!(
        accounts.view(&Caller::anonymous()).await.unwrap(),
        AccountView::Anonymous { .. }
    ));

    match accounts.view(&app.admin).await.unwrap() {
        AccountView::Admin { profile, users } => {
            assert_eq!(profile.username, "sweet");
            assert_eq!(profile.role, Role::Administrator);
            assert_eq!(users.len(), 1);
        }
        other => panic!("expected admin view, got {other:?}"),
    }

    let alice = app.member("alice").await;
    match accounts.view(&alice).await.unwrap() {
        AccountView::Member { profile } => assert_eq!(profile.role, Role::User),
        other => panic!("expected member view, got {other:?}"),
    }

    let alice_id = alice.user_id.unwrap();
    accounts.delete_user_action(&app.admin, alice_id).await.unwrap();
    assert!(app.state.auth_service.get_user(alice_id).await.unwrap().is_none());
    assert!(matches!(
        accounts.view(&alice).await.unwrap(),
        AccountView::UnknownUser { .. }
    ));
}

#[tokio::test]
async fn dispatch_routes_typed_actions() {
    let app = spawn_app().await;
    let accounts = &app.state.accounts;
    app.member("alice").await;
    let alice_id = app.user_id("alice").await;

    let outcome = accounts
        .dispatch(&app.admin, AccountAction::Block { target_id: alice_id })
        .await
        .unwrap();
    match outcome {
        ActionOutcome::Users { users } => {
            assert!(users.iter().any(|u| u.id == alice_id && u.is_blocked));
        }
        other => panic!("expected user list, got {other:?}"),
    }

    let outcome = accounts
        .dispatch(&app.admin, AccountAction::Delete { target_id: alice_id })
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Users { ref users } if users.len() == 1));

    let outcome = accounts
        .dispatch(&app.admin, AccountAction::Logout)
        .await
        .unwrap();
    match outcome {
        ActionOutcome::Navigate(nav) => assert_eq!(nav.redirect, "/login"),
        other => panic!("expected navigation, got {other:?}"),
    }
}
