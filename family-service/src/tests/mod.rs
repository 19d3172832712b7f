use axum::Router;
use std::env;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use gather_shared::models::{now_str, Event, Family, FamilyMember, MemberRole, User};
use gather_shared::store::{EventStore, FamilyStore, UserStore};
use gather_shared::test_utils::mock_store::MockStore;
use gather_shared::test_utils::test_logging::init_test_logging;

use crate::routes::create_router_with_store;

mod catalog_handlers_test;
mod event_handlers_test;

/// Serializes tests that reconfigure the mail transport environment
pub static EMAIL_ENV_LOCK: Mutex<()> = Mutex::new(());

pub async fn create_test_app() -> (Router, Arc<MockStore>) {
    init_test_logging();
    env::set_var("AUTH_CLIENT_SECRET", "test-secret");

    let store = Arc::new(MockStore::new());
    let app = create_router_with_store(store.clone(), "");
    (app, store)
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or("user").to_string()
}

/// Seeds a family whose admin is the user with the given email, creating the
/// user record on the way
pub async fn seed_family(store: &MockStore, family_name: &str, admin_email: &str) -> Family {
    let admin = store
        .upsert_user(admin_email, &display_name(admin_email))
        .await
        .unwrap();
    let now = now_str();
    let family = Family {
        id: Uuid::new_v4().to_string(),
        family_name: family_name.to_string(),
        admin_user_id: admin.id.clone(),
        created_at: now.clone(),
    };
    let member = FamilyMember {
        family_id: family.id.clone(),
        user_id: admin.id,
        role: MemberRole::Admin,
        user_name: admin.name,
        user_email: admin.email,
        added_at: now,
    };
    store.create_family(family.clone(), member).await.unwrap()
}

/// Seeds a MEMBER-role user into an existing family
pub async fn seed_member(store: &MockStore, family_id: &str, email: &str) -> User {
    let user = store.upsert_user(email, &display_name(email)).await.unwrap();
    store
        .add_member(FamilyMember {
            family_id: family_id.to_string(),
            user_id: user.id.clone(),
            role: MemberRole::Member,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            added_at: now_str(),
        })
        .await
        .unwrap();
    user
}

pub async fn seed_event(store: &MockStore, family_id: &str, title: &str) -> Event {
    let now = now_str();
    store
        .create_event(Event {
            id: Uuid::new_v4().to_string(),
            family_id: family_id.to_string(),
            title: title.to_string(),
            host: "Grandma".to_string(),
            date: "2026-08-15T00:00:00Z".to_string(),
            time: "12:00".to_string(),
            description: None,
            created_at: now.clone(),
            updated_at: now,
        })
        .await
        .unwrap()
}
