use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use gather_shared::auth::create_test_request;
use gather_shared::models::{now_str, Comment, Rsvp, RsvpStatus};
use gather_shared::store::{CommentStore, EventStore, RsvpStore, UserStore};
use gather_shared::test_utils::http_test_utils::response_to_json;

use super::{create_test_app, seed_event, seed_family, seed_member};

#[tokio::test]
async fn test_member_creates_event() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    seed_member(&store, &family.id, "bob@example.com").await;

    // Creation is member-level; bob is not an admin
    let response = app
        .oneshot(create_test_request(
            "POST",
            "/events",
            "bob@example.com",
            Some(json!({
                "familyId": family.id,
                "title": "Picnic",
                "host": "Grandma",
                "date": "2026-08-15T00:00:00Z",
                "time": "12:00",
                "description": "Bring snacks"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json_resp = response_to_json(response).await;
    assert_eq!(json_resp["event"]["title"], "Picnic");
    assert_eq!(json_resp["event"]["familyId"], family.id.as_str());
    assert_eq!(json_resp["event"]["family"]["familyName"], "Smiths");
    assert!(json_resp["event"]["rsvps"].as_array().unwrap().is_empty());

    let event_id = json_resp["event"]["id"].as_str().unwrap();
    let stored = store.get_event(event_id).await.unwrap();
    assert_eq!(stored.host, "Grandma");
    assert_eq!(stored.description.as_deref(), Some("Bring snacks"));
}

#[tokio::test]
async fn test_create_event_non_member_forbidden() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    store.upsert_user("mallory@example.com", "mallory").await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/events",
            "mallory@example.com",
            Some(json!({
                "familyId": family.id,
                "title": "Picnic",
                "host": "Grandma",
                "date": "2026-08-15T00:00:00Z",
                "time": "12:00"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_event_missing_title() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/events",
            "alice@example.com",
            Some(json!({
                "familyId": family.id,
                "host": "Grandma",
                "date": "2026-08-15T00:00:00Z",
                "time": "12:00"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json_resp = response_to_json(response).await;
    assert_eq!(json_resp["error"], "Title is required");
}

#[tokio::test]
async fn test_create_event_rejects_unparseable_date() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/events",
            "alice@example.com",
            Some(json!({
                "familyId": family.id,
                "title": "Picnic",
                "host": "Grandma",
                "date": "next saturday",
                "time": "12:00"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_event_includes_rsvps_without_sensitive_fields() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let bob = seed_member(&store, &family.id, "bob@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    store
        .upsert_rsvp(Rsvp {
            event_id: event.id.clone(),
            user_id: bob.id.clone(),
            status: RsvpStatus::Yes,
            user_name: bob.name.clone(),
            user_email: bob.email.clone(),
            updated_at: now_str(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/events/{}", event.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_resp = response_to_json(response).await;
    assert_eq!(json_resp["event"]["family"]["familyName"], "Smiths");

    let rsvps = json_resp["event"]["rsvps"].as_array().unwrap();
    assert_eq!(rsvps.len(), 1);
    assert_eq!(rsvps[0]["status"], "YES");
    let user = rsvps[0]["user"].as_object().unwrap();
    assert_eq!(user["id"], bob.id.as_str());
    assert_eq!(user["email"], "bob@example.com");
    // Only id, name and email leave the server
    assert_eq!(user.len(), 3);
    assert!(!user.contains_key("hashedPassword"));
}

#[tokio::test]
async fn test_get_event_not_found() {
    let (app, _store) = create_test_app().await;

    let response = app
        .oneshot(create_test_request(
            "GET",
            "/events/no-such-event",
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_event_non_member_forbidden() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;
    store.upsert_user("mallory@example.com", "mallory").await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/events/{}", event.id),
            "mallory@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_events_sorted_by_date() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;

    let later = seed_event(&store, &family.id, "Reunion").await;
    let mut earlier = seed_event(&store, &family.id, "Picnic").await;
    earlier.date = "2026-07-01T00:00:00Z".to_string();
    store.update_event(earlier).await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/events?familyId={}", family.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_resp = response_to_json(response).await;
    let events = json_resp["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Picnic");
    assert_eq!(events[1]["id"], later.id.as_str());
}

#[tokio::test]
async fn test_list_events_requires_family_id() {
    let (app, _store) = create_test_app().await;

    let response = app
        .oneshot(create_test_request(
            "GET",
            "/events",
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_event_requires_admin() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    seed_member(&store, &family.id, "bob@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    let payload = json!({
        "title": "Picnic",
        "host": "Grandma",
        "date": "2026-08-15T00:00:00Z",
        "time": "15:00"
    });

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PUT",
            &format!("/events/{}", event.id),
            "bob@example.com",
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(create_test_request(
            "PUT",
            &format!("/events/{}", event.id),
            "alice@example.com",
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = store.get_event(&event.id).await.unwrap();
    assert_eq!(stored.time, "15:00");
}

#[tokio::test]
async fn test_update_event_keeps_description_when_absent() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let mut event = seed_event(&store, &family.id, "Picnic").await;
    event.description = Some("Bring snacks".to_string());
    store.update_event(event.clone()).await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "PUT",
            &format!("/events/{}", event.id),
            "alice@example.com",
            Some(json!({
                "title": "Picnic",
                "host": "Grandma",
                "date": "2026-08-15T00:00:00Z",
                "time": "12:00"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = store.get_event(&event.id).await.unwrap();
    assert_eq!(stored.description.as_deref(), Some("Bring snacks"));
}

#[tokio::test]
async fn test_update_missing_event_not_found() {
    let (app, _store) = create_test_app().await;

    let response = app
        .oneshot(create_test_request(
            "PUT",
            "/events/no-such-event",
            "alice@example.com",
            Some(json!({
                "title": "Picnic",
                "host": "Grandma",
                "date": "2026-08-15T00:00:00Z",
                "time": "12:00"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_event_cascades() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let bob = seed_member(&store, &family.id, "bob@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    store
        .upsert_rsvp(Rsvp {
            event_id: event.id.clone(),
            user_id: bob.id.clone(),
            status: RsvpStatus::Yes,
            user_name: bob.name.clone(),
            user_email: bob.email.clone(),
            updated_at: now_str(),
        })
        .await
        .unwrap();
    store
        .create_comment(Comment {
            id: "comment-1".to_string(),
            event_id: event.id.clone(),
            user_id: bob.id.clone(),
            user_name: bob.name.clone(),
            user_email: bob.email.clone(),
            content: "Can't wait!".to_string(),
            created_at: now_str(),
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "DELETE",
            &format!("/events/{}", event.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_resp = response_to_json(response).await;
    assert_eq!(json_resp["message"], "Event deleted successfully");

    assert!(store.get_event(&event.id).await.is_err());
    assert!(store.get_rsvps_by_event(&event.id).await.unwrap().is_empty());
    assert!(store
        .get_comments_by_event(&event.id)
        .await
        .unwrap()
        .is_empty());

    let response = app
        .oneshot(create_test_request(
            "GET",
            &format!("/events/{}", event.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_event_via_post_variant() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    let response = app
        .oneshot(create_test_request(
            "POST",
            &format!("/events/{}/delete", event.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.get_event(&event.id).await.is_err());
}

#[tokio::test]
async fn test_delete_event_requires_admin() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    seed_member(&store, &family.id, "bob@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    let response = app
        .oneshot(create_test_request(
            "DELETE",
            &format!("/events/{}", event.id),
            "bob@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(store.get_event(&event.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_event_aborted_transaction_leaves_no_partial_state() {
    let (app, store) = create_test_app().await;
    let family = seed_family(&store, "Smiths", "alice@example.com").await;
    let bob = seed_member(&store, &family.id, "bob@example.com").await;
    let event = seed_event(&store, &family.id, "Picnic").await;

    store
        .upsert_rsvp(Rsvp {
            event_id: event.id.clone(),
            user_id: bob.id.clone(),
            status: RsvpStatus::Maybe,
            user_name: bob.name.clone(),
            user_email: bob.email.clone(),
            updated_at: now_str(),
        })
        .await
        .unwrap();

    store.set_fail_event_cascade(true);

    let response = app
        .oneshot(create_test_request(
            "DELETE",
            &format!("/events/{}", event.id),
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // All-or-nothing: the event and its RSVP both survive the abort
    assert!(store.get_event(&event.id).await.is_ok());
    assert_eq!(store.get_rsvps_by_event(&event.id).await.unwrap().len(), 1);
}
