use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::DateTime;
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use gather_shared::auth::Principal;
use gather_shared::email::{event_cancelled_notification, event_update_notification, format_event_date};
use gather_shared::error::StoreError;
use gather_shared::models::{now_str, Event};
use gather_shared::store::GatherStore;

use crate::authz::{require_admin, require_member};
use crate::error::{AppError, Result};
use crate::models::{CreateEventRequest, EventView, UpdateEventRequest};
use crate::notifications::notify_family_members;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub family_id: Option<String>,
}

struct EventFields {
    title: String,
    host: String,
    date: String,
    time: String,
}

/// Shared validation for create and update payloads
fn validate_event_fields(
    title: Option<&str>,
    host: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<EventFields> {
    let title = title
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Title is required".to_string()))?;
    let host = host
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Host is required".to_string()))?;
    let date = date
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Date is required".to_string()))?;
    if DateTime::parse_from_rfc3339(date).is_err() {
        return Err(AppError::bad_request(
            "Date must be an ISO datetime string".to_string(),
        ));
    }
    let time = time
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Time is required".to_string()))?;

    Ok(EventFields {
        title: title.to_string(),
        host: host.to_string(),
        date: date.to_string(),
        time: time.to_string(),
    })
}

/// Looks an event up, turning a store miss into the client-facing 404
pub(crate) async fn fetch_event<S>(store: &S, event_id: &str) -> Result<Event>
where
    S: GatherStore,
{
    match store.get_event(event_id).await {
        Ok(event) => Ok(event),
        Err(StoreError::NotFound(_)) => {
            Err(AppError::not_found("Event not found".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Human-readable field diff for the update notice
fn event_changes(prior: &Event, updated: &Event) -> Vec<String> {
    let mut changes = Vec::new();
    if prior.title != updated.title {
        changes.push(format!("Title changed to \"{}\"", updated.title));
    }
    if prior.host != updated.host {
        changes.push(format!("Host changed to {}", updated.host));
    }
    if prior.date != updated.date {
        changes.push(format!("Date changed to {}", format_event_date(&updated.date)));
    }
    if prior.time != updated.time {
        changes.push(format!("Time changed to {}", updated.time));
    }
    if prior.description != updated.description {
        changes.push("Description updated".to_string());
    }
    changes
}

// POST /events
pub async fn create_event<S>(
    State(store): State<Arc<S>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: GatherStore,
{
    let family_id = payload
        .family_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Family ID is required".to_string()))?
        .to_string();
    let fields = validate_event_fields(
        payload.title.as_deref(),
        payload.host.as_deref(),
        payload.date.as_deref(),
        payload.time.as_deref(),
    )?;

    // Any member may create events; mutation of existing events stays
    // admin-only
    require_member(&*store, &family_id, &principal, "create events").await?;

    let now = now_str();
    let event = store
        .create_event(Event {
            id: Uuid::new_v4().to_string(),
            family_id: family_id.clone(),
            title: fields.title,
            host: fields.host,
            date: fields.date,
            time: fields.time,
            description: payload.description,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;

    info!("Created event {} in family {}", event.id, family_id);

    let family = store.get_family(&family_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "event": EventView::from_parts(event, Some(family), vec![])
        })),
    ))
}

// GET /events?familyId=...
pub async fn list_events<S>(
    State(store): State<Arc<S>>,
    Query(query): Query<ListEventsQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let family_id = query
        .family_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Family ID is required".to_string()))?;

    require_member(&*store, family_id, &principal, "view events").await?;

    let events = store.get_events_by_family(family_id).await?;
    let mut views = Vec::with_capacity(events.len());
    for event in events {
        let rsvps = store.get_rsvps_by_event(&event.id).await?;
        views.push(EventView::from_parts(event, None, rsvps));
    }

    Ok(Json(serde_json::json!({ "events": views })))
}

// GET /events/:event_id
pub async fn get_event<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_member(&*store, &event.family_id, &principal, "view this event").await?;

    let family = store.get_family(&event.family_id).await?;
    let rsvps = store.get_rsvps_by_event(&event_id).await?;

    Ok(Json(serde_json::json!({
        "event": EventView::from_parts(event, Some(family), rsvps)
    })))
}

// PUT /events/:event_id
pub async fn update_event<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let prior = fetch_event(&*store, &event_id).await?;
    require_admin(&*store, &prior.family_id, &principal, "update events").await?;

    let fields = validate_event_fields(
        payload.title.as_deref(),
        payload.host.as_deref(),
        payload.date.as_deref(),
        payload.time.as_deref(),
    )?;

    let updated = Event {
        title: fields.title,
        host: fields.host,
        date: fields.date,
        time: fields.time,
        // An absent description leaves the stored one unchanged
        description: payload.description.or_else(|| prior.description.clone()),
        updated_at: now_str(),
        ..prior.clone()
    };

    let changes = event_changes(&prior, &updated);
    let updated = store.update_event(updated).await?;

    if !changes.is_empty() {
        info!(
            "Event {} updated ({} changes), notifying family {}",
            event_id,
            changes.len(),
            updated.family_id
        );
        let notice = event_update_notification(&updated.title, &changes);
        notify_family_members(&*store, &updated.family_id, &principal.email, notice).await;
    }

    let family = store.get_family(&updated.family_id).await?;
    let rsvps = store.get_rsvps_by_event(&event_id).await?;

    Ok(Json(serde_json::json!({
        "event": EventView::from_parts(updated, Some(family), rsvps)
    })))
}

// DELETE /events/:event_id (also exposed as POST /events/:event_id/delete)
pub async fn delete_event<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_admin(&*store, &event.family_id, &principal, "delete events").await?;

    // Captured before deletion for the cancellation notice
    let title = event.title.clone();
    let date = event.date.clone();
    let family_id = event.family_id.clone();

    // RSVPs, comments and the event go in one all-or-nothing transaction
    store.delete_event_cascade(&event_id).await?;

    info!("Deleted event {} from family {}", event_id, family_id);

    let notice = event_cancelled_notification(&title, &date);
    notify_family_members(&*store, &family_id, &principal.email, notice).await;

    Ok(Json(serde_json::json!({
        "message": "Event deleted successfully"
    })))
}
