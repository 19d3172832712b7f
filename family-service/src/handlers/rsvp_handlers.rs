use axum::{
    extract::{Extension, Path, State},
    Json,
};
use log::info;
use std::sync::Arc;

use gather_shared::auth::Principal;
use gather_shared::email::rsvp_notification;
use gather_shared::models::{now_str, Rsvp, RsvpStatus};
use gather_shared::store::GatherStore;

use crate::authz::require_member;
use crate::error::{AppError, Result};
use crate::handlers::event_handlers::fetch_event;
use crate::models::{RsvpRequest, RsvpView};
use crate::notifications::notify_family_members;

// POST /events/:event_id/rsvp
pub async fn upsert_rsvp<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<RsvpRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_member(&*store, &event.family_id, &principal, "RSVP").await?;

    let status_value = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::bad_request("Status is required".to_string()))?;
    let status = RsvpStatus::parse(status_value).ok_or_else(|| {
        AppError::bad_request(format!(
            "Invalid RSVP status: {}. Must be YES, NO, or MAYBE",
            status_value
        ))
    })?;

    let user = store.upsert_user(&principal.email, &principal.name).await?;

    // One RSVP per (event, user); a repeat call overwrites the status
    let rsvp = store
        .upsert_rsvp(Rsvp {
            event_id: event_id.clone(),
            user_id: user.id,
            status,
            user_name: user.name.clone(),
            user_email: user.email,
            updated_at: now_str(),
        })
        .await?;

    info!(
        "RSVP {} recorded for event {} by {}",
        status, event_id, principal.email
    );

    let notice = rsvp_notification(&event.title, &user.name, &status.to_string());
    notify_family_members(&*store, &event.family_id, &principal.email, notice).await;

    Ok(Json(serde_json::json!({ "rsvp": RsvpView::from(rsvp) })))
}

// GET /events/:event_id/rsvp
pub async fn list_rsvps<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_member(&*store, &event.family_id, &principal, "view RSVPs").await?;

    let rsvps: Vec<RsvpView> = store
        .get_rsvps_by_event(&event_id)
        .await?
        .into_iter()
        .map(RsvpView::from)
        .collect();

    Ok(Json(serde_json::json!({ "rsvps": rsvps })))
}
