use axum::{
    extract::{Extension, Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use gather_shared::auth::Principal;
use gather_shared::email::comment_notification;
use gather_shared::models::{now_str, Comment};
use gather_shared::store::GatherStore;

use crate::authz::require_member;
use crate::error::{AppError, Result};
use crate::handlers::event_handlers::fetch_event;
use crate::models::{CommentView, CreateCommentRequest};
use crate::notifications::notify_family_members;

// POST /events/:event_id/comments
pub async fn create_comment<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_member(&*store, &event.family_id, &principal, "comment").await?;

    let content = payload
        .content
        .as_deref()
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::bad_request("Comment cannot be empty".to_string()))?
        .to_string();

    let user = store.upsert_user(&principal.email, &principal.name).await?;

    let comment = store
        .create_comment(Comment {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.clone(),
            user_id: user.id,
            user_name: user.name.clone(),
            user_email: user.email,
            content: content.clone(),
            created_at: now_str(),
        })
        .await?;

    let notice = comment_notification(&event.title, &user.name, &content);
    notify_family_members(&*store, &event.family_id, &principal.email, notice).await;

    Ok(Json(serde_json::json!({ "comment": CommentView::from(comment) })))
}

// GET /events/:event_id/comments
pub async fn list_comments<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let event = fetch_event(&*store, &event_id).await?;
    require_member(&*store, &event.family_id, &principal, "view comments").await?;

    // Newest first
    let comments: Vec<CommentView> = store
        .get_comments_by_event(&event_id)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

    Ok(Json(serde_json::json!({ "comments": comments })))
}
