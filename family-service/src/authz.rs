use gather_shared::auth::Principal;
use gather_shared::models::MemberRole;
use gather_shared::store::GatherStore;

use crate::error::{AppError, Result};

/// Resolves the principal's role within a family. An unknown user, an
/// unknown family, or a missing membership all come back as `None`; the
/// check fails closed.
pub async fn role_of<S>(
    store: &S,
    family_id: &str,
    principal: &Principal,
) -> Result<Option<MemberRole>>
where
    S: GatherStore,
{
    let user = match store.get_user_by_email(&principal.email).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    Ok(store
        .get_member(family_id, &user.id)
        .await?
        .map(|member| member.role))
}

/// Requires any membership; `action` completes the refusal message, e.g.
/// "RSVP" becomes "You must be a family member to RSVP"
pub async fn require_member<S>(
    store: &S,
    family_id: &str,
    principal: &Principal,
    action: &str,
) -> Result<()>
where
    S: GatherStore,
{
    match role_of(store, family_id, principal).await? {
        Some(_) => Ok(()),
        None => Err(AppError::forbidden(format!(
            "You must be a family member to {}",
            action
        ))),
    }
}

/// Requires the ADMIN role; `action` completes the refusal message, e.g.
/// "update events" becomes "Only family admins can update events"
pub async fn require_admin<S>(
    store: &S,
    family_id: &str,
    principal: &Principal,
    action: &str,
) -> Result<()>
where
    S: GatherStore,
{
    match role_of(store, family_id, principal).await? {
        Some(MemberRole::Admin) => Ok(()),
        _ => Err(AppError::forbidden(format!(
            "Only family admins can {}",
            action
        ))),
    }
}
