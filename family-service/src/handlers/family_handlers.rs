use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use gather_shared::auth::Principal;
use gather_shared::error::StoreError;
use gather_shared::models::{now_str, Family, FamilyMember, Invitation, MemberRole};
use gather_shared::store::GatherStore;

use crate::authz::{require_admin, require_member};
use crate::error::{AppError, Result};
use crate::models::{
    AcceptInvitationRequest, CreateFamilyRequest, FamilyView, InviteMemberRequest, MemberView,
};

const INVITATION_VALID_DAYS: i64 = 7;

// Matches the length of a 32-byte hex token
fn generate_invite_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

// POST /families
pub async fn create_family<S>(
    State(store): State<Arc<S>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: GatherStore,
{
    let family_name = payload
        .family_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request("Family name is required".to_string()))?;

    let user = store.upsert_user(&principal.email, &principal.name).await?;

    let now = now_str();
    let family = Family {
        id: Uuid::new_v4().to_string(),
        family_name: family_name.to_string(),
        admin_user_id: user.id.clone(),
        created_at: now.clone(),
    };
    let admin = FamilyMember {
        family_id: family.id.clone(),
        user_id: user.id,
        role: MemberRole::Admin,
        user_name: user.name,
        user_email: user.email,
        added_at: now,
    };

    // Family row and admin membership land together or not at all
    let family = store.create_family(family, admin.clone()).await?;

    info!(
        "Created family {} ('{}') with admin {}",
        family.id, family.family_name, admin.user_email
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "family": FamilyView::from_parts(family, vec![admin])
        })),
    ))
}

// GET /families
pub async fn list_families<S>(
    State(store): State<Arc<S>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let families = match store.get_user_by_email(&principal.email).await? {
        Some(user) => store.get_families_for_user(&user.id).await?,
        None => vec![],
    };

    Ok(Json(serde_json::json!({ "families": families })))
}

// GET /families/:family_id
pub async fn get_family<S>(
    State(store): State<Arc<S>>,
    Path(family_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let family = store.get_family(&family_id).await?;
    require_member(&*store, &family_id, &principal, "view this family").await?;

    let members = store.get_members(&family_id).await?;

    Ok(Json(serde_json::json!({
        "family": FamilyView::from_parts(family, members)
    })))
}

// POST /families/:family_id/invite
pub async fn invite_member<S>(
    State(store): State<Arc<S>>,
    Path(family_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<InviteMemberRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| is_valid_email(email))
        .ok_or_else(|| AppError::bad_request("Invalid email address".to_string()))?
        .to_string();

    require_admin(&*store, &family_id, &principal, "send invites").await?;

    // An existing user skips the token flow entirely
    if let Some(user) = store.get_user_by_email(&email).await? {
        if store.get_member(&family_id, &user.id).await?.is_some() {
            return Err(AppError::bad_request(format!(
                "{} is already a member of this family",
                email
            )));
        }

        let member = store
            .add_member(FamilyMember {
                family_id: family_id.clone(),
                user_id: user.id,
                role: MemberRole::Member,
                user_name: user.name,
                user_email: user.email,
                added_at: now_str(),
            })
            .await?;

        info!("Added {} to family {} directly", email, family_id);

        return Ok(Json(serde_json::json!({
            "message": format!("{} has been added to the family", email),
            "familyMember": MemberView::from(member)
        })));
    }

    let token = generate_invite_token();
    let invitation = Invitation {
        family_id: family_id.clone(),
        email: email.clone(),
        token: token.clone(),
        created_at: now_str(),
        expires_at: (Utc::now() + Duration::days(INVITATION_VALID_DAYS)).to_rfc3339(),
    };
    // Re-inviting the same address rotates token and expiry
    store.upsert_invitation(invitation).await?;

    info!("Issued invitation for {} to family {}", email, family_id);

    // TODO: Send invitation email
    // For now, return the link that would be sent in the email
    Ok(Json(serde_json::json!({
        "message": "Invitation sent successfully",
        "inviteLink": format!("/invite?token={}", token)
    })))
}

// POST /invite/accept
pub async fn accept_invitation<S>(
    State(store): State<Arc<S>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let token = payload
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("Token is required".to_string()))?;

    let invitation = match store.get_invitation_by_token(token).await {
        Ok(invitation) => invitation,
        Err(StoreError::NotFound(_)) => {
            return Err(AppError::bad_request("Invalid invitation".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if invitation.is_expired() {
        return Err(AppError::bad_request("Invitation has expired".to_string()));
    }

    if invitation.email != principal.email {
        return Err(AppError::forbidden(
            "This invitation was sent to a different email address".to_string(),
        ));
    }

    let user = store.upsert_user(&principal.email, &principal.name).await?;

    if store
        .get_member(&invitation.family_id, &user.id)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request(
            "You are already a member of this family".to_string(),
        ));
    }

    let member = store
        .add_member(FamilyMember {
            family_id: invitation.family_id.clone(),
            user_id: user.id,
            role: MemberRole::Member,
            user_name: user.name,
            user_email: user.email,
            added_at: now_str(),
        })
        .await?;

    // Single-use: the invitation is consumed on acceptance
    store
        .delete_invitation(&invitation.family_id, &invitation.email)
        .await?;

    info!(
        "{} joined family {} via invitation",
        principal.email, invitation.family_id
    );

    Ok(Json(serde_json::json!({
        "message": "Successfully joined family",
        "familyMember": MemberView::from(member)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_token_shape() {
        let token = generate_invite_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_invite_token());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email(""));
    }
}
