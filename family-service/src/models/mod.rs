use serde::{Deserialize, Serialize};

use gather_shared::models::{
    Comment, Event, Family, FamilyMember, Game, MemberRole, Recipe, Rsvp, RsvpStatus,
};

// Request DTOs. Required fields are Options so a missing field surfaces as a
// 400 with a field-level message instead of a rejection from the extractor.

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    pub family_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct InviteMemberRequest {
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AcceptInvitationRequest {
    pub token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub family_id: Option<String>,
    pub title: Option<String>,
    pub host: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub host: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RsvpRequest {
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

// Response DTOs

/// The only shape a user ever takes in a response: id, name, email.
/// Password hashes and anything else stay server-side.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RsvpView {
    pub event_id: String,
    pub user_id: String,
    pub status: RsvpStatus,
    pub updated_at: String,
    pub user: UserView,
}

impl From<Rsvp> for RsvpView {
    fn from(rsvp: Rsvp) -> Self {
        RsvpView {
            user: UserView {
                id: rsvp.user_id.clone(),
                name: rsvp.user_name,
                email: rsvp.user_email,
            },
            event_id: rsvp.event_id,
            user_id: rsvp.user_id,
            status: rsvp.status,
            updated_at: rsvp.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub event_id: String,
    pub content: String,
    pub created_at: String,
    pub user: UserView,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        CommentView {
            user: UserView {
                id: comment.user_id.clone(),
                name: comment.user_name,
                email: comment.user_email,
            },
            id: comment.id,
            event_id: comment.event_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub family_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub added_at: String,
    pub user: UserView,
}

impl From<FamilyMember> for MemberView {
    fn from(member: FamilyMember) -> Self {
        MemberView {
            user: UserView {
                id: member.user_id.clone(),
                name: member.user_name,
                email: member.user_email,
            },
            family_id: member.family_id,
            user_id: member.user_id,
            role: member.role,
            added_at: member.added_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FamilyView {
    pub id: String,
    pub family_name: String,
    pub admin_user_id: String,
    pub created_at: String,
    pub members: Vec<MemberView>,
}

impl FamilyView {
    pub fn from_parts(family: Family, members: Vec<FamilyMember>) -> Self {
        FamilyView {
            id: family.id,
            family_name: family.family_name,
            admin_user_id: family.admin_user_id,
            created_at: family.created_at,
            members: members.into_iter().map(MemberView::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: String,
    pub family_id: String,
    pub title: String,
    pub host: String,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<Family>,
    pub rsvps: Vec<RsvpView>,
}

impl EventView {
    pub fn from_parts(event: Event, family: Option<Family>, rsvps: Vec<Rsvp>) -> Self {
        EventView {
            id: event.id,
            family_id: event.family_id,
            title: event.title,
            host: event.host,
            date: event.date,
            time: event.time,
            description: event.description,
            created_at: event.created_at,
            updated_at: event.updated_at,
            family,
            rsvps: rsvps.into_iter().map(RsvpView::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_url: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    #[serde(flatten)]
    pub game: Game,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_url: Option<String>,
}
