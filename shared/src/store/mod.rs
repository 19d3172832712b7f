use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    AffiliateLink, Comment, Event, Family, FamilyMember, Game, Invitation, Recipe, Rsvp, User,
};

pub mod dynamo;

/// Users are keyed by email, the identity key. `upsert_user` creates the
/// record on first contact and returns the existing one unmodified afterwards.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert_user(&self, email: &str, name: &str) -> StoreResult<User>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait FamilyStore: Send + Sync {
    /// Creates the family and its admin membership as a single atomic write.
    /// Either both rows land or neither does.
    async fn create_family(&self, family: Family, admin: FamilyMember) -> StoreResult<Family>;
    async fn get_family(&self, family_id: &str) -> StoreResult<Family>;
    async fn get_families_for_user(&self, user_id: &str) -> StoreResult<Vec<Family>>;
    async fn add_member(&self, member: FamilyMember) -> StoreResult<FamilyMember>;
    async fn get_member(&self, family_id: &str, user_id: &str)
        -> StoreResult<Option<FamilyMember>>;
    async fn get_members(&self, family_id: &str) -> StoreResult<Vec<FamilyMember>>;
}

/// Invitations are keyed by (family, email); re-inviting the same email
/// replaces the row, rotating token and expiry.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn upsert_invitation(&self, invitation: Invitation) -> StoreResult<Invitation>;
    async fn get_invitation_by_token(&self, token: &str) -> StoreResult<Invitation>;
    async fn delete_invitation(&self, family_id: &str, email: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, event: Event) -> StoreResult<Event>;
    async fn get_event(&self, event_id: &str) -> StoreResult<Event>;
    /// Events for a family, ordered by date ascending
    async fn get_events_by_family(&self, family_id: &str) -> StoreResult<Vec<Event>>;
    async fn update_event(&self, event: Event) -> StoreResult<Event>;
    /// Deletes the event together with every RSVP and comment that references
    /// it, as one all-or-nothing transaction.
    async fn delete_event_cascade(&self, event_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// One RSVP per (event, user); a repeat call replaces the stored status
    async fn upsert_rsvp(&self, rsvp: Rsvp) -> StoreResult<Rsvp>;
    async fn get_rsvps_by_event(&self, event_id: &str) -> StoreResult<Vec<Rsvp>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, comment: Comment) -> StoreResult<Comment>;
    /// Comments for an event, newest first
    async fn get_comments_by_event(&self, event_id: &str) -> StoreResult<Vec<Comment>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_recipes(&self) -> StoreResult<Vec<Recipe>>;
    async fn get_games(&self) -> StoreResult<Vec<Game>>;
    async fn get_affiliate_links(&self, item_type: &str) -> StoreResult<Vec<AffiliateLink>>;
    async fn put_recipe(&self, recipe: Recipe) -> StoreResult<()>;
    async fn put_game(&self, game: Game) -> StoreResult<()>;
    async fn put_affiliate_link(&self, link: AffiliateLink) -> StoreResult<()>;
}

/// The full data-access handle the service is generic over. Handlers receive
/// it as `State<Arc<S>>` rather than reaching for a process-wide client.
pub trait GatherStore:
    UserStore + FamilyStore + InvitationStore + EventStore + RsvpStore + CommentStore + CatalogStore
{
}

impl<T> GatherStore for T where
    T: UserStore
        + FamilyStore
        + InvitationStore
        + EventStore
        + RsvpStore
        + CommentStore
        + CatalogStore
{
}
