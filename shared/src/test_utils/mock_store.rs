use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    now_str, AffiliateLink, Comment, Event, Family, FamilyMember, Game, Invitation, Recipe, Rsvp,
    User,
};
use crate::store::{
    CatalogStore, CommentStore, EventStore, FamilyStore, InvitationStore, RsvpStore, UserStore,
};

/// In-memory store for handler tests. Mirrors the DynamoDB key layout:
/// users by email, members by (family, user), invitations by (family, email),
/// RSVPs by (event, user).
#[derive(Default)]
pub struct MockStore {
    users: Mutex<HashMap<String, User>>,
    families: Mutex<HashMap<String, Family>>,
    members: Mutex<HashMap<(String, String), FamilyMember>>,
    invitations: Mutex<HashMap<(String, String), Invitation>>,
    events: Mutex<HashMap<String, Event>>,
    rsvps: Mutex<HashMap<(String, String), Rsvp>>,
    comments: Mutex<Vec<Comment>>,
    recipes: Mutex<Vec<Recipe>>,
    games: Mutex<Vec<Game>>,
    affiliate_links: Mutex<Vec<AffiliateLink>>,
    fail_event_cascade: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next event-delete cascade fail as an aborted transaction,
    /// leaving every row untouched
    pub fn set_fail_event_cascade(&self, fail: bool) {
        self.fail_event_cascade.store(fail, Ordering::SeqCst);
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MockStore {
    async fn upsert_user(&self, email: &str, name: &str) -> StoreResult<User> {
        let mut users = self.lock(&self.users);
        if let Some(user) = users.get(email) {
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            hashed_password: String::new(),
            created_at: now_str(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock(&self.users).get(email).cloned())
    }
}

#[async_trait]
impl FamilyStore for MockStore {
    async fn create_family(&self, family: Family, admin: FamilyMember) -> StoreResult<Family> {
        // Both rows under one lock, mirroring the transactional write
        let mut families = self.lock(&self.families);
        let mut members = self.lock(&self.members);
        families.insert(family.id.clone(), family.clone());
        members.insert(
            (admin.family_id.clone(), admin.user_id.clone()),
            admin,
        );
        Ok(family)
    }

    async fn get_family(&self, family_id: &str) -> StoreResult<Family> {
        self.lock(&self.families)
            .get(family_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("family {} not found", family_id)))
    }

    async fn get_families_for_user(&self, user_id: &str) -> StoreResult<Vec<Family>> {
        let family_ids: Vec<String> = self
            .lock(&self.members)
            .values()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.family_id.clone())
            .collect();
        let families = self.lock(&self.families);
        Ok(family_ids
            .iter()
            .filter_map(|id| families.get(id).cloned())
            .collect())
    }

    async fn add_member(&self, member: FamilyMember) -> StoreResult<FamilyMember> {
        self.lock(&self.members).insert(
            (member.family_id.clone(), member.user_id.clone()),
            member.clone(),
        );
        Ok(member)
    }

    async fn get_member(
        &self,
        family_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<FamilyMember>> {
        Ok(self
            .lock(&self.members)
            .get(&(family_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn get_members(&self, family_id: &str) -> StoreResult<Vec<FamilyMember>> {
        Ok(self
            .lock(&self.members)
            .values()
            .filter(|m| m.family_id == family_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InvitationStore for MockStore {
    async fn upsert_invitation(&self, invitation: Invitation) -> StoreResult<Invitation> {
        self.lock(&self.invitations).insert(
            (invitation.family_id.clone(), invitation.email.clone()),
            invitation.clone(),
        );
        Ok(invitation)
    }

    async fn get_invitation_by_token(&self, token: &str) -> StoreResult<Invitation> {
        self.lock(&self.invitations)
            .values()
            .find(|i| i.token == token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("invitation not found".to_string()))
    }

    async fn delete_invitation(&self, family_id: &str, email: &str) -> StoreResult<()> {
        self.lock(&self.invitations)
            .remove(&(family_id.to_string(), email.to_string()));
        Ok(())
    }
}

#[async_trait]
impl EventStore for MockStore {
    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        self.lock(&self.events).insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: &str) -> StoreResult<Event> {
        self.lock(&self.events)
            .get(event_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("event {} not found", event_id)))
    }

    async fn get_events_by_family(&self, family_id: &str) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .lock(&self.events)
            .values()
            .filter(|e| e.family_id == family_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    async fn update_event(&self, event: Event) -> StoreResult<Event> {
        self.lock(&self.events).insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn delete_event_cascade(&self, event_id: &str) -> StoreResult<()> {
        if self.fail_event_cascade.load(Ordering::SeqCst) {
            // Aborted transaction: no row is touched
            return Err(StoreError::TransactionCanceled(
                "injected cascade failure".to_string(),
            ));
        }

        let mut events = self.lock(&self.events);
        let mut rsvps = self.lock(&self.rsvps);
        let mut comments = self.lock(&self.comments);
        rsvps.retain(|(rsvp_event_id, _), _| rsvp_event_id != event_id);
        comments.retain(|c| c.event_id != event_id);
        events.remove(event_id);
        Ok(())
    }
}

#[async_trait]
impl RsvpStore for MockStore {
    async fn upsert_rsvp(&self, rsvp: Rsvp) -> StoreResult<Rsvp> {
        self.lock(&self.rsvps).insert(
            (rsvp.event_id.clone(), rsvp.user_id.clone()),
            rsvp.clone(),
        );
        Ok(rsvp)
    }

    async fn get_rsvps_by_event(&self, event_id: &str) -> StoreResult<Vec<Rsvp>> {
        Ok(self
            .lock(&self.rsvps)
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MockStore {
    async fn create_comment(&self, comment: Comment) -> StoreResult<Comment> {
        self.lock(&self.comments).push(comment.clone());
        Ok(comment)
    }

    async fn get_comments_by_event(&self, event_id: &str) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .lock(&self.comments)
            .iter()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl CatalogStore for MockStore {
    async fn get_recipes(&self) -> StoreResult<Vec<Recipe>> {
        Ok(self.lock(&self.recipes).clone())
    }

    async fn get_games(&self) -> StoreResult<Vec<Game>> {
        Ok(self.lock(&self.games).clone())
    }

    async fn get_affiliate_links(&self, item_type: &str) -> StoreResult<Vec<AffiliateLink>> {
        Ok(self
            .lock(&self.affiliate_links)
            .iter()
            .filter(|l| l.item_type == item_type)
            .cloned()
            .collect())
    }

    async fn put_recipe(&self, recipe: Recipe) -> StoreResult<()> {
        self.lock(&self.recipes).push(recipe);
        Ok(())
    }

    async fn put_game(&self, game: Game) -> StoreResult<()> {
        self.lock(&self.games).push(game);
        Ok(())
    }

    async fn put_affiliate_link(&self, link: AffiliateLink) -> StoreResult<()> {
        self.lock(&self.affiliate_links).push(link);
        Ok(())
    }
}
