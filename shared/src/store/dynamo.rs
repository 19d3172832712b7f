use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use async_trait::async_trait;
use log::{debug, info};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_item};
use std::env;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    now_str, AffiliateLink, Comment, Event, Family, FamilyMember, Game, Invitation, Recipe, Rsvp,
    User,
};
use crate::store::{
    CatalogStore, CommentStore, EventStore, FamilyStore, InvitationStore, RsvpStore, UserStore,
};

// DynamoDB caps a transaction at 100 items
const MAX_TRANSACT_ITEMS: usize = 100;

/// DynamoDB-backed implementation of the full store. Table names come from
/// the environment with sensible defaults, so deployments and tests can point
/// at their own tables.
pub struct DynamoStore {
    client: Client,
    users_table: String,
    families_table: String,
    members_table: String,
    invitations_table: String,
    events_table: String,
    rsvps_table: String,
    comments_table: String,
    recipes_table: String,
    games_table: String,
    affiliate_links_table: String,
}

fn table_name(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn ser_err(e: serde_dynamo::Error) -> StoreError {
    StoreError::Serialization(e.to_string())
}

impl DynamoStore {
    pub async fn new() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let client = Client::new(&config);
        Self::with_client(client)
    }

    pub fn with_client(client: Client) -> Self {
        let store = Self {
            client,
            users_table: table_name("USERS_TABLE", "gather-users"),
            families_table: table_name("FAMILIES_TABLE", "gather-families"),
            members_table: table_name("MEMBERS_TABLE", "gather-family-members"),
            invitations_table: table_name("INVITATIONS_TABLE", "gather-invitations"),
            events_table: table_name("EVENTS_TABLE", "gather-events"),
            rsvps_table: table_name("RSVPS_TABLE", "gather-rsvps"),
            comments_table: table_name("COMMENTS_TABLE", "gather-comments"),
            recipes_table: table_name("RECIPES_TABLE", "gather-recipes"),
            games_table: table_name("GAMES_TABLE", "gather-games"),
            affiliate_links_table: table_name("AFFILIATE_LINKS_TABLE", "gather-affiliate-links"),
        };
        info!(
            "DynamoStore initialized (users='{}', families='{}', events='{}')",
            store.users_table, store.families_table, store.events_table
        );
        store
    }

    async fn put<T: serde::Serialize>(&self, table: &str, value: &T) -> StoreResult<()> {
        let item = to_item(value).map_err(ser_err)?;
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("put_item on {} failed: {}", table, e)))?;
        Ok(())
    }

    fn build_put<T: serde::Serialize>(&self, table: &str, value: &T) -> StoreResult<TransactWriteItem> {
        let item = to_item(value).map_err(ser_err)?;
        let put = Put::builder()
            .table_name(table)
            .set_item(Some(item))
            .build()
            .map_err(|e| StoreError::Internal(format!("failed to build put: {}", e)))?;
        Ok(TransactWriteItem::builder().put(put).build())
    }

    fn build_delete(
        &self,
        table: &str,
        keys: &[(&str, &str)],
    ) -> StoreResult<TransactWriteItem> {
        let mut delete = Delete::builder().table_name(table);
        for (name, value) in keys {
            delete = delete.key(name.to_string(), AttributeValue::S(value.to_string()));
        }
        let delete = delete
            .build()
            .map_err(|e| StoreError::Internal(format!("failed to build delete: {}", e)))?;
        Ok(TransactWriteItem::builder().delete(delete).build())
    }

    async fn transact(&self, items: Vec<TransactWriteItem>) -> StoreResult<()> {
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
            .map_err(|e| {
                let canceled = e
                    .as_service_error()
                    .map(|se| se.is_transaction_canceled_exception())
                    .unwrap_or(false);
                if canceled {
                    StoreError::TransactionCanceled(e.to_string())
                } else {
                    StoreError::Internal(format!("transact_write_items failed: {}", e))
                }
            })?;
        Ok(())
    }

    async fn query_by_key(
        &self,
        table: &str,
        index: Option<&str>,
        key: &str,
        value: &str,
    ) -> StoreResult<Vec<std::collections::HashMap<String, AttributeValue>>> {
        let mut query = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", key)
            .expression_attribute_values(":v", AttributeValue::S(value.to_string()));
        if let Some(index_name) = index {
            query = query.index_name(index_name);
        }
        let output = query
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("query on {} failed: {}", table, e)))?;
        Ok(output.items.unwrap_or_default())
    }
}

#[async_trait]
impl UserStore for DynamoStore {
    async fn upsert_user(&self, email: &str, name: &str) -> StoreResult<User> {
        if let Some(user) = self.get_user_by_email(email).await? {
            return Ok(user);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            hashed_password: String::new(),
            created_at: now_str(),
        };
        debug!("Creating user record for {}", email);
        self.put(&self.users_table, &user).await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.users_table)
            .key("email", AttributeValue::S(email.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("get_item on users failed: {}", e)))?;
        match output.item {
            Some(item) => Ok(Some(from_item(item).map_err(ser_err)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FamilyStore for DynamoStore {
    async fn create_family(&self, family: Family, admin: FamilyMember) -> StoreResult<Family> {
        let items = vec![
            self.build_put(&self.families_table, &family)?,
            self.build_put(&self.members_table, &admin)?,
        ];
        self.transact(items).await?;
        Ok(family)
    }

    async fn get_family(&self, family_id: &str) -> StoreResult<Family> {
        let output = self
            .client
            .get_item()
            .table_name(&self.families_table)
            .key("id", AttributeValue::S(family_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("get_item on families failed: {}", e)))?;
        let item = output
            .item
            .ok_or_else(|| StoreError::NotFound(format!("family {} not found", family_id)))?;
        from_item(item).map_err(ser_err)
    }

    async fn get_families_for_user(&self, user_id: &str) -> StoreResult<Vec<Family>> {
        let items = self
            .query_by_key(&self.members_table, Some("userId-index"), "userId", user_id)
            .await?;
        let memberships: Vec<FamilyMember> = from_items(items).map_err(ser_err)?;

        let mut families = Vec::with_capacity(memberships.len());
        for membership in memberships {
            match self.get_family(&membership.family_id).await {
                Ok(family) => families.push(family),
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(families)
    }

    async fn add_member(&self, member: FamilyMember) -> StoreResult<FamilyMember> {
        self.put(&self.members_table, &member).await?;
        Ok(member)
    }

    async fn get_member(
        &self,
        family_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<FamilyMember>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.members_table)
            .key("familyId", AttributeValue::S(family_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("get_item on members failed: {}", e)))?;
        match output.item {
            Some(item) => Ok(Some(from_item(item).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    async fn get_members(&self, family_id: &str) -> StoreResult<Vec<FamilyMember>> {
        let items = self
            .query_by_key(&self.members_table, None, "familyId", family_id)
            .await?;
        from_items(items).map_err(ser_err)
    }
}

#[async_trait]
impl InvitationStore for DynamoStore {
    async fn upsert_invitation(&self, invitation: Invitation) -> StoreResult<Invitation> {
        self.put(&self.invitations_table, &invitation).await?;
        Ok(invitation)
    }

    async fn get_invitation_by_token(&self, token: &str) -> StoreResult<Invitation> {
        let items = self
            .query_by_key(&self.invitations_table, Some("token-index"), "token", token)
            .await?;
        let item = items
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound("invitation not found".to_string()))?;
        from_item(item).map_err(ser_err)
    }

    async fn delete_invitation(&self, family_id: &str, email: &str) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(&self.invitations_table)
            .key("familyId", AttributeValue::S(family_id.to_string()))
            .key("email", AttributeValue::S(email.to_string()))
            .send()
            .await
            .map_err(|e| {
                StoreError::Internal(format!("delete_item on invitations failed: {}", e))
            })?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for DynamoStore {
    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        self.put(&self.events_table, &event).await?;
        Ok(event)
    }

    async fn get_event(&self, event_id: &str) -> StoreResult<Event> {
        let output = self
            .client
            .get_item()
            .table_name(&self.events_table)
            .key("id", AttributeValue::S(event_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("get_item on events failed: {}", e)))?;
        let item = output
            .item
            .ok_or_else(|| StoreError::NotFound(format!("event {} not found", event_id)))?;
        from_item(item).map_err(ser_err)
    }

    async fn get_events_by_family(&self, family_id: &str) -> StoreResult<Vec<Event>> {
        let items = self
            .query_by_key(&self.events_table, Some("familyId-index"), "familyId", family_id)
            .await?;
        let mut events: Vec<Event> = from_items(items).map_err(ser_err)?;
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    async fn update_event(&self, event: Event) -> StoreResult<Event> {
        self.put(&self.events_table, &event).await?;
        Ok(event)
    }

    async fn delete_event_cascade(&self, event_id: &str) -> StoreResult<()> {
        let rsvps = self.get_rsvps_by_event(event_id).await?;
        let comments = self.get_comments_by_event(event_id).await?;

        let mut deletes = Vec::with_capacity(rsvps.len() + comments.len() + 1);
        for rsvp in &rsvps {
            deletes.push(self.build_delete(
                &self.rsvps_table,
                &[("eventId", event_id), ("userId", &rsvp.user_id)],
            )?);
        }
        for comment in &comments {
            deletes.push(self.build_delete(
                &self.comments_table,
                &[("eventId", event_id), ("id", &comment.id)],
            )?);
        }
        deletes.push(self.build_delete(&self.events_table, &[("id", event_id)])?);

        debug!(
            "Deleting event {} with {} RSVPs and {} comments",
            event_id,
            rsvps.len(),
            comments.len()
        );

        // Transactions cap at 100 items; for larger events the child rows go
        // in earlier batches and the event row rides in the final one, so a
        // failure never leaves orphaned RSVPs or comments behind.
        for chunk in deletes.chunks(MAX_TRANSACT_ITEMS) {
            self.transact(chunk.to_vec()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RsvpStore for DynamoStore {
    async fn upsert_rsvp(&self, rsvp: Rsvp) -> StoreResult<Rsvp> {
        // Unconditional put on the (eventId, userId) key is the upsert;
        // concurrent writers serialize at the storage layer
        self.put(&self.rsvps_table, &rsvp).await?;
        Ok(rsvp)
    }

    async fn get_rsvps_by_event(&self, event_id: &str) -> StoreResult<Vec<Rsvp>> {
        let items = self
            .query_by_key(&self.rsvps_table, None, "eventId", event_id)
            .await?;
        from_items(items).map_err(ser_err)
    }
}

#[async_trait]
impl CommentStore for DynamoStore {
    async fn create_comment(&self, comment: Comment) -> StoreResult<Comment> {
        self.put(&self.comments_table, &comment).await?;
        Ok(comment)
    }

    async fn get_comments_by_event(&self, event_id: &str) -> StoreResult<Vec<Comment>> {
        let items = self
            .query_by_key(&self.comments_table, None, "eventId", event_id)
            .await?;
        let mut comments: Vec<Comment> = from_items(items).map_err(ser_err)?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl CatalogStore for DynamoStore {
    async fn get_recipes(&self) -> StoreResult<Vec<Recipe>> {
        let output = self
            .client
            .scan()
            .table_name(&self.recipes_table)
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("scan on recipes failed: {}", e)))?;
        from_items(output.items.unwrap_or_default()).map_err(ser_err)
    }

    async fn get_games(&self) -> StoreResult<Vec<Game>> {
        let output = self
            .client
            .scan()
            .table_name(&self.games_table)
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("scan on games failed: {}", e)))?;
        from_items(output.items.unwrap_or_default()).map_err(ser_err)
    }

    async fn get_affiliate_links(&self, item_type: &str) -> StoreResult<Vec<AffiliateLink>> {
        let items = self
            .query_by_key(&self.affiliate_links_table, None, "itemType", item_type)
            .await?;
        from_items(items).map_err(ser_err)
    }

    async fn put_recipe(&self, recipe: Recipe) -> StoreResult<()> {
        self.put(&self.recipes_table, &recipe).await
    }

    async fn put_game(&self, game: Game) -> StoreResult<()> {
        self.put(&self.games_table, &game).await
    }

    async fn put_affiliate_link(&self, link: AffiliateLink) -> StoreResult<()> {
        self.put(&self.affiliate_links_table, &link).await
    }
}
