use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current time as an RFC 3339 string, the format all records use
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    // Empty for identity-provider-only accounts. Never exposed through the
    // API; responses carry UserView instead.
    #[serde(default)]
    pub hashed_password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Admin,
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "ADMIN"),
            MemberRole::Member => write!(f, "MEMBER"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub family_name: String,
    pub admin_user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub family_id: String,
    pub user_id: String,
    pub role: MemberRole,
    // Denormalized for responses and notification fan-out
    pub user_name: String,
    pub user_email: String,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub family_id: String,
    pub email: String,
    pub token: String,
    pub created_at: String,
    pub expires_at: String,
}

impl Invitation {
    pub fn is_expired(&self) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at.with_timezone(&Utc) < Utc::now(),
            // Unparseable expiry is treated as expired
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub family_id: String,
    pub title: String,
    // Free-text display name, not a user reference
    pub host: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    /// Parses the wire form ("YES" | "NO" | "MAYBE")
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "YES" => Some(RsvpStatus::Yes),
            "NO" => Some(RsvpStatus::No),
            "MAYBE" => Some(RsvpStatus::Maybe),
            _ => None,
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsvpStatus::Yes => write!(f, "YES"),
            RsvpStatus::No => write!(f, "NO"),
            RsvpStatus::Maybe => write!(f, "MAYBE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub event_id: String,
    pub user_id: String,
    pub status: RsvpStatus,
    pub user_name: String,
    pub user_email: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLink {
    pub item_type: String,
    pub item_id: String,
    pub affiliate_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_rsvp_status_parse() {
        assert_eq!(RsvpStatus::parse("YES"), Some(RsvpStatus::Yes));
        assert_eq!(RsvpStatus::parse("NO"), Some(RsvpStatus::No));
        assert_eq!(RsvpStatus::parse("MAYBE"), Some(RsvpStatus::Maybe));
        assert_eq!(RsvpStatus::parse("yes"), None);
        assert_eq!(RsvpStatus::parse("PERHAPS"), None);
        assert_eq!(RsvpStatus::parse(""), None);
    }

    #[test]
    fn test_rsvp_status_wire_form() {
        let json = serde_json::to_string(&RsvpStatus::Maybe).unwrap();
        assert_eq!(json, "\"MAYBE\"");
        let parsed: RsvpStatus = serde_json::from_str("\"NO\"").unwrap();
        assert_eq!(parsed, RsvpStatus::No);
    }

    #[test]
    fn test_invitation_expiry() {
        let invitation = Invitation {
            family_id: "family-1".to_string(),
            email: "new@example.com".to_string(),
            token: "token".to_string(),
            created_at: now_str(),
            expires_at: (Utc::now() + Duration::days(7)).to_rfc3339(),
        };
        assert!(!invitation.is_expired());

        let expired = Invitation {
            expires_at: (Utc::now() - Duration::hours(1)).to_rfc3339(),
            ..invitation.clone()
        };
        assert!(expired.is_expired());

        let garbled = Invitation {
            expires_at: "not-a-date".to_string(),
            ..invitation
        };
        assert!(garbled.is_expired());
    }
}
