use chrono::DateTime;
use log::{error, info, warn};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Serialize;
use std::env;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const FROM_ADDRESS: &str = "Family Gather <notifications@familygather.app>";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

#[derive(Debug, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// A composed notice: subject plus HTML body, ready to fan out
#[derive(Debug, Clone)]
pub struct EmailNotice {
    pub subject: String,
    pub html: String,
}

/// Sends one email through the mail API. When no API key is configured the
/// send degrades to a logged no-op rather than an error.
pub async fn send_email(to: &str, subject: &str, html: &str) -> Result<(), String> {
    let api_key = match env::var("RESEND_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            warn!("RESEND_API_KEY is not set. Skipping email send.");
            return Ok(());
        }
    };

    let url = env::var("RESEND_API_URL").unwrap_or_else(|_| RESEND_API_URL.to_string());
    let message = EmailMessage {
        from: FROM_ADDRESS.to_string(),
        to: vec![to.to_string()],
        subject: subject.to_string(),
        html: html.to_string(),
    };

    let response = HTTP_CLIENT
        .post(&url)
        .bearer_auth(&api_key)
        .json(&message)
        .send()
        .await
        .map_err(|e| {
            error!("Failed to send email to {}: {}", to, e);
            format!("Failed to send email: {}", e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        error!(
            "Mail API returned error status {} for {}: {}",
            status, to, error_text
        );
        return Err(format!("Mail API error: {} - {}", status, error_text));
    }

    info!("Sent email to {} (subject: {})", to, subject);
    Ok(())
}

pub fn rsvp_notification(event_title: &str, user_name: &str, status: &str) -> EmailNotice {
    EmailNotice {
        subject: format!("New RSVP for {}", event_title),
        html: format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>New RSVP Update</h2>
  <p>{} has responded "{}" to the event "{}".</p>
  <p>Log in to view all responses and event details.</p>
</div>"#,
            user_name, status, event_title
        ),
    }
}

pub fn comment_notification(event_title: &str, user_name: &str, comment: &str) -> EmailNotice {
    EmailNotice {
        subject: format!("New Comment on {}", event_title),
        html: format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>New Comment</h2>
  <p>{} commented on the event "{}":</p>
  <blockquote style="border-left: 4px solid #e5e7eb; margin: 1.5em 0; padding-left: 1em;">
    {}
  </blockquote>
  <p>Log in to view all comments and respond.</p>
</div>"#,
            user_name, event_title, comment
        ),
    }
}

pub fn event_update_notification(event_title: &str, changes: &[String]) -> EmailNotice {
    let change_items: String = changes
        .iter()
        .map(|change| format!("<li>{}</li>", change))
        .collect();
    EmailNotice {
        subject: format!("Event Update: {}", event_title),
        html: format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Event Update</h2>
  <p>The event "{}" has been updated:</p>
  <ul style="margin: 1.5em 0;">{}</ul>
  <p>Log in to view the complete event details.</p>
</div>"#,
            event_title, change_items
        ),
    }
}

pub fn event_cancelled_notification(event_title: &str, event_date: &str) -> EmailNotice {
    EmailNotice {
        subject: format!("Event Cancelled: {}", event_title),
        html: format!(
            r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Event Cancelled</h2>
  <p>The event "{}" scheduled for {} has been cancelled.</p>
  <p>Contact the event organizer for more information.</p>
</div>"#,
            event_title,
            format_event_date(event_date)
        ),
    }
}

/// Renders a stored RFC 3339 date as a readable date, falling back to the
/// raw string when it does not parse
pub fn format_event_date(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
