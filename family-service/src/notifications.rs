use log::{debug, error};
use tokio::task::JoinSet;

use gather_shared::email::{send_email, EmailNotice};
use gather_shared::store::GatherStore;

/// Fans a notice out to every family member except the actor, one email per
/// recipient, sent concurrently and awaited before the response goes out.
/// Transport failures are logged and never surface to the caller; the
/// triggering mutation has already succeeded.
pub async fn notify_family_members<S>(
    store: &S,
    family_id: &str,
    actor_email: &str,
    notice: EmailNotice,
) where
    S: GatherStore,
{
    let members = match store.get_members(family_id).await {
        Ok(members) => members,
        Err(e) => {
            error!(
                "Failed to resolve members of family {} for notification: {}",
                family_id, e
            );
            return;
        }
    };

    let recipients: Vec<String> = members
        .into_iter()
        .map(|member| member.user_email)
        .filter(|email| email != actor_email)
        .collect();

    if recipients.is_empty() {
        debug!("No recipients for notification in family {}", family_id);
        return;
    }

    debug!(
        "Dispatching \"{}\" to {} recipients in family {}",
        notice.subject,
        recipients.len(),
        family_id
    );

    let mut sends = JoinSet::new();
    for recipient in recipients {
        let subject = notice.subject.clone();
        let html = notice.html.clone();
        sends.spawn(async move {
            let result = send_email(&recipient, &subject, &html).await;
            (recipient, result)
        });
    }

    while let Some(joined) = sends.join_next().await {
        match joined {
            Ok((recipient, Err(e))) => {
                error!("Failed to send notification to {}: {}", recipient, e);
            }
            Ok((_, Ok(()))) => {}
            Err(e) => error!("Notification task failed: {}", e),
        }
    }
}
