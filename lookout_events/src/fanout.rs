//! DM fan-out to target role holders.

use poise::serenity_prelude::{
    self as serenity, CreateEmbed, CreateEmbedFooter, CreateMessage, UserId,
};

/// Outcome of a single delivery attempt. There are no retries; each
/// triggering event gets at most one attempt per recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The recipient's DMs are closed. Expected steady-state, not an error.
    Suppressed,
    TransientFailure,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: u32,
    pub suppressed: u32,
    pub failed: u32,
}

impl DeliveryReport {
    pub fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.sent += 1,
            DeliveryOutcome::Suppressed => self.suppressed += 1,
            DeliveryOutcome::TransientFailure => self.failed += 1,
        }
    }
}

/// One roster row, detached from the cache so no guard crosses an await.
#[derive(Clone, Copy, Debug)]
pub struct RosterEntry {
    pub id: UserId,
    pub bot: bool,
    pub holds_role: bool,
}

/// Everyone to DM: holders of the target role, minus bots and minus the
/// member whose transition triggered the fan-out.
pub fn recipient_ids(
    roster: impl IntoIterator<Item = RosterEntry>,
    trigger: UserId,
) -> Vec<UserId> {
    roster
        .into_iter()
        .filter(|entry| entry.holds_role && !entry.bot && entry.id != trigger)
        .map(|entry| entry.id)
        .collect()
}

/// The DM sent to each recipient when a tracked member comes online.
#[must_use]
pub fn coming_online_embed(
    display_name: &str,
    guild_name: &str,
    avatar_url: &str,
    guild_icon_url: Option<String>,
) -> CreateEmbed {
    let mut footer = CreateEmbedFooter::new(format!("From {guild_name}"));
    if let Some(icon) = guild_icon_url {
        footer = footer.icon_url(icon);
    }

    CreateEmbed::new()
        .title("🟢 Someone's Online!")
        .description(format!(
            "**{display_name}** just came online in **{guild_name}**!"
        ))
        .colour(0x00ff00)
        .thumbnail(avatar_url)
        .field(
            "💬 Ready to Chat",
            "Perfect timing to start a conversation!",
            false,
        )
        .footer(footer)
        .timestamp(serenity::Timestamp::now())
}

#[must_use]
pub fn classify_error(err: &serenity::Error) -> DeliveryOutcome {
    match err {
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 403 =>
        {
            DeliveryOutcome::Suppressed
        }
        _ => DeliveryOutcome::TransientFailure,
    }
}

/// Sends `message` to a single recipient, classifying the result.
pub async fn deliver_one(
    ctx: &serenity::Context,
    recipient: UserId,
    message: CreateMessage,
) -> DeliveryOutcome {
    match try_deliver(ctx, recipient, message).await {
        Ok(()) => DeliveryOutcome::Delivered,
        Err(err) => {
            let outcome = classify_error(&err);
            if outcome == DeliveryOutcome::Suppressed {
                tracing::debug!("DMs closed for {recipient}: {err}");
            } else {
                tracing::warn!("Failed to DM {recipient}: {err}");
            }
            outcome
        }
    }
}

async fn try_deliver(
    ctx: &serenity::Context,
    recipient: UserId,
    message: CreateMessage,
) -> Result<(), serenity::Error> {
    let channel = recipient.create_dm_channel(ctx).await?;
    channel.send_message(&ctx.http, message).await?;

    Ok(())
}

/// Best-effort delivery to every recipient. One recipient failing never
/// aborts the rest.
///
/// Delivery itself is injected so the loop can be exercised without a
/// gateway connection; the live path passes [`deliver_one`].
pub async fn fan_out<F, Fut>(recipients: &[UserId], mut deliver: F) -> DeliveryReport
where
    F: FnMut(UserId) -> Fut,
    Fut: std::future::Future<Output = DeliveryOutcome>,
{
    let mut report = DeliveryReport::default();

    for &recipient in recipients {
        report.record(deliver(recipient).await);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, bot: bool, holds_role: bool) -> RosterEntry {
        RosterEntry {
            id: UserId::new(id),
            bot,
            holds_role,
        }
    }

    #[test]
    fn trigger_is_never_its_own_recipient() {
        let roster = [entry(1, false, true), entry(2, false, true), entry(3, false, true)];

        let recipients = recipient_ids(roster, UserId::new(1));
        assert_eq!(recipients, vec![UserId::new(2), UserId::new(3)]);
    }

    #[test]
    fn bots_are_never_recipients() {
        let roster = [entry(1, false, true), entry(2, true, true), entry(3, false, true)];

        let recipients = recipient_ids(roster, UserId::new(1));
        assert_eq!(recipients, vec![UserId::new(3)]);
    }

    #[test]
    fn non_holders_are_ignored() {
        let roster = [entry(1, false, true), entry(2, false, false)];

        let recipients = recipient_ids(roster, UserId::new(1));
        assert!(recipients.is_empty());
    }

    #[test]
    fn report_counts_suppressed_separately_from_failed() {
        let mut report = DeliveryReport::default();
        report.record(DeliveryOutcome::Suppressed);
        report.record(DeliveryOutcome::Delivered);

        assert_eq!(
            report,
            DeliveryReport {
                sent: 1,
                suppressed: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn one_closed_dm_does_not_abort_the_rest() {
        let recipients = [UserId::new(1), UserId::new(2), UserId::new(3)];

        let report = fan_out(&recipients, |recipient| async move {
            if recipient == UserId::new(2) {
                DeliveryOutcome::Suppressed
            } else {
                DeliveryOutcome::Delivered
            }
        })
        .await;

        assert_eq!(
            report,
            DeliveryReport {
                sent: 2,
                suppressed: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn every_recipient_gets_exactly_one_attempt() {
        use std::cell::RefCell;

        let attempted = RefCell::new(Vec::new());
        let recipients = [UserId::new(1), UserId::new(2)];

        let report = fan_out(&recipients, |recipient| {
            attempted.borrow_mut().push(recipient);
            async move { DeliveryOutcome::TransientFailure }
        })
        .await;

        assert_eq!(*attempted.borrow(), recipients);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn report_counts_transient_failures_as_failed() {
        let mut report = DeliveryReport::default();
        report.record(DeliveryOutcome::TransientFailure);
        report.record(DeliveryOutcome::Delivered);
        report.record(DeliveryOutcome::Delivered);

        assert_eq!(
            report,
            DeliveryReport {
                sent: 2,
                suppressed: 0,
                failed: 1,
            }
        );
    }
}
