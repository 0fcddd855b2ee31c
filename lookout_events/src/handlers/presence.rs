use poise::serenity_prelude::{self as serenity, CreateMessage, Presence, UserId};

use lookout_data::structs::{Data, Error};

use crate::fanout::{self, RosterEntry};
use crate::notifier::{evaluate_transition, Action, SkipReason, StatusChange};

/// What's left after the cache guard is released.
struct PendingFanout {
    display_name: String,
    role_name: String,
    guild_name: String,
    recipients: Vec<UserId>,
    message: CreateMessage,
}

/// Single entry point for status changes.
pub async fn presence_update(
    ctx: &serenity::Context,
    new_data: &Presence,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = new_data.guild_id else {
        tracing::warn!(
            "Presence update for {} without a guild id; dropping",
            new_data.user.id
        );
        return Ok(());
    };
    let user_id = new_data.user.id;

    let Some(before) = data.presence.observe(guild_id, user_id, new_data.status) else {
        // First sighting; nothing to compare against yet.
        return Ok(());
    };

    let config = data.config.read().guild(guild_id);

    // Everything below reads one cache snapshot; the guard is dropped before
    // any delivery I/O happens.
    let pending = {
        let Some(guild) = ctx.cache.guild(guild_id) else {
            tracing::warn!("Guild {guild_id} not in cache; dropping presence update");
            return Ok(());
        };

        let Some(member) = guild.members.get(&user_id) else {
            tracing::warn!(
                "[{}] member {user_id} not in cache; dropping presence update",
                guild.name
            );
            return Ok(());
        };

        let change = StatusChange {
            user_id,
            display_name: member.display_name().to_string(),
            bot: member.user.bot,
            before,
            after: new_data.status,
            roles: member.roles.clone(),
        };

        let action = evaluate_transition(&change, config.target_role, |role| {
            guild.roles.contains_key(&role)
        });

        match action {
            Action::Notify { role } => {
                let roster = guild.members.values().map(|m| RosterEntry {
                    id: m.user.id,
                    bot: m.user.bot,
                    holds_role: m.roles.contains(&role),
                });
                let recipients = fanout::recipient_ids(roster, user_id);

                let role_name = guild
                    .roles
                    .get(&role)
                    .map_or_else(|| role.to_string(), |r| r.name.clone());

                let embed = fanout::coming_online_embed(
                    &change.display_name,
                    &guild.name,
                    &member.face(),
                    guild.icon_url(),
                );

                Some(PendingFanout {
                    display_name: change.display_name,
                    role_name,
                    guild_name: guild.name.clone(),
                    recipients,
                    message: CreateMessage::new().embed(embed),
                })
            }
            Action::LogOffline => {
                println!(
                    "\x1B[91m[{}] {} went offline (no notification sent)\x1B[0m",
                    guild.name, change.display_name
                );
                None
            }
            Action::Skip(reason) => {
                if reason == SkipReason::TargetRoleMissing {
                    tracing::warn!(
                        "[{}] configured target role no longer exists",
                        guild.name
                    );
                } else {
                    tracing::debug!(
                        "[{}] skipping {:?} -> {:?} for {}: {}",
                        guild.name,
                        before,
                        new_data.status,
                        change.display_name,
                        reason.as_str()
                    );
                }
                None
            }
        }
    };

    let Some(pending) = pending else {
        return Ok(());
    };

    if pending.recipients.is_empty() {
        tracing::info!(
            "[{}] nobody to notify for {} coming online",
            pending.guild_name,
            pending.display_name
        );
        return Ok(());
    }

    println!(
        "\x1B[92m[{}] {} came online, notifying {} member(s) with role {}\x1B[0m",
        pending.guild_name,
        pending.display_name,
        pending.recipients.len(),
        pending.role_name
    );

    let report = fanout::fan_out(&pending.recipients, |recipient| {
        fanout::deliver_one(ctx, recipient, pending.message.clone())
    })
    .await;

    tracing::info!(
        "[{}] DM fan-out for {}: {} sent, {} suppressed, {} failed",
        pending.guild_name,
        pending.display_name,
        report.sent,
        report.suppressed,
        report.failed
    );

    Ok(())
}
