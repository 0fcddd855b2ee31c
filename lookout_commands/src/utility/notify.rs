//! Commands that configure and exercise the coming-online notifications.

use lookout_events::fanout::{self, DeliveryOutcome};
use poise::serenity_prelude::{self as serenity, GuildChannel, Mentionable, Role};

use crate::{Context, Error};

async fn say_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Set the channel used for notification announcements.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    required_permissions = "ADMINISTRATOR",
    user_cooldown = 3
)]
pub async fn setchannel(
    ctx: Context<'_>,
    #[description = "The channel to send notifications to"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    let me_id = ctx.cache().current_user().id;

    let can_send = {
        let guild = ctx.guild().unwrap();
        guild
            .members
            .get(&me_id)
            .is_some_and(|me| guild.user_permissions_in(&channel, me).send_messages())
    };

    if !can_send {
        say_ephemeral(
            ctx,
            format!(
                "I don't have permission to send messages in {}.",
                channel.mention()
            ),
        )
        .await?;
        return Ok(());
    }

    {
        let mut config = ctx.data().config.write();
        config.set_notification_channel(guild_id, channel.id);
        config.write_config();
    }

    ctx.say(format!(
        "Notifications will now be sent to {}.",
        channel.mention()
    ))
    .await?;

    // Prove the channel actually works.
    let embed = serenity::CreateEmbed::new()
        .title("Setup complete")
        .description("This channel will now receive online member notifications!")
        .colour(0x5865f2);

    channel
        .id
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}

/// Remove the notification channel for this server.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    required_permissions = "ADMINISTRATOR",
    user_cooldown = 3
)]
pub async fn removechannel(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    let removed = {
        let mut config = ctx.data().config.write();
        let removed = config.clear_notification_channel(guild_id);
        if removed {
            config.write_config();
        }
        removed
    };

    if removed {
        ctx.say("Notifications have been disabled for this server.")
            .await?;
    } else {
        say_ephemeral(ctx, "No notification channel is currently set for this server.").await?;
    }

    Ok(())
}

/// Set the role whose members trigger coming-online notifications.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    required_permissions = "MANAGE_ROLES",
    user_cooldown = 3
)]
pub async fn setrole(
    ctx: Context<'_>,
    #[description = "The role to monitor for status changes"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    let holders = {
        let guild = ctx.guild().unwrap();
        guild
            .members
            .values()
            .filter(|member| member.roles.contains(&role.id))
            .count()
    };

    {
        let mut config = ctx.data().config.write();
        config.set_target_role(guild_id, role.id);
        config.write_config();
    }

    let embed = serenity::CreateEmbed::new()
        .title("Target role set")
        .description(format!(
            "Now monitoring {} for status changes.\n\n**Members with this role:** {holders}\n\n\
             Only members with this role will trigger a notification when they come online.",
            role.mention()
        ))
        .colour(0x57f287);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Stop monitoring the configured target role.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    required_permissions = "MANAGE_ROLES",
    user_cooldown = 3
)]
pub async fn removerole(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    let removed = {
        let mut config = ctx.data().config.write();
        let removed = config.clear_target_role(guild_id);
        if removed {
            config.write_config();
        }
        removed
    };

    if removed {
        ctx.say(
            "Role monitoring has been disabled. No notifications will be sent until a new \
             target role is set.",
        )
        .await?;
    } else {
        say_ephemeral(ctx, "There's no target role set for this server.").await?;
    }

    Ok(())
}

/// Check your roles against the configured target role.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    user_cooldown = 3
)]
pub async fn checkrole(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    let target = ctx.data().config.read().guild(guild_id).target_role;

    let (own_roles, target_line, has_target) = {
        let guild = ctx.guild().unwrap();
        let member = guild.members.get(&ctx.author().id);

        let own_roles = member.map_or_else(String::new, |member| {
            member
                .roles
                .iter()
                .filter_map(|id| guild.roles.get(id))
                .map(|role| role.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        });

        let resolved = target.and_then(|id| guild.roles.get(&id));
        let target_line = match (target, resolved) {
            (Some(_), Some(role)) => format!("{} ({})", role.name, role.id),
            (Some(id), None) => format!("{id} (no longer exists!)"),
            (None, _) => "No target role set for this server".to_owned(),
        };

        let has_target = match (target, member) {
            (Some(id), Some(member)) => member.roles.contains(&id),
            _ => false,
        };

        (own_roles, target_line, has_target)
    };

    let have_line = if has_target {
        "Yes! You will be notified when other holders come online."
    } else {
        "No - you need the target role to receive notifications."
    };

    let embed = serenity::CreateEmbed::new()
        .title("Role check")
        .field(
            "Your roles",
            if own_roles.is_empty() {
                "No special roles".to_owned()
            } else {
                own_roles
            },
            false,
        )
        .field("Target role", target_line, false)
        .field("Have target role?", have_line, false)
        .colour(if has_target { 0x57f287 } else { 0xff9900 })
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Post a test notification to the configured channel.
#[poise::command(
    slash_command,
    prefix_command,
    category = "Notifications",
    guild_only,
    required_permissions = "MANAGE_ROLES",
    user_cooldown = 10
)]
pub async fn testnotify(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    let config = ctx.data().config.read().guild(guild_id);

    let Some(channel_id) = config.notification_channel else {
        say_ephemeral(ctx, "Please set a notification channel first with `/setchannel`.").await?;
        return Ok(());
    };

    let Some(role_id) = config.target_role else {
        say_ephemeral(ctx, "Please set a target role first with `/setrole`.").await?;
        return Ok(());
    };

    let role_info = {
        let guild = ctx.guild().unwrap();
        guild.roles.get(&role_id).map(|role| {
            let holders = guild
                .members
                .values()
                .filter(|member| member.roles.contains(&role_id))
                .count();
            (role.name.clone(), holders)
        })
    };

    let Some((role_name, holders)) = role_info else {
        say_ephemeral(ctx, "The configured target role no longer exists.").await?;
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .title("Notification system test")
        .description(format!(
            "**Target role:** {role_name}\n**Members with role:** {holders}\n\n\
             Members with the {role_name} role will trigger a DM notification when they come \
             online."
        ))
        .colour(0x57f287)
        .timestamp(serenity::Timestamp::now());

    channel_id
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await?;

    say_ephemeral(
        ctx,
        format!("Test notification sent to {}!", channel_id.mention()),
    )
    .await?;

    Ok(())
}

/// Send yourself the exact DM used for coming-online notifications.
#[poise::command(
    slash_command,
    category = "Notifications",
    guild_only,
    user_cooldown = 10
)]
pub async fn testdm(ctx: Context<'_>) -> Result<(), Error> {
    let embed = {
        let guild = ctx.guild().unwrap();
        let display_name = guild
            .members
            .get(&ctx.author().id)
            .map_or_else(|| ctx.author().name.clone(), |m| m.display_name().to_string());

        fanout::coming_online_embed(
            &display_name,
            &guild.name,
            &ctx.author().face(),
            guild.icon_url(),
        )
    };

    let outcome = fanout::deliver_one(
        ctx.serenity_context(),
        ctx.author().id,
        serenity::CreateMessage::new().embed(embed),
    )
    .await;

    let response = match outcome {
        DeliveryOutcome::Delivered => {
            "Test DM sent! Check your DMs to see how the notification looks."
        }
        DeliveryOutcome::Suppressed => {
            "I couldn't DM you. Check that you have DMs enabled from server members and that \
             you haven't blocked me."
        }
        DeliveryOutcome::TransientFailure => {
            "Something went wrong delivering the test DM. Please try again in a moment."
        }
    };

    say_ephemeral(ctx, response).await?;

    Ok(())
}

#[must_use]
pub fn commands() -> [crate::Command; 7] {
    [
        setchannel(),
        removechannel(),
        setrole(),
        removerole(),
        checkrole(),
        testnotify(),
        testdm(),
    ]
}
