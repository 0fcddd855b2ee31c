use std::fmt::Write;

use lookout_data::presence::is_active;
use poise::serenity_prelude::{self as serenity, OnlineStatus};

use crate::{Context, Error};

// Above this many names per status group the list gets truncated.
const MAX_LISTED: usize = 8;

/// See who's currently online!
#[poise::command(
    slash_command,
    prefix_command,
    category = "Utility",
    guild_only,
    user_cooldown = 3
)]
pub async fn online(ctx: Context<'_>) -> Result<(), Error> {
    let (guild_name, total, online, idle, dnd) = {
        let guild = ctx.guild().unwrap();

        let mut online: Vec<String> = vec![];
        let mut idle: Vec<String> = vec![];
        let mut dnd: Vec<String> = vec![];

        for member in guild.members.values() {
            if member.user.bot {
                continue;
            }

            let status = guild
                .presences
                .get(&member.user.id)
                .map_or(OnlineStatus::Offline, |presence| presence.status);

            if !is_active(status) {
                continue;
            }

            let name = member.display_name().to_string();
            match status {
                OnlineStatus::Idle => idle.push(name),
                OnlineStatus::DoNotDisturb => dnd.push(name),
                // any other active status groups with plain online.
                _ => online.push(name),
            }
        }

        (guild.name.clone(), guild.members.len(), online, idle, dnd)
    };

    let active = online.len() + idle.len() + dnd.len();

    if active == 0 {
        let embed = serenity::CreateEmbed::new()
            .title("Nobody's online right now")
            .description("Perfect time to be the first one to start the conversation!")
            .colour(0x2f3136)
            .timestamp(serenity::Timestamp::now());

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let percentage = (active * 100) as f64 / total as f64;

    let colour = match active {
        1..=3 => 0x57f287,
        4..=8 => 0xffe792,
        9..=15 => 0xff9f43,
        _ => 0xff6b6b,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{active} member(s) online"))
        .description(format!(
            "Activity level: **{percentage:.1}%** of {total} member(s)"
        ))
        .colour(colour)
        .footer(serenity::CreateEmbedFooter::new(guild_name))
        .timestamp(serenity::Timestamp::now());

    for (label, names) in [
        ("🟢 Online", &online),
        ("🌙 Idle", &idle),
        ("⛔ Do Not Disturb", &dnd),
    ] {
        if names.is_empty() {
            continue;
        }

        let mut list = String::new();
        for name in names.iter().take(MAX_LISTED) {
            writeln!(list, "**{name}**").unwrap();
        }
        if names.len() > MAX_LISTED {
            writeln!(list, "...and {} more", names.len() - MAX_LISTED).unwrap();
        }

        embed = embed.field(format!("{label} ({})", names.len()), list, true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[must_use]
pub fn commands() -> [crate::Command; 1] {
    [online()]
}
