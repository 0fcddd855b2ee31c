use std::time::Instant;

use poise::serenity_prelude as serenity;
use sysinfo::{Pid, System};

use crate::{Context, Error};

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3600;
    let minutes = secs % 3600 / 60;
    let seconds = secs % 60;

    format!("`{days}d {hours}h {minutes}m {seconds}s`")
}

fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// See how long I've been online for!
#[poise::command(slash_command, prefix_command, category = "Meta", user_cooldown = 3)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    let uptime = ctx.data().time_started.elapsed().as_secs();

    ctx.say(format_uptime(uptime)).await?;

    Ok(())
}

// Post a link to my source code!
#[poise::command(slash_command, prefix_command, category = "Meta", user_cooldown = 3)]
pub async fn source(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("<https://github.com/lookout-rs/lookout>").await?;
    Ok(())
}

/// Show general help or help to a specific command!
#[poise::command(
    prefix_command,
    track_edits,
    slash_command,
    category = "Miscellaneous",
    user_cooldown = 3
)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            ephemeral: true,
            extra_text_at_bottom: "Set up notifications with /setchannel and /setrole.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// pong!
#[poise::command(slash_command, prefix_command, category = "Meta", user_cooldown = 10)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let start = Instant::now();
    ctx.data()
        .reqwest
        .get("https://discord.com/api/v10/gateway")
        .send()
        .await?;
    let rest_ms = start.elapsed().as_millis();

    let start = Instant::now();
    let reply = ctx.say("Pinging...").await?;
    let reply_ms = start.elapsed().as_millis();

    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .content(format!("Pong! REST: `{rest_ms}ms`, reply: `{reply_ms}ms`")),
        )
        .await?;

    Ok(())
}

/// Presence-tracking and process statistics.
#[poise::command(prefix_command, hide_in_help)]
async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    let (guilds, members, online) = ctx.data().presence.totals();
    let bot_uptime = format_uptime(ctx.data().time_started.elapsed().as_secs());

    let mut embed = serenity::CreateEmbed::new()
        .title("Lookout Statistics")
        .thumbnail(ctx.cache().current_user().face())
        .field(
            "Tracking",
            format!("Guilds: **{guilds}**\nMembers: **{members}**\nOnline now: **{online}**"),
            true,
        )
        .field(
            "Bot",
            format!(
                "Up: {bot_uptime}\nShards: **{}**\nCached channels: **{}**",
                ctx.cache().shard_count(),
                ctx.cache().guild_channel_count()
            ),
            true,
        );

    let system = System::new_all();
    if let Some(process) = system.process(Pid::from(std::process::id() as usize)) {
        embed = embed.field(
            "Memory",
            format!(
                "Process: **{:.2}** MiB\nSystem: **{:.2}/{:.2}** GiB",
                mebibytes(process.memory()),
                mebibytes(system.used_memory()) / 1024.0,
                mebibytes(system.total_memory()) / 1024.0,
            ),
            true,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx).await?;

    Ok(())
}

#[must_use]
pub fn commands() -> [crate::Command; 6] {
    [uptime(), source(), help(), ping(), register(), stats()]
}
