#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::unused_async
)]

use lookout_data::structs::{Data, Error};
use poise::serenity_prelude::{self as serenity, FullEvent};

pub mod fanout;
pub mod notifier;

pub mod handlers;
use handlers::*;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        // Status changes only arrive through presence updates; member updates
        // never carry one.
        FullEvent::PresenceUpdate { new_data } => {
            presence::presence_update(ctx, new_data, data).await?;
        }
        FullEvent::GuildMemberUpdate {
            old_if_available,
            new,
            event,
        } => {
            users::guild_member_update(ctx, old_if_available, new, event).await?;
        }
        FullEvent::GuildCreate { guild, is_new } => {
            guilds::guild_create(ctx, guild, is_new, data).await?;
        }
        FullEvent::GuildDelete { incomplete, full } => {
            guilds::guild_delete(incomplete, full.as_ref(), data).await?;
        }
        FullEvent::GuildMemberRemoval {
            guild_id,
            user,
            member_data_if_available: _,
        } => {
            guilds::guild_member_removal(ctx, *guild_id, user, data).await?;
        }
        FullEvent::Ready { data_about_bot } => {
            misc::ready(ctx, data_about_bot, data).await?;
        }
        FullEvent::CacheReady { guilds } => {
            misc::cache_ready(ctx, guilds, data).await?;
        }

        _ => {}
    }
    Ok(())
}
