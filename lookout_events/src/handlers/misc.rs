use std::sync::atomic::Ordering;

use poise::serenity_prelude::{self as serenity, ActivityData, GuildId, OnlineStatus, Ready};

use lookout_data::structs::{Data, Error};

pub async fn ready(ctx: &serenity::Context, ready: &Ready, data: &Data) -> Result<(), Error> {
    let shard_count = ctx.cache.shard_count();
    let is_last_shard = (ctx.shard_id.0 + 1) == shard_count;

    if is_last_shard && !data.has_started.swap(true, Ordering::SeqCst) {
        ctx.set_presence(
            Some(ActivityData::watching("Who's Online")),
            OnlineStatus::DoNotDisturb,
        );
        println!("Logged in as {}", ready.user.tag());
    }

    Ok(())
}

pub async fn cache_ready(
    ctx: &serenity::Context,
    guilds: &Vec<GuildId>,
    data: &Data,
) -> Result<(), Error> {
    for guild_id in guilds {
        let snapshot = ctx
            .cache
            .guild(*guild_id)
            .map(|guild| (guild.name.clone(), super::guilds::roster_statuses(&guild)));

        let Some((name, statuses)) = snapshot else {
            continue;
        };

        let total = statuses.len();
        data.presence.prime(*guild_id, statuses);
        let online = data.presence.online_ids(*guild_id).len();

        println!("\x1B[33m[{name}] tracking {total} member(s), {online} currently online\x1B[0m");
    }

    Ok(())
}
