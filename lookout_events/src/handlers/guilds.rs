use poise::serenity_prelude::{
    self as serenity, Guild, GuildId, OnlineStatus, UnavailableGuild, User, UserId,
};

use lookout_data::structs::{Data, Error};

/// Statuses for the whole cached roster. Members with no presence entry are
/// offline as far as the gateway is concerned.
pub(crate) fn roster_statuses(guild: &Guild) -> Vec<(UserId, OnlineStatus)> {
    guild
        .members
        .keys()
        .map(|id| {
            let status = guild
                .presences
                .get(id)
                .map_or(OnlineStatus::Offline, |presence| presence.status);
            (*id, status)
        })
        .collect()
}

pub async fn guild_create(
    ctx: &serenity::Context,
    guild: &Guild,
    is_new: &Option<bool>,
    data: &Data,
) -> Result<(), Error> {
    if let Some(true) = is_new {
        println!(
            "\x1B[33mJoined {} (ID:{})!\nNow in {} guild(s)\x1B[0m",
            guild.name,
            guild.id,
            ctx.cache.guilds().len()
        );
    }

    data.presence.prime(guild.id, roster_statuses(guild));

    Ok(())
}

pub async fn guild_delete(
    incomplete: &UnavailableGuild,
    full: Option<&Guild>,
    data: &Data,
) -> Result<(), Error> {
    // Outages flag the guild unavailable; only forget it when actually removed.
    if !incomplete.unavailable {
        let name = full.map_or_else(|| incomplete.id.to_string(), |guild| guild.name.clone());
        println!("\x1B[33mLeft {name}!\x1B[0m");
        data.presence.forget_guild(incomplete.id);
    }

    Ok(())
}

pub async fn guild_member_removal(
    ctx: &serenity::Context,
    guild_id: GuildId,
    user: &User,
    data: &Data,
) -> Result<(), Error> {
    let guild_name = guild_id
        .name(&ctx.cache)
        .unwrap_or_else(|| "Unknown".to_owned());

    println!(
        "\x1B[33m[{}] {} (ID:{}) has left!\x1B[0m",
        guild_name, user.name, user.id
    );

    data.presence.forget_member(guild_id, user.id);

    Ok(())
}
