use poise::serenity_prelude::{self as serenity, GuildMemberUpdateEvent, Member};

use lookout_data::structs::Error;

/// Logs the interesting non-status member changes. Status changes never show
/// up here; those arrive as presence updates.
pub async fn guild_member_update(
    ctx: &serenity::Context,
    old_if_available: &Option<Member>,
    new: &Option<Member>,
    event: &GuildMemberUpdateEvent,
) -> Result<(), Error> {
    let guild_name = event
        .guild_id
        .name(&ctx.cache)
        .unwrap_or_else(|| "Unknown".to_owned());

    if let (Some(old_member), Some(new_member)) = (old_if_available, new) {
        let old_nickname = old_member.nick.as_deref().unwrap_or("None");
        let new_nickname = new_member.nick.as_deref().unwrap_or("None");

        if old_nickname != new_nickname {
            println!(
                "\x1B[92m[{}] Nickname change: {}: {} -> {} (ID:{})\x1B[0m",
                guild_name,
                new_member.user.tag(),
                old_nickname,
                new_nickname,
                new_member.user.id
            );
        }

        if old_member.user.tag() != new_member.user.tag() {
            println!(
                "\x1B[92mUsername change: {} -> {} (ID:{})\x1B[0m",
                old_member.user.tag(),
                new_member.user.tag(),
                new_member.user.id
            );
        }
    }

    Ok(())
}
