//! Last-seen status per member, per guild.
//!
//! The gateway only ships the *new* presence on an update, so the previous
//! status has to come from here. Beyond that the tracker is advisory; the
//! notification decision itself compares the two statuses directly.

use std::collections::HashMap;

use dashmap::DashMap;
use poise::serenity_prelude::{GuildId, OnlineStatus, UserId};

/// Whether a status counts as online for transition purposes.
///
/// Anything that isn't offline or invisible is online, including statuses
/// added to the platform later.
#[must_use]
pub fn is_active(status: OnlineStatus) -> bool {
    !matches!(status, OnlineStatus::Offline | OnlineStatus::Invisible)
}

#[derive(Default)]
pub struct PresenceTracker {
    guilds: DashMap<GuildId, HashMap<UserId, OnlineStatus>>,
}

impl PresenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a member's current status, returning the last one seen.
    ///
    /// `None` means this is the first sighting of the member.
    pub fn observe(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        status: OnlineStatus,
    ) -> Option<OnlineStatus> {
        self.guilds.entry(guild_id).or_default().insert(user_id, status)
    }

    /// Seeds a whole guild roster, replacing anything previously tracked.
    pub fn prime(&self, guild_id: GuildId, statuses: impl IntoIterator<Item = (UserId, OnlineStatus)>) {
        self.guilds.insert(guild_id, statuses.into_iter().collect());
    }

    /// Members of a guild last seen with an online status.
    #[must_use]
    pub fn online_ids(&self, guild_id: GuildId) -> Vec<UserId> {
        self.guilds.get(&guild_id).map_or_else(Vec::new, |members| {
            members
                .iter()
                .filter(|(_, status)| is_active(**status))
                .map(|(id, _)| *id)
                .collect()
        })
    }

    /// `(guilds, members, currently online)` across everything tracked.
    #[must_use]
    pub fn totals(&self) -> (usize, usize, usize) {
        let mut members = 0;
        let mut online = 0;

        for entry in &self.guilds {
            members += entry.len();
            online += entry.values().filter(|status| is_active(**status)).count();
        }

        (self.guilds.len(), members, online)
    }

    pub fn forget_member(&self, guild_id: GuildId, user_id: UserId) {
        if let Some(mut members) = self.guilds.get_mut(&guild_id) {
            members.remove(&user_id);
        }
    }

    pub fn forget_guild(&self, guild_id: GuildId) {
        self.guilds.remove(&guild_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild() -> GuildId {
        GuildId::new(1)
    }

    #[test]
    fn first_sighting_has_no_previous_status() {
        let tracker = PresenceTracker::new();
        assert_eq!(tracker.observe(guild(), UserId::new(2), OnlineStatus::Online), None);
    }

    #[test]
    fn observe_returns_the_previous_status() {
        let tracker = PresenceTracker::new();
        tracker.observe(guild(), UserId::new(2), OnlineStatus::Idle);

        let previous = tracker.observe(guild(), UserId::new(2), OnlineStatus::Offline);
        assert_eq!(previous, Some(OnlineStatus::Idle));
    }

    #[test]
    fn prime_replaces_the_roster() {
        let tracker = PresenceTracker::new();
        tracker.observe(guild(), UserId::new(2), OnlineStatus::Online);

        tracker.prime(guild(), [(UserId::new(3), OnlineStatus::DoNotDisturb)]);

        assert_eq!(tracker.observe(guild(), UserId::new(2), OnlineStatus::Online), None);
        assert_eq!(
            tracker.observe(guild(), UserId::new(3), OnlineStatus::Online),
            Some(OnlineStatus::DoNotDisturb)
        );
    }

    #[test]
    fn online_ids_skips_offline_and_invisible() {
        let tracker = PresenceTracker::new();
        tracker.prime(
            guild(),
            [
                (UserId::new(2), OnlineStatus::Online),
                (UserId::new(3), OnlineStatus::Idle),
                (UserId::new(4), OnlineStatus::Offline),
                (UserId::new(5), OnlineStatus::Invisible),
            ],
        );

        let mut online = tracker.online_ids(guild());
        online.sort();
        assert_eq!(online, vec![UserId::new(2), UserId::new(3)]);
    }

    #[test]
    fn totals_count_across_guilds() {
        let tracker = PresenceTracker::new();
        tracker.prime(
            GuildId::new(1),
            [
                (UserId::new(2), OnlineStatus::Online),
                (UserId::new(3), OnlineStatus::Offline),
            ],
        );
        tracker.prime(GuildId::new(9), [(UserId::new(4), OnlineStatus::Idle)]);

        assert_eq!(tracker.totals(), (2, 3, 2));
    }

    #[test]
    fn forgotten_members_and_guilds_are_gone() {
        let tracker = PresenceTracker::new();
        tracker.observe(guild(), UserId::new(2), OnlineStatus::Online);
        tracker.observe(guild(), UserId::new(3), OnlineStatus::Online);

        tracker.forget_member(guild(), UserId::new(2));
        assert_eq!(tracker.observe(guild(), UserId::new(2), OnlineStatus::Online), None);

        tracker.forget_guild(guild());
        assert!(tracker.online_ids(guild()).is_empty());
    }
}
