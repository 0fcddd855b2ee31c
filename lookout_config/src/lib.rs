use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use poise::serenity_prelude::{ChannelId, GuildId, RoleId};

const CONFIG_PATH: &str = "config/config.json";

/// Per-guild notification settings.
///
/// An absent field means that feature is disabled for the guild.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GuildConfig {
    pub notification_channel: Option<ChannelId>,
    pub target_role: Option<RoleId>,
}

impl GuildConfig {
    fn is_empty(self) -> bool {
        self.notification_channel.is_none() && self.target_role.is_none()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LookoutConfig {
    pub guilds: HashMap<GuildId, GuildConfig>,
}

impl LookoutConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a guild's settings, defaulting when nothing is configured.
    #[must_use]
    pub fn guild(&self, guild_id: GuildId) -> GuildConfig {
        self.guilds.get(&guild_id).copied().unwrap_or_default()
    }

    pub fn set_notification_channel(&mut self, guild_id: GuildId, channel_id: ChannelId) {
        self.guilds.entry(guild_id).or_default().notification_channel = Some(channel_id);
    }

    /// Returns whether a channel was actually set.
    pub fn clear_notification_channel(&mut self, guild_id: GuildId) -> bool {
        let Some(config) = self.guilds.get_mut(&guild_id) else {
            return false;
        };

        let was_set = config.notification_channel.take().is_some();
        if config.is_empty() {
            self.guilds.remove(&guild_id);
        }

        was_set
    }

    pub fn set_target_role(&mut self, guild_id: GuildId, role_id: RoleId) {
        self.guilds.entry(guild_id).or_default().target_role = Some(role_id);
    }

    /// Returns whether a role was actually set.
    pub fn clear_target_role(&mut self, guild_id: GuildId) -> bool {
        let Some(config) = self.guilds.get_mut(&guild_id) else {
            return false;
        };

        let was_set = config.target_role.take().is_some();
        if config.is_empty() {
            self.guilds.remove(&guild_id);
        }

        was_set
    }

    pub fn write_config(&self) {
        if let Err(e) = std::fs::create_dir_all("config") {
            tracing::error!("Unable to create config directory: {e}");
            return;
        }

        let writer = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(CONFIG_PATH);

        match writer {
            Ok(writer) => match serde_json::to_writer_pretty(writer, &self) {
                Ok(()) => tracing::info!("Successfully saved config"),
                Err(e) => tracing::error!("Failed to save config: {e}"),
            },
            Err(e) => tracing::error!("Unable to write config: {e}"),
        }
    }

    #[must_use]
    pub fn load_config() -> Self {
        let Ok(config_file) = std::fs::read_to_string(CONFIG_PATH) else {
            tracing::info!("No config file found, starting with defaults.");
            return LookoutConfig::new();
        };

        match serde_json::from_str::<LookoutConfig>(&config_file) {
            Ok(config) => {
                tracing::info!("Loaded settings for {} guild(s)", config.guilds.len());
                config
            }
            Err(err) => {
                tracing::error!("Failed to parse {CONFIG_PATH}, using defaults: {err}");
                LookoutConfig::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_guild_defaults() {
        let config = LookoutConfig::new();
        assert_eq!(config.guild(GuildId::new(1)), GuildConfig::default());
    }

    #[test]
    fn set_and_clear_target_role() {
        let mut config = LookoutConfig::new();
        let guild = GuildId::new(1);

        config.set_target_role(guild, RoleId::new(5));
        assert_eq!(config.guild(guild).target_role, Some(RoleId::new(5)));

        assert!(config.clear_target_role(guild));
        assert_eq!(config.guild(guild).target_role, None);

        // second clear reports nothing was set
        assert!(!config.clear_target_role(guild));
    }

    #[test]
    fn clearing_last_field_drops_the_entry() {
        let mut config = LookoutConfig::new();
        let guild = GuildId::new(1);

        config.set_notification_channel(guild, ChannelId::new(2));
        config.set_target_role(guild, RoleId::new(3));

        assert!(config.clear_notification_channel(guild));
        assert!(config.guilds.contains_key(&guild));

        assert!(config.clear_target_role(guild));
        assert!(!config.guilds.contains_key(&guild));
    }

    #[test]
    fn clearing_one_feature_keeps_the_other() {
        let mut config = LookoutConfig::new();
        let guild = GuildId::new(1);

        config.set_notification_channel(guild, ChannelId::new(2));
        config.set_target_role(guild, RoleId::new(3));

        assert!(config.clear_notification_channel(guild));
        assert_eq!(config.guild(guild).target_role, Some(RoleId::new(3)));
    }

    #[test]
    fn survives_a_json_round_trip() {
        let mut config = LookoutConfig::new();
        config.set_notification_channel(GuildId::new(1), ChannelId::new(10));
        config.set_target_role(GuildId::new(1), RoleId::new(20));
        config.set_target_role(GuildId::new(2), RoleId::new(30));

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: LookoutConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.guild(GuildId::new(1)),
            GuildConfig {
                notification_channel: Some(ChannelId::new(10)),
                target_role: Some(RoleId::new(20)),
            }
        );
        assert_eq!(parsed.guild(GuildId::new(2)).target_role, Some(RoleId::new(30)));
        assert_eq!(parsed.guild(GuildId::new(3)), GuildConfig::default());
    }
}
