use std::sync::atomic::AtomicBool;

use parking_lot::RwLock;

use crate::presence::PresenceTracker;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type Command = poise::Command<Data, Error>;

pub struct Data {
    pub has_started: AtomicBool,
    pub time_started: std::time::Instant,
    pub reqwest: reqwest::Client,
    pub config: RwLock<lookout_config::LookoutConfig>,
    pub presence: PresenceTracker,
}

impl Data {
    #[must_use]
    pub fn new() -> Self {
        let config = lookout_config::LookoutConfig::load_config();

        Data {
            has_started: AtomicBool::new(false),
            time_started: std::time::Instant::now(),
            reqwest: reqwest::Client::new(),
            config: RwLock::new(config),
            presence: PresenceTracker::new(),
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}
