pub mod guilds;
pub mod misc;
pub mod presence;
pub mod users;
