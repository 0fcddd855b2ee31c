#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::unused_async
)]

use lookout_data::structs::{Command, Context, Error};

pub mod meta;
pub mod utility;

#[must_use]
pub fn commands() -> Vec<Command> {
    meta::commands()
        .into_iter()
        .chain(utility::commands())
        .collect()
}
