pub mod notify;
pub mod online;

#[must_use]
pub fn commands() -> Vec<crate::Command> {
    online::commands()
        .into_iter()
        .chain(notify::commands())
        .collect()
}
