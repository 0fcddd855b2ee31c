//! Decides whether a status change should notify anyone.
//!
//! Pure and I/O-free on purpose: the caller snapshots the member and guild
//! state, this module only looks at the snapshot.

use poise::serenity_prelude::{OnlineStatus, RoleId, UserId};

use lookout_data::presence::is_active;

/// A single member status change, snapshotted at event time.
#[derive(Clone, Debug)]
pub struct StatusChange {
    pub user_id: UserId,
    pub display_name: String,
    pub bot: bool,
    pub before: OnlineStatus,
    pub after: OnlineStatus,
    /// The member's roles *after* the change.
    pub roles: Vec<RoleId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do.
    Skip(SkipReason),
    /// A target role holder crossed the offline -> online boundary.
    Notify { role: RoleId },
    /// A target role holder went offline; logged, never announced.
    LogOffline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Nickname/activity style updates that don't touch the status.
    NoStatusChange,
    Bot,
    NoTargetRole,
    /// A role is configured but no longer exists in the guild.
    TargetRoleMissing,
    MissingRole,
    /// idle <-> dnd and the like; no offline/online boundary crossed.
    SubStatusOnly,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoStatusChange => "no status change",
            SkipReason::Bot => "bot excluded",
            SkipReason::NoTargetRole => "no target role configured",
            SkipReason::TargetRoleMissing => "target role missing",
            SkipReason::MissingRole => "member lacks target role",
            SkipReason::SubStatusOnly => "no offline/online boundary crossed",
        }
    }
}

pub fn evaluate_transition(
    change: &StatusChange,
    target_role: Option<RoleId>,
    role_exists: impl FnOnce(RoleId) -> bool,
) -> Action {
    if change.before == change.after {
        return Action::Skip(SkipReason::NoStatusChange);
    }

    if change.bot {
        return Action::Skip(SkipReason::Bot);
    }

    let Some(role) = target_role else {
        return Action::Skip(SkipReason::NoTargetRole);
    };

    if !role_exists(role) {
        return Action::Skip(SkipReason::TargetRoleMissing);
    }

    if !change.roles.contains(&role) {
        return Action::Skip(SkipReason::MissingRole);
    }

    let was_online = is_active(change.before);
    let is_online = is_active(change.after);

    if !was_online && is_online {
        Action::Notify { role }
    } else if was_online && !is_online {
        Action::LogOffline
    } else {
        Action::Skip(SkipReason::SubStatusOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: [OnlineStatus; 3] = [
        OnlineStatus::Online,
        OnlineStatus::Idle,
        OnlineStatus::DoNotDisturb,
    ];
    const INACTIVE: [OnlineStatus; 2] = [OnlineStatus::Offline, OnlineStatus::Invisible];

    fn role() -> RoleId {
        RoleId::new(10)
    }

    fn change(before: OnlineStatus, after: OnlineStatus) -> StatusChange {
        StatusChange {
            user_id: UserId::new(1),
            display_name: "ruby".to_owned(),
            bot: false,
            before,
            after,
            roles: vec![role()],
        }
    }

    #[test]
    fn identical_statuses_never_notify() {
        for status in ACTIVE.into_iter().chain(INACTIVE) {
            let action = evaluate_transition(&change(status, status), Some(role()), |_| true);
            assert_eq!(action, Action::Skip(SkipReason::NoStatusChange));
        }
    }

    #[test]
    fn bots_are_excluded() {
        let mut change = change(OnlineStatus::Offline, OnlineStatus::Online);
        change.bot = true;

        let action = evaluate_transition(&change, Some(role()), |_| true);
        assert_eq!(action, Action::Skip(SkipReason::Bot));
    }

    #[test]
    fn guilds_without_a_target_role_are_quiet() {
        let action = evaluate_transition(
            &change(OnlineStatus::Offline, OnlineStatus::Online),
            None,
            |_| true,
        );
        assert_eq!(action, Action::Skip(SkipReason::NoTargetRole));
    }

    #[test]
    fn deleted_target_role_skips_without_notifying() {
        let action = evaluate_transition(
            &change(OnlineStatus::Offline, OnlineStatus::Online),
            Some(role()),
            |_| false,
        );
        assert_eq!(action, Action::Skip(SkipReason::TargetRoleMissing));
    }

    #[test]
    fn members_without_the_role_are_ignored() {
        let mut change = change(OnlineStatus::Offline, OnlineStatus::Online);
        change.roles.clear();

        let action = evaluate_transition(&change, Some(role()), |_| true);
        assert_eq!(action, Action::Skip(SkipReason::MissingRole));
    }

    #[test]
    fn active_substatus_shuffle_is_silent() {
        for before in ACTIVE {
            for after in ACTIVE {
                if before == after {
                    continue;
                }
                let action = evaluate_transition(&change(before, after), Some(role()), |_| true);
                assert_eq!(action, Action::Skip(SkipReason::SubStatusOnly));
            }
        }
    }

    #[test]
    fn offline_substatus_shuffle_is_silent() {
        let action = evaluate_transition(
            &change(OnlineStatus::Offline, OnlineStatus::Invisible),
            Some(role()),
            |_| true,
        );
        assert_eq!(action, Action::Skip(SkipReason::SubStatusOnly));
    }

    #[test]
    fn coming_online_notifies() {
        for before in INACTIVE {
            for after in ACTIVE {
                let action = evaluate_transition(&change(before, after), Some(role()), |_| true);
                assert_eq!(action, Action::Notify { role: role() });
            }
        }
    }

    #[test]
    fn going_offline_only_logs() {
        for before in ACTIVE {
            for after in INACTIVE {
                let action = evaluate_transition(&change(before, after), Some(role()), |_| true);
                assert_eq!(action, Action::LogOffline);
            }
        }
    }
}
