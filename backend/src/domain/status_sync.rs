//! Availability rule linking users to active assignments.

use serde::{Deserialize, Serialize};

use super::UserStatus;

/// Status a user should hold given their current one and whether they lead or
/// belong to an active assignment. `None` means no change.
///
/// # Examples
/// ```
/// use fleet_backend::domain::{UserStatus, status_after_sync};
///
/// assert_eq!(status_after_sync(UserStatus::Available, true), Some(UserStatus::OnAssignment));
/// assert_eq!(status_after_sync(UserStatus::OnLeave, false), None);
/// ```
pub fn status_after_sync(current: UserStatus, on_active_assignment: bool) -> Option<UserStatus> {
    match (current, on_active_assignment) {
        (UserStatus::OnAssignment, true) => None,
        (_, true) => Some(UserStatus::OnAssignment),
        (UserStatus::OnAssignment, false) => Some(UserStatus::Available),
        (_, false) => None,
    }
}

/// Users moved by a synchronisation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSyncOutcome {
    /// Users switched to `on_assignment`.
    pub promoted: u64,
    /// Users switched from `on_assignment` back to `available`.
    pub released: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserStatus::Available, true, Some(UserStatus::OnAssignment))]
    #[case(UserStatus::OnLeave, true, Some(UserStatus::OnAssignment))]
    #[case(UserStatus::Unavailable, true, Some(UserStatus::OnAssignment))]
    #[case(UserStatus::OnAssignment, true, None)]
    #[case(UserStatus::OnAssignment, false, Some(UserStatus::Available))]
    #[case(UserStatus::Available, false, None)]
    #[case(UserStatus::OnLeave, false, None)]
    #[case(UserStatus::Unavailable, false, None)]
    fn sync_rule(
        #[case] current: UserStatus,
        #[case] active: bool,
        #[case] expected: Option<UserStatus>,
    ) {
        assert_eq!(status_after_sync(current, active), expected);
    }
}
