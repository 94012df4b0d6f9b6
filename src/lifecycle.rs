//! The complaint lifecycle state machine.
//!
//! Pure logic, no I/O. The mutation engine consults this before any remote
//! call, so illegal transitions are rejected without touching the network.
//!
//! ```text
//! submitted -> acknowledged -> in_progress -> resolved -> closed
//!                                          \> rejected   \> reopened -> acknowledged
//! ```
//!
//! `closed` and `rejected` are terminal. Assignment is not a status of its
//! own: assigning an unassigned complaint rides on the
//! `submitted -> acknowledged` edge.

use crate::error::{CivicError, Result};
use crate::types::{ComplaintStatus, Role};

use ComplaintStatus::*;

/// The reachable statuses from each status. Anything not listed here fails
/// with `InvalidTransition`.
const TRANSITIONS: &[(ComplaintStatus, &[ComplaintStatus])] = &[
    (Submitted, &[Acknowledged]),
    (Acknowledged, &[InProgress]),
    (InProgress, &[Resolved, Rejected]),
    (Resolved, &[Reopened, Closed]),
    (Reopened, &[Acknowledged]),
    (Closed, &[]),
    (Rejected, &[]),
];

/// Statuses reachable from `from` regardless of actor role.
pub fn allowed_targets(from: ComplaintStatus) -> &'static [ComplaintStatus] {
    TRANSITIONS
        .iter()
        .find(|(status, _)| *status == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Whether the lifecycle graph contains the edge `from -> to`.
pub fn can_transition(from: ComplaintStatus, to: ComplaintStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Which edges a role may request. Citizens act only on the resolution of
/// their own report; employees drive the processing pipeline; admins may
/// request any edge in the graph.
fn role_may_request(role: Role, from: ComplaintStatus, to: ComplaintStatus) -> bool {
    match role {
        Role::Admin => true,
        Role::Citizen => matches!((from, to), (Resolved, Reopened) | (Resolved, Closed)),
        Role::Employee => matches!(
            (from, to),
            (Submitted, Acknowledged)
                | (Acknowledged, InProgress)
                | (InProgress, Resolved)
                | (InProgress, Rejected)
                | (Reopened, Acknowledged)
        ),
    }
}

/// Validate a requested status change and return the status to apply.
///
/// Fails with `InvalidTransition` when the edge is not in the graph, or when
/// the edge exists but is not one the acting role may request.
pub fn transition(
    current: ComplaintStatus,
    requested: ComplaintStatus,
    role: Role,
) -> Result<ComplaintStatus> {
    if !can_transition(current, requested) {
        return Err(CivicError::invalid_transition(current, requested));
    }
    if !role_may_request(role, current, requested) {
        return Err(CivicError::InvalidTransition(format!(
            "{role} may not move complaint from {current} to {requested}"
        )));
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VALID_STATUSES;

    fn all_statuses() -> Vec<ComplaintStatus> {
        VALID_STATUSES.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_happy_path() {
        assert_eq!(
            transition(Submitted, Acknowledged, Role::Employee).unwrap(),
            Acknowledged
        );
        assert_eq!(
            transition(Acknowledged, InProgress, Role::Employee).unwrap(),
            InProgress
        );
        assert_eq!(
            transition(InProgress, Resolved, Role::Employee).unwrap(),
            Resolved
        );
        assert_eq!(transition(Resolved, Closed, Role::Citizen).unwrap(), Closed);
    }

    #[test]
    fn test_rejection_path() {
        assert_eq!(
            transition(InProgress, Rejected, Role::Employee).unwrap(),
            Rejected
        );
    }

    #[test]
    fn test_reopen_cycle() {
        assert_eq!(
            transition(Resolved, Reopened, Role::Citizen).unwrap(),
            Reopened
        );
        assert_eq!(
            transition(Reopened, Acknowledged, Role::Employee).unwrap(),
            Acknowledged
        );
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in all_statuses() {
            assert!(transition(Closed, to, Role::Admin).is_err());
            assert!(transition(Rejected, to, Role::Admin).is_err());
        }
    }

    #[test]
    fn test_every_pair_outside_the_table_fails() {
        for from in all_statuses() {
            for to in all_statuses() {
                let result = transition(from, to, Role::Admin);
                if can_transition(from, to) {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed for admin");
                } else {
                    assert!(
                        matches!(result, Err(CivicError::InvalidTransition(_))),
                        "{from} -> {to} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_self_transition_is_rejected() {
        for status in all_statuses() {
            assert!(transition(status, status, Role::Admin).is_err());
        }
    }

    #[test]
    fn test_citizen_cannot_drive_pipeline() {
        assert!(transition(Submitted, Acknowledged, Role::Citizen).is_err());
        assert!(transition(Acknowledged, InProgress, Role::Citizen).is_err());
        assert!(transition(InProgress, Resolved, Role::Citizen).is_err());
    }

    #[test]
    fn test_employee_cannot_close_or_reopen() {
        assert!(transition(Resolved, Closed, Role::Employee).is_err());
        assert!(transition(Resolved, Reopened, Role::Employee).is_err());
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        assert!(transition(Submitted, InProgress, Role::Admin).is_err());
        assert!(transition(Submitted, Resolved, Role::Admin).is_err());
        assert!(transition(Acknowledged, Closed, Role::Admin).is_err());
    }
}
