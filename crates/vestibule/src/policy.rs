//! Password rotation policy.
//!
//! A pure evaluation over the account's password audit, the identity's
//! super-admin flag, and the current time. The session manager turns a
//! positive decision into an observable rotation prompt; nothing else in
//! the system may infer rotation need from any other source.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Rotation is required once the password is this many days old.
pub const ROTATION_PERIOD_DAYS: i64 = 90;

const MS_PER_DAY: i64 = 86_400_000;

/// Password audit record as returned by the audit endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PasswordAudit {
    pub create_date: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub how_many: i64,
}

/// Outcome of a rotation-policy evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationDecision {
    pub must_rotate: bool,
    /// Whole days since the last rotation; `None` if never rotated.
    pub last_update_days: Option<i64>,
}

/// Whole days between two instants: ceiling of the absolute millisecond
/// difference, so clock skew cannot produce a negative requirement.
fn days_between(now: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    let ms = (now - reference).num_milliseconds().abs();
    (ms + MS_PER_DAY - 1) / MS_PER_DAY
}

/// Evaluate the rotation policy.
///
/// Decision table:
/// - never rotated, super-admin: rotate now, no grace period
/// - never rotated, regular: rotate once the account is 90 days old
/// - rotated before: rotate once the last rotation is 90 days old
///   (boundary inclusive at 90)
pub fn evaluate(
    is_super_admin: bool,
    audit: &PasswordAudit,
    now: DateTime<Utc>,
) -> RotationDecision {
    match audit.last_update {
        None if is_super_admin => RotationDecision {
            must_rotate: true,
            last_update_days: None,
        },
        None => RotationDecision {
            must_rotate: days_between(now, audit.create_date) >= ROTATION_PERIOD_DAYS,
            last_update_days: None,
        },
        Some(last_update) => {
            let days = days_between(now, last_update);
            RotationDecision {
                must_rotate: days >= ROTATION_PERIOD_DAYS,
                last_update_days: Some(days),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn audit(create_days_ago: i64, last_update_days_ago: Option<i64>, now: DateTime<Utc>) -> PasswordAudit {
        PasswordAudit {
            create_date: now - Duration::days(create_days_ago),
            last_update: last_update_days_ago.map(|d| now - Duration::days(d)),
            updated_by: last_update_days_ago.map(|_| "alice@example.com".to_string()),
            how_many: 1,
        }
    }

    #[test]
    fn super_admin_without_rotation_has_no_grace_period() {
        let now = Utc::now();
        for create_days_ago in [0, 1, 89, 90, 4000] {
            let decision = evaluate(true, &audit(create_days_ago, None, now), now);
            assert!(decision.must_rotate);
            assert_eq!(decision.last_update_days, None);
        }
    }

    #[test]
    fn regular_without_rotation_uses_account_age() {
        let now = Utc::now();
        let fresh = evaluate(false, &audit(89, None, now), now);
        assert!(!fresh.must_rotate);
        assert_eq!(fresh.last_update_days, None);

        // Boundary is inclusive at 90
        let at_boundary = evaluate(false, &audit(90, None, now), now);
        assert!(at_boundary.must_rotate);
        assert_eq!(at_boundary.last_update_days, None);
    }

    #[test]
    fn rotated_password_uses_last_update_age() {
        let now = Utc::now();
        let decision = evaluate(false, &audit(400, Some(91), now), now);
        assert_eq!(
            decision,
            RotationDecision {
                must_rotate: true,
                last_update_days: Some(91),
            }
        );

        let recent = evaluate(false, &audit(400, Some(5), now), now);
        assert_eq!(
            recent,
            RotationDecision {
                must_rotate: false,
                last_update_days: Some(5),
            }
        );
    }

    #[test]
    fn super_admin_with_rotation_follows_the_same_table() {
        let now = Utc::now();
        let decision = evaluate(true, &audit(400, Some(10), now), now);
        assert!(!decision.must_rotate);
        assert_eq!(decision.last_update_days, Some(10));
    }

    #[test]
    fn day_delta_is_ceiling_of_partial_days() {
        let now = Utc::now();
        let audit = PasswordAudit {
            create_date: now,
            last_update: Some(now - Duration::days(89) - Duration::hours(1)),
            updated_by: None,
            how_many: 1,
        };
        // 89 days and one hour rounds up to 90
        let decision = evaluate(false, &audit, now);
        assert!(decision.must_rotate);
        assert_eq!(decision.last_update_days, Some(90));
    }

    #[test]
    fn clock_skew_cannot_go_negative() {
        let now = Utc::now();
        let audit = PasswordAudit {
            create_date: now,
            // Rotation timestamp ahead of the local clock
            last_update: Some(now + Duration::days(3)),
            updated_by: None,
            how_many: 1,
        };
        let decision = evaluate(false, &audit, now);
        assert_eq!(decision.last_update_days, Some(3));
        assert!(!decision.must_rotate);
    }
}
