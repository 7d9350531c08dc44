//! Assignment state machine and the overdue rule.

use chrono::{DateTime, Duration, Utc};

use super::choices::AssignmentStatus;

/// Days a reader has to finish a review after taking a book.
pub const REVIEW_WINDOW_DAYS: i64 = 5;

/// Stars credited to a reader for a submitted review.
pub const DEFAULT_STARS_REWARD: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentAction {
    StartReading,
    MarkLinkPending,
    SubmitReview,
    Complete,
    Cancel,
}

impl AssignmentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentAction::StartReading => "start reading",
            AssignmentAction::MarkLinkPending => "mark link pending",
            AssignmentAction::SubmitReview => "submit review",
            AssignmentAction::Complete => "complete",
            AssignmentAction::Cancel => "cancel",
        }
    }
}

impl AssignmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Cancelled)
    }

    /// Status reached by applying `action`, or `None` if not allowed from here.
    pub fn apply(self, action: AssignmentAction) -> Option<AssignmentStatus> {
        use AssignmentStatus::*;
        match (self, action) {
            (Assigned, AssignmentAction::StartReading) => Some(Reading),
            (Reading, AssignmentAction::MarkLinkPending) => Some(LinkPending),
            (Reading | LinkPending, AssignmentAction::SubmitReview) => Some(ReviewSubmitted),
            (ReviewSubmitted, AssignmentAction::Complete) => Some(Completed),
            (status, AssignmentAction::Cancel) if !status.is_terminal() => Some(Cancelled),
            _ => None,
        }
    }
}

/// Last instant at which an assignment taken at `assigned_at` is on time.
pub fn due_at(assigned_at: DateTime<Utc>) -> DateTime<Utc> {
    assigned_at + Duration::days(REVIEW_WINDOW_DAYS)
}

/// Non-terminal assignments become overdue once the review window has passed.
pub fn is_overdue(status: AssignmentStatus, assigned_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    !status.is_terminal() && now > due_at(assigned_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assigned_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn happy_path() {
        let status = AssignmentStatus::Assigned;
        let status = status.apply(AssignmentAction::StartReading).unwrap();
        let status = status.apply(AssignmentAction::SubmitReview).unwrap();
        assert_eq!(status, AssignmentStatus::ReviewSubmitted);
        let status = status.apply(AssignmentAction::Complete).unwrap();
        assert_eq!(status, AssignmentStatus::Completed);
    }

    #[test]
    fn link_pending_detour() {
        let status = AssignmentStatus::Reading
            .apply(AssignmentAction::MarkLinkPending)
            .unwrap();
        assert_eq!(status, AssignmentStatus::LinkPending);
        assert_eq!(
            status.apply(AssignmentAction::SubmitReview),
            Some(AssignmentStatus::ReviewSubmitted)
        );
    }

    #[test]
    fn review_requires_reading_first() {
        assert_eq!(
            AssignmentStatus::Assigned.apply(AssignmentAction::SubmitReview),
            None
        );
        assert_eq!(
            AssignmentStatus::ReviewSubmitted.apply(AssignmentAction::SubmitReview),
            None
        );
    }

    #[test]
    fn cancel_only_from_non_terminal() {
        for status in AssignmentStatus::ALL {
            let cancelled = status.apply(AssignmentAction::Cancel);
            if status.is_terminal() {
                assert_eq!(cancelled, None);
            } else {
                assert_eq!(cancelled, Some(AssignmentStatus::Cancelled));
            }
        }
    }

    #[test]
    fn overdue_boundary() {
        let start = assigned_at();
        let due = due_at(start);
        assert!(!is_overdue(AssignmentStatus::Reading, start, due));
        assert!(is_overdue(
            AssignmentStatus::Reading,
            start,
            due + Duration::seconds(1)
        ));
        assert!(!is_overdue(
            AssignmentStatus::Assigned,
            start,
            start + Duration::days(4)
        ));
    }

    #[test]
    fn terminal_assignments_are_never_overdue() {
        let late = assigned_at() + Duration::days(30);
        assert!(!is_overdue(AssignmentStatus::Completed, assigned_at(), late));
        assert!(!is_overdue(AssignmentStatus::Cancelled, assigned_at(), late));
        assert!(is_overdue(AssignmentStatus::LinkPending, assigned_at(), late));
        assert!(is_overdue(AssignmentStatus::ReviewSubmitted, assigned_at(), late));
    }
}
