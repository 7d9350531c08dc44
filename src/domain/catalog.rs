//! Catalog rules: review pricing and the book status workflow.

use super::choices::{BookStatus, ReadingType};

impl ReadingType {
    /// Stars debited from the author when reviews are requested.
    pub fn stars_cost(self) -> i32 {
        match self {
            ReadingType::Standard => 100,
            ReadingType::KindleUnlimited => 150,
            ReadingType::VerifiedEbook => 200,
            ReadingType::VerifiedPrint => 250,
        }
    }

    /// Only print reviews collect a print link/price and photo/video options.
    pub fn is_print(self) -> bool {
        matches!(self, ReadingType::VerifiedPrint)
    }
}

/// An action moving a book through the catalog workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAction {
    SubmitForModeration,
    Approve,
    Reject,
    Cancel,
}

impl BookAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BookAction::SubmitForModeration => "submit for moderation",
            BookAction::Approve => "approve",
            BookAction::Reject => "reject",
            BookAction::Cancel => "cancel",
        }
    }
}

impl BookStatus {
    /// Status reached by applying `action`, or `None` if not allowed from here.
    pub fn apply(self, action: BookAction) -> Option<BookStatus> {
        use BookStatus::*;
        match (self, action) {
            (Draft | Rejected, BookAction::SubmitForModeration) => Some(Moderation),
            (Moderation, BookAction::Approve) => Some(Live),
            (Moderation, BookAction::Reject) => Some(Rejected),
            (Canceled, BookAction::Cancel) => None,
            (_, BookAction::Cancel) => Some(Canceled),
            _ => None,
        }
    }

    pub fn is_live(self) -> bool {
        self == BookStatus::Live
    }
}
