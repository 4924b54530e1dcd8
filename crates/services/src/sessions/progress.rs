use std::collections::BTreeSet;

use exam_core::model::{OptionLabel, Question, percent};

/// Aggregated view of session progress, useful for UI.
///
/// All figures are derived from the answers map on demand; nothing here is
/// stored authoritatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Accuracy over answered questions, rounded. 0 when nothing is answered.
    #[must_use]
    pub fn accuracy_pct(&self) -> u32 {
        percent(clamp_u32(self.correct), clamp_u32(self.answered))
    }

    /// Overall score over all questions in the session, rounded.
    #[must_use]
    pub fn score_pct(&self) -> u32 {
        percent(clamp_u32(self.correct), clamp_u32(self.total))
    }
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// A missed question paired with the labels the user submitted, for the
/// review report. Preserves original question order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedAnswer {
    pub question: Question,
    pub selected: BTreeSet<OptionLabel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_zero_with_no_answers() {
        let progress = SessionProgress {
            total: 10,
            answered: 0,
            correct: 0,
            remaining: 10,
            is_complete: false,
        };
        assert_eq!(progress.accuracy_pct(), 0);
        assert_eq!(progress.score_pct(), 0);
    }

    #[test]
    fn accuracy_and_score_round_to_nearest() {
        let progress = SessionProgress {
            total: 4,
            answered: 3,
            correct: 2,
            remaining: 1,
            is_complete: false,
        };
        assert_eq!(progress.accuracy_pct(), 67);
        assert_eq!(progress.score_pct(), 50);
    }
}
