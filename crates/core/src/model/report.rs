use chrono::{DateTime, Utc};
use thiserror::Error;

/// Fixed pass threshold, inclusive: a score of exactly 75% passes.
pub const PASS_THRESHOLD_PCT: u32 = 75;

/// Integer percentage of `part` over `whole`, rounded to the nearest point.
/// Returns 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) * 100.0 / f64::from(whole)).round() as u32
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("answered ({answered}) exceeds total questions ({total})")]
    AnsweredExceedsTotal { answered: u32, total: u32 },

    #[error("correct ({correct}) exceeds answered ({answered})")]
    CorrectExceedsAnswered { correct: u32, answered: u32 },
}

/// Performance band for a completed test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    Outstanding,
    Great,
    Passed,
    Failed,
}

impl Grade {
    /// Band for a rounded score percentage.
    #[must_use]
    pub fn for_score_pct(pct: u32) -> Self {
        if pct >= 90 {
            Grade::Outstanding
        } else if pct >= 80 {
            Grade::Great
        } else if pct >= PASS_THRESHOLD_PCT {
            Grade::Passed
        } else {
            Grade::Failed
        }
    }
}

/// Aggregate result for a test session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    test_number: u32,
    total_questions: u32,
    answered: u32,
    correct: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl TestReport {
    /// Build a report from session counts.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when the counts are inconsistent or the time
    /// range is inverted.
    pub fn from_counts(
        test_number: u32,
        total_questions: u32,
        answered: u32,
        correct: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ReportError> {
        if completed_at < started_at {
            return Err(ReportError::InvalidTimeRange);
        }
        if answered > total_questions {
            return Err(ReportError::AnsweredExceedsTotal {
                answered,
                total: total_questions,
            });
        }
        if correct > answered {
            return Err(ReportError::CorrectExceedsAnswered { correct, answered });
        }

        Ok(Self {
            test_number,
            total_questions,
            answered,
            correct,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn test_number(&self) -> u32 {
        self.test_number
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Overall score: correct over total questions, rounded.
    #[must_use]
    pub fn score_pct(&self) -> u32 {
        percent(self.correct, self.total_questions)
    }

    /// Accuracy: correct over answered, rounded. 0 when nothing is answered.
    #[must_use]
    pub fn accuracy_pct(&self) -> u32 {
        percent(self.correct, self.answered)
    }

    /// Whether the score meets the inclusive pass threshold.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score_pct() >= PASS_THRESHOLD_PCT
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        Grade::for_score_pct(self.score_pct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn three_of_four_is_exactly_passing() {
        let now = fixed_now();
        let report = TestReport::from_counts(1, 4, 4, 3, now, now).unwrap();

        assert_eq!(report.score_pct(), 75);
        assert!(report.passed());
        assert_eq!(report.grade(), Grade::Passed);
    }

    #[test]
    fn below_threshold_fails() {
        let now = fixed_now();
        let report = TestReport::from_counts(1, 4, 4, 2, now, now).unwrap();

        assert_eq!(report.score_pct(), 50);
        assert!(!report.passed());
        assert_eq!(report.grade(), Grade::Failed);
    }

    #[test]
    fn accuracy_is_zero_when_nothing_answered() {
        let now = fixed_now();
        let report = TestReport::from_counts(1, 10, 0, 0, now, now).unwrap();

        assert_eq!(report.accuracy_pct(), 0);
        assert_eq!(report.score_pct(), 0);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn rejects_inconsistent_counts() {
        let now = fixed_now();
        assert_eq!(
            TestReport::from_counts(1, 4, 5, 0, now, now).unwrap_err(),
            ReportError::AnsweredExceedsTotal {
                answered: 5,
                total: 4
            }
        );
        assert_eq!(
            TestReport::from_counts(1, 4, 2, 3, now, now).unwrap_err(),
            ReportError::CorrectExceedsAnswered {
                correct: 3,
                answered: 2
            }
        );
        assert_eq!(
            TestReport::from_counts(1, 4, 0, 0, now, now - chrono::Duration::seconds(1))
                .unwrap_err(),
            ReportError::InvalidTimeRange
        );
    }

    #[test]
    fn grade_bands_follow_thresholds() {
        assert_eq!(Grade::for_score_pct(95), Grade::Outstanding);
        assert_eq!(Grade::for_score_pct(90), Grade::Outstanding);
        assert_eq!(Grade::for_score_pct(85), Grade::Great);
        assert_eq!(Grade::for_score_pct(75), Grade::Passed);
        assert_eq!(Grade::for_score_pct(74), Grade::Failed);
    }
}
