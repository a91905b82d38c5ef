/// Decides whether a lesson should be queued for review after an attempt.
pub trait ReviewPolicy: Send + Sync {
    fn needs_review(&self, score: u32, total: u32) -> bool;
}

/// Review is owed whenever the latest attempt was imperfect.
///
/// There is no interval scheduling: a perfect retry clears the flag, anything
/// less sets it again regardless of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryReviewPolicy;

impl ReviewPolicy for BinaryReviewPolicy {
    fn needs_review(&self, score: u32, total: u32) -> bool {
        score < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_perfect_attempts_clear_review() {
        let policy = BinaryReviewPolicy;
        assert!(!policy.needs_review(10, 10));
        assert!(policy.needs_review(9, 10));
        assert!(policy.needs_review(0, 1));
    }
}
