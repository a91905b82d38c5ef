use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::InvalidInput;

const COIN_SCALE: u64 = 50;
const COIN_BASE: u64 = 10;
const XP_SCALE: u64 = 100;
const XP_BASE: u64 = 20;

/// Currency and experience granted for one completed attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub coins: u64,
    pub xp: u64,
}

/// Everything derived from a single `(score, total)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAttempt {
    pub score: u32,
    pub total: u32,
    pub reward: Reward,
    pub progress: u8,
}

impl ScoredAttempt {
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}

pub fn validate_attempt(score: u32, total: u32) -> Result<(), InvalidInput> {
    if total == 0 {
        return Err(InvalidInput::EmptyTotal);
    }
    if score > total {
        return Err(InvalidInput::ScoreExceedsTotal { score, total });
    }
    Ok(())
}

/// `round(score / total * scale)` with ties rounded away from zero.
///
/// Integer form of `floor(x + 1/2)`, so 0.3 * 50 is exactly 15.
fn scaled_ratio(score: u32, total: u32, scale: u64) -> u64 {
    let numerator = u64::from(score) * scale;
    let total = u64::from(total);
    (2 * numerator + total) / (2 * total)
}

/// `coins = round(ratio * 50) + 10`, `xp = round(ratio * 100) + 20`.
pub fn compute_reward(score: u32, total: u32) -> Result<Reward, InvalidInput> {
    validate_attempt(score, total)?;
    Ok(Reward {
        coins: scaled_ratio(score, total, COIN_SCALE) + COIN_BASE,
        xp: scaled_ratio(score, total, XP_SCALE) + XP_BASE,
    })
}

/// Percentage mastery shown by this attempt, rounded like the reward.
pub fn progress_percent(score: u32, total: u32) -> Result<u8, InvalidInput> {
    validate_attempt(score, total)?;
    // score <= total bounds this to 100
    Ok(scaled_ratio(score, total, 100) as u8)
}

pub fn score_attempt(score: u32, total: u32) -> Result<ScoredAttempt, InvalidInput> {
    let reward = compute_reward(score, total)?;
    let progress = progress_percent(score, total)?;
    debug!(score, total, coins = reward.coins, xp = reward.xp, progress, "scored attempt");
    Ok(ScoredAttempt {
        score,
        total,
        reward,
        progress,
    })
}

/// XP constants for flashcard sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRewardConfig {
    pub xp_per_term: u64,
    pub session_bonus: u64,
}

impl Default for VocabRewardConfig {
    fn default() -> Self {
        Self {
            xp_per_term: 5,
            session_bonus: 10,
        }
    }
}

impl VocabRewardConfig {
    pub fn session_xp(&self, term_count: u32) -> Result<u64, InvalidInput> {
        if term_count == 0 {
            return Err(InvalidInput::EmptyVocabSession);
        }
        Ok(self
            .xp_per_term
            .saturating_mul(u64::from(term_count))
            .saturating_add(self.session_bonus))
    }
}
