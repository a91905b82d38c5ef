mod requirement;
mod table;

pub use requirement::{BadgeRequirement, RequirementError};
pub use table::{BadgeConfigError, BadgeDefinition, BadgeTable};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{BadgeId, LearnerAggregate};

/// Per-learner lock state of every badge in a shared table.
///
/// Badges only move from locked to unlocked; nothing in this type can lock
/// a badge again.
#[derive(Debug, Clone)]
pub struct AchievementEngine {
    table: Arc<BadgeTable>,
    unlocked: Vec<bool>,
}

/// A badge that flipped to unlocked during one re-evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedBadge {
    pub id: BadgeId,
    pub name: String,
    pub icon: String,
}

/// Persisted lock state of a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeState {
    pub id: BadgeId,
    pub unlocked: bool,
}

/// Read-only badge view combining metadata with the learner's lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeStatus {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: String,
    pub unlocked: bool,
}

impl AchievementEngine {
    pub fn new(table: Arc<BadgeTable>) -> Self {
        let unlocked = vec![false; table.len()];
        Self { table, unlocked }
    }

    /// Rebuild lock state from persisted badges. Ids missing from the table
    /// are dropped; table entries missing from the states start locked.
    pub fn restore<'a, I>(table: Arc<BadgeTable>, states: I) -> Self
    where
        I: IntoIterator<Item = &'a BadgeState>,
    {
        let mut engine = Self::new(table);
        for state in states {
            match engine.table.position(&state.id) {
                Some(index) => engine.unlocked[index] |= state.unlocked,
                None => warn!(badge = %state.id, "dropping stored badge missing from badge table"),
            }
        }
        engine
    }

    /// Unlock every locked badge whose requirement now holds, in table order.
    /// Each badge is reported exactly once, on the call that unlocks it.
    pub fn reevaluate(&mut self, aggregate: &LearnerAggregate) -> Vec<UnlockedBadge> {
        let mut newly_unlocked = Vec::new();
        for (definition, unlocked) in self.table.iter().zip(self.unlocked.iter_mut()) {
            if *unlocked || !definition.requirement.is_met(aggregate) {
                continue;
            }
            *unlocked = true;
            info!(badge = %definition.id, requirement = %definition.requirement, "badge unlocked");
            newly_unlocked.push(UnlockedBadge {
                id: definition.id.clone(),
                name: definition.name.clone(),
                icon: definition.icon.clone(),
            });
        }
        newly_unlocked
    }

    pub fn is_unlocked(&self, id: &BadgeId) -> bool {
        self.table
            .position(id)
            .map(|index| self.unlocked[index])
            .unwrap_or(false)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.iter().filter(|unlocked| **unlocked).count()
    }

    pub fn states(&self) -> Vec<BadgeState> {
        self.table
            .iter()
            .zip(&self.unlocked)
            .map(|(definition, unlocked)| BadgeState {
                id: definition.id.clone(),
                unlocked: *unlocked,
            })
            .collect()
    }

    pub fn badges(&self) -> Vec<BadgeStatus> {
        self.table
            .iter()
            .zip(&self.unlocked)
            .map(|(definition, unlocked)| BadgeStatus {
                id: definition.id.clone(),
                name: definition.name.clone(),
                description: definition.description.clone(),
                icon: definition.icon.clone(),
                requirement: definition.requirement.to_string(),
                unlocked: *unlocked,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mastery::domain::LanguageId;

    fn engine() -> AchievementEngine {
        AchievementEngine::new(Arc::new(BadgeTable::standard()))
    }

    #[test]
    fn unlocks_fire_once_in_table_order() {
        let mut engine = engine();
        let mut aggregate = LearnerAggregate {
            completed_lesson_count: 1,
            coins: 5000,
            ..LearnerAggregate::default()
        };

        let first = engine.reevaluate(&aggregate);
        let ids: Vec<&str> = first.iter().map(|badge| badge.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);

        assert!(engine.reevaluate(&aggregate).is_empty());

        aggregate.streak_days = 10;
        let second = engine.reevaluate(&aggregate);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, BadgeId::from("b3"));
    }

    #[test]
    fn unlocked_badges_survive_falling_statistics() {
        let mut engine = engine();
        let mut aggregate = LearnerAggregate {
            streak_days: 12,
            ..LearnerAggregate::default()
        };
        engine.reevaluate(&aggregate);
        assert!(engine.is_unlocked(&BadgeId::from("b3")));

        aggregate.streak_days = 0;
        assert!(engine.reevaluate(&aggregate).is_empty());
        assert!(engine.is_unlocked(&BadgeId::from("b3")));
    }

    #[test]
    fn polyglot_counts_distinct_languages() {
        let mut engine = engine();
        let mut aggregate = LearnerAggregate::default();
        for language in ["es", "fr", "es", "de"] {
            aggregate
                .studied_languages
                .insert(LanguageId::from(language));
            engine.reevaluate(&aggregate);
        }
        assert!(engine.is_unlocked(&BadgeId::from("b5")));
        assert_eq!(engine.unlocked_count(), 1);
    }

    #[test]
    fn restore_ignores_unknown_badges() {
        let table = Arc::new(BadgeTable::standard());
        let stored = vec![
            BadgeState {
                id: BadgeId::from("b2"),
                unlocked: true,
            },
            BadgeState {
                id: BadgeId::from("retired"),
                unlocked: true,
            },
        ];
        let engine = AchievementEngine::restore(table, &stored);
        assert!(engine.is_unlocked(&BadgeId::from("b2")));
        assert!(!engine.is_unlocked(&BadgeId::from("retired")));
        assert_eq!(engine.states().len(), 5);
        assert_eq!(engine.unlocked_count(), 1);
    }

    #[test]
    fn badge_views_expose_metadata() {
        let engine = engine();
        let badges = engine.badges();
        assert_eq!(badges[1].name, "Coin Collector");
        assert_eq!(badges[1].requirement, "coins:3000");
        assert!(badges.iter().all(|badge| !badge.unlocked));
    }
}
