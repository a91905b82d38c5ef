use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::NotFound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    LessonsCompleted,
    XpEarned,
    /// Advanced explicitly by the caller (e.g. minutes of chat practice).
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoal {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub kind: GoalKind,
    pub target: u64,
    pub current: u64,
    pub completed: bool,
}

impl DailyGoal {
    fn new(id: &str, title: &str, icon: &str, kind: GoalKind, target: u64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            kind,
            target,
            current: 0,
            completed: false,
        }
    }

    fn advance(&mut self, amount: u64) {
        self.current = self.current.saturating_add(amount).min(self.target);
        self.completed = self.current >= self.target;
    }

    fn reset(&mut self) {
        self.current = 0;
        self.completed = false;
    }
}

/// Goals for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalBoard {
    pub date: Option<NaiveDate>,
    pub goals: Vec<DailyGoal>,
}

impl Default for DailyGoalBoard {
    fn default() -> Self {
        Self::standard()
    }
}

impl DailyGoalBoard {
    pub fn standard() -> Self {
        Self {
            date: None,
            goals: vec![
                DailyGoal::new("g1", "Complete 1 Lesson", "📚", GoalKind::LessonsCompleted, 1),
                DailyGoal::new("g2", "Practice Chat for 5 mins", "💬", GoalKind::Manual, 1),
                DailyGoal::new("g3", "Earn 100 XP", "⚡", GoalKind::XpEarned, 100),
            ],
        }
    }

    /// Reset progress when `today` is a later day than the board's date.
    /// Returns `true` when a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        match self.date {
            Some(date) if date >= today => false,
            Some(_) => {
                self.goals.iter_mut().for_each(DailyGoal::reset);
                self.date = Some(today);
                true
            }
            None => {
                self.date = Some(today);
                false
            }
        }
    }

    pub(crate) fn record_lesson(&mut self, xp: u64) {
        for goal in &mut self.goals {
            match goal.kind {
                GoalKind::LessonsCompleted => goal.advance(1),
                GoalKind::XpEarned => goal.advance(xp),
                GoalKind::Manual => {}
            }
        }
    }

    pub fn advance_manual(&mut self, goal_id: &str, amount: u64) -> Result<&DailyGoal, NotFound> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.id == goal_id && goal.kind == GoalKind::Manual)
            .ok_or_else(|| NotFound::Goal(goal_id.to_string()))?;
        goal.advance(amount);
        Ok(goal)
    }

    pub fn completed_count(&self) -> usize {
        self.goals.iter().filter(|goal| goal.completed).count()
    }
}
