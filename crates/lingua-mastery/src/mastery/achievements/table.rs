use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::requirement::{BadgeRequirement, RequirementError};
use crate::mastery::domain::BadgeId;

/// Static display metadata and unlock rule of one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: BadgeRequirement,
}

/// Row layout of a badge table CSV; the requirement uses `kind:threshold`.
#[derive(Debug, Deserialize)]
struct BadgeRow {
    id: String,
    name: String,
    description: String,
    #[serde(default)]
    icon: String,
    requirement: String,
}

/// Load-time failures of the badge table. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum BadgeConfigError {
    #[error("badge '{badge}' has an invalid requirement: {source}")]
    Requirement {
        badge: BadgeId,
        #[source]
        source: RequirementError,
    },
    #[error("duplicate badge id '{0}'")]
    DuplicateId(BadgeId),
    #[error("badge table is empty")]
    EmptyTable,
    #[error("badge table could not be parsed: {0}")]
    Csv(#[from] csv::Error),
    #[error("badge table could not be opened: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, validated set of badge definitions shared by every learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeTable {
    definitions: Vec<BadgeDefinition>,
}

impl BadgeTable {
    pub fn new(definitions: Vec<BadgeDefinition>) -> Result<Self, BadgeConfigError> {
        if definitions.is_empty() {
            return Err(BadgeConfigError::EmptyTable);
        }
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.id.clone()) {
                return Err(BadgeConfigError::DuplicateId(definition.id.clone()));
            }
        }
        Ok(Self { definitions })
    }

    /// The stock badges, in evaluation order.
    pub fn standard() -> Self {
        let badge = |id: &str, name: &str, description: &str, icon: &str, requirement| {
            BadgeDefinition {
                id: BadgeId::from(id),
                name: name.to_string(),
                description: description.to_string(),
                icon: icon.to_string(),
                requirement,
            }
        };

        Self {
            definitions: vec![
                badge(
                    "b1",
                    "First Word",
                    "Complete your first lesson",
                    "🌱",
                    BadgeRequirement::Lessons(1),
                ),
                badge(
                    "b2",
                    "Coin Collector",
                    "Earn 3000 coins",
                    "💰",
                    BadgeRequirement::Coins(3000),
                ),
                badge(
                    "b3",
                    "Streak Master",
                    "Maintain a 10 day streak",
                    "🔥",
                    BadgeRequirement::Streak(10),
                ),
                badge(
                    "b4",
                    "Perfect Score",
                    "Get 100% on any quiz",
                    "🎯",
                    BadgeRequirement::Perfect(1),
                ),
                badge(
                    "b5",
                    "Polyglot",
                    "Study 3 different languages",
                    "🌍",
                    BadgeRequirement::Langs(3),
                ),
            ],
        }
    }

    /// Read `id,name,description,icon,requirement` rows with a header line.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BadgeConfigError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut definitions = Vec::new();
        for row in csv_reader.deserialize::<BadgeRow>() {
            let row = row?;
            let id = BadgeId(row.id);
            let requirement = row
                .requirement
                .parse::<BadgeRequirement>()
                .map_err(|source| BadgeConfigError::Requirement {
                    badge: id.clone(),
                    source,
                })?;
            definitions.push(BadgeDefinition {
                id,
                name: row.name,
                description: row.description,
                icon: row.icon,
                requirement,
            });
        }
        Self::new(definitions)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BadgeConfigError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, id: &BadgeId) -> Option<&BadgeDefinition> {
        self.definitions.iter().find(|definition| &definition.id == id)
    }

    pub(crate) fn position(&self, id: &BadgeId) -> Option<usize> {
        self.definitions
            .iter()
            .position(|definition| &definition.id == id)
    }
}
