//! Lesson and language catalogs.
//!
//! Catalog content is opaque input: the engine only needs the ordered lesson
//! ids of a language to materialize its progress records. Titles, categories
//! and vocabulary are carried along for filtering and flashcard sizing.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{LanguageId, LessonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(CatalogError::UnknownDifficulty(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDescriptor {
    pub id: LessonId,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub vocabulary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDescriptor {
    pub id: LanguageId,
    pub name: String,
    pub native_name: String,
}

/// Source of the lesson list a language starts with.
pub trait LessonCatalog: Send + Sync {
    /// Ordered lessons of a language, `None` when the language is unknown.
    fn lessons_for(&self, language: &LanguageId) -> Option<Vec<LessonDescriptor>>;

    fn languages(&self) -> Vec<LanguageDescriptor>;

    fn describe(&self, language: &LanguageId, lesson: &LessonId) -> Option<LessonDescriptor> {
        self.lessons_for(language)?
            .into_iter()
            .find(|descriptor| &descriptor.id == lesson)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
    #[error("duplicate lesson id '{0}'")]
    DuplicateLesson(LessonId),
    #[error("catalog has no lessons")]
    Empty,
    #[error("catalog could not be parsed: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog could not be read: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct LessonRow {
    id: String,
    title: String,
    category: String,
    difficulty: String,
    #[serde(default)]
    vocabulary: String,
}

/// One shared lesson template offered for every supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLessonCatalog {
    languages: Vec<LanguageDescriptor>,
    lessons: Vec<LessonDescriptor>,
}

const CATEGORIES: [&str; 10] = [
    "Travel",
    "Food",
    "Social",
    "Nature",
    "Business",
    "Technology",
    "Hobbies",
    "Shopping",
    "Emotions",
    "Education",
];

const DIFFICULTIES: [Difficulty; 3] = [
    Difficulty::Beginner,
    Difficulty::Intermediate,
    Difficulty::Advanced,
];

const LANGUAGES: [(&str, &str, &str); 24] = [
    ("th", "Thai", "ภาษาไทย"),
    ("es", "Spanish", "Español"),
    ("fr", "French", "Français"),
    ("de", "German", "Deutsch"),
    ("jp", "Japanese", "日本語"),
    ("vi", "Vietnamese", "Tiếng Việt"),
    ("ua", "Ukrainian", "Українська"),
    ("se", "Swedish", "Svenska"),
    ("ru", "Russian", "Русский"),
    ("pt-pt", "Portuguese (PT)", "Português"),
    ("pt-br", "Portuguese (BR)", "Português"),
    ("pl", "Polish", "Polski"),
    ("no", "Norwegian", "Norsk"),
    ("ko", "Korean", "한국어"),
    ("it", "Italian", "Italiano"),
    ("id", "Indonesian", "Bahasa Indonesia"),
    ("hi", "Hindi", "हिन्दी"),
    ("he", "Hebrew", "עברית"),
    ("gr", "Greek", "Ελληνικά"),
    ("eo", "Esperanto", "Esperanto"),
    ("en-us", "English (US)", "English"),
    ("ar", "Arabic", "العربية"),
    ("zh", "Chinese (Simplified)", "简体中文"),
    ("nl", "Dutch", "Nederlands"),
];

impl StaticLessonCatalog {
    pub fn new(
        languages: Vec<LanguageDescriptor>,
        lessons: Vec<LessonDescriptor>,
    ) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for lesson in &lessons {
            if !seen.insert(lesson.id.clone()) {
                return Err(CatalogError::DuplicateLesson(lesson.id.clone()));
            }
        }
        Ok(Self { languages, lessons })
    }

    /// Default languages with six hand-written lessons followed by fifty
    /// generated topic modules (`l1`..`l56`).
    pub fn standard() -> Self {
        let languages = Self::standard_languages();

        let mut lessons = vec![
            template_lesson(
                "l1",
                "Greetings & Basics",
                "Essential",
                Difficulty::Beginner,
                &["Hello", "Thank you", "Sorry"],
            ),
            template_lesson(
                "l2",
                "Food & Drinks",
                "Daily Life",
                Difficulty::Beginner,
                &["Eat", "Water", "Delicious"],
            ),
            template_lesson(
                "l3",
                "Numbers 1-100",
                "Basics",
                Difficulty::Beginner,
                &["One", "Ten", "Hundred"],
            ),
            template_lesson(
                "l4",
                "Asking for Directions",
                "Travel",
                Difficulty::Intermediate,
                &["Turn left", "Go straight", "Where"],
            ),
            template_lesson(
                "l5",
                "At the Doctor",
                "Emergency",
                Difficulty::Intermediate,
                &["Pain", "Medicine", "Well"],
            ),
            template_lesson(
                "l6",
                "Business Culture",
                "Formal",
                Difficulty::Advanced,
                &["Meeting", "Company", "Contract"],
            ),
        ];

        for index in 7..=56usize {
            let category = CATEGORIES[index % CATEGORIES.len()];
            lessons.push(LessonDescriptor {
                id: LessonId(format!("l{index}")),
                title: format!("{category} Module {}", index / CATEGORIES.len() + 1),
                category: category.to_string(),
                difficulty: DIFFICULTIES[index % DIFFICULTIES.len()],
                vocabulary: vec![
                    format!("WordA{index}"),
                    format!("WordB{index}"),
                    format!("WordC{index}"),
                ],
            });
        }

        Self { languages, lessons }
    }

    /// The built-in language list, shared by every catalog loaded from disk.
    pub fn standard_languages() -> Vec<LanguageDescriptor> {
        LANGUAGES
            .iter()
            .map(|(id, name, native_name)| LanguageDescriptor {
                id: LanguageId::from(*id),
                name: name.to_string(),
                native_name: native_name.to_string(),
            })
            .collect()
    }

    pub fn from_path<P: AsRef<Path>>(
        languages: Vec<LanguageDescriptor>,
        path: P,
    ) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_csv_reader(languages, file)
    }

    /// Read `id,title,category,difficulty,vocabulary` rows; vocabulary terms
    /// are separated by `|`.
    pub fn from_csv_reader<R: Read>(
        languages: Vec<LanguageDescriptor>,
        reader: R,
    ) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut lessons = Vec::new();
        for row in csv_reader.deserialize::<LessonRow>() {
            let row = row?;
            lessons.push(LessonDescriptor {
                id: LessonId(row.id),
                title: row.title,
                category: row.category,
                difficulty: row.difficulty.parse()?,
                vocabulary: row
                    .vocabulary
                    .split('|')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_string)
                    .collect(),
            });
        }
        Self::new(languages, lessons)
    }
}

fn template_lesson(
    id: &str,
    title: &str,
    category: &str,
    difficulty: Difficulty,
    vocabulary: &[&str],
) -> LessonDescriptor {
    LessonDescriptor {
        id: LessonId::from(id),
        title: title.to_string(),
        category: category.to_string(),
        difficulty,
        vocabulary: vocabulary.iter().map(|word| word.to_string()).collect(),
    }
}

impl LessonCatalog for StaticLessonCatalog {
    fn lessons_for(&self, language: &LanguageId) -> Option<Vec<LessonDescriptor>> {
        self.languages
            .iter()
            .any(|descriptor| &descriptor.id == language)
            .then(|| self.lessons.clone())
    }

    fn languages(&self) -> Vec<LanguageDescriptor> {
        self.languages.clone()
    }
}

/// Dashboard-style lesson filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LessonFilter {
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

impl LessonFilter {
    pub fn matches(&self, lesson: &LessonDescriptor) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                lesson.title.to_lowercase().contains(&term)
                    || lesson.category.to_lowercase().contains(&term)
            }
        };
        let difficulty_ok = self
            .difficulty
            .map(|difficulty| difficulty == lesson.difficulty)
            .unwrap_or(true);
        let category_ok = self
            .category
            .as_deref()
            .map(|category| category == lesson.category)
            .unwrap_or(true);
        search_ok && difficulty_ok && category_ok
    }
}
