use std::collections::BTreeMap;

use super::domain::{InvalidInput, LanguageId, LessonId, LessonRecord, MasteryError, NotFound};

/// Per-language lesson records, kept in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStore {
    languages: BTreeMap<LanguageId, Vec<LessonRecord>>,
}

impl ProgressStore {
    pub fn contains_language(&self, language: &LanguageId) -> bool {
        self.languages.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguageId> {
        self.languages.keys()
    }

    /// Create default records for a language. Returns `false` and leaves the
    /// existing records untouched when the language is already present.
    pub fn materialize<I>(&mut self, language: &LanguageId, lessons: I) -> bool
    where
        I: IntoIterator<Item = LessonId>,
    {
        if self.contains_language(language) {
            return false;
        }
        let records = lessons.into_iter().map(LessonRecord::new).collect();
        self.languages.insert(language.clone(), records);
        true
    }

    pub(crate) fn insert_records(&mut self, language: LanguageId, records: Vec<LessonRecord>) {
        self.languages.insert(language, records);
    }

    pub fn records(&self, language: &LanguageId) -> Result<&[LessonRecord], NotFound> {
        self.languages
            .get(language)
            .map(Vec::as_slice)
            .ok_or_else(|| NotFound::Language(language.clone()))
    }

    pub fn get(&self, language: &LanguageId, lesson: &LessonId) -> Result<&LessonRecord, NotFound> {
        self.records(language)?
            .iter()
            .find(|record| &record.id == lesson)
            .ok_or_else(|| NotFound::Lesson {
                language: language.clone(),
                lesson: lesson.clone(),
            })
    }

    fn get_mut(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
    ) -> Result<&mut LessonRecord, NotFound> {
        self.languages
            .get_mut(language)
            .ok_or_else(|| NotFound::Language(language.clone()))?
            .iter_mut()
            .find(|record| &record.id == lesson)
            .ok_or_else(|| NotFound::Lesson {
                language: language.clone(),
                lesson: lesson.clone(),
            })
    }

    /// Record an attempt: progress keeps its best value, score and review flag
    /// always reflect the latest attempt.
    pub fn upsert_progress(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
        new_progress: u8,
        raw_score: u32,
        needs_review: bool,
    ) -> Result<&LessonRecord, MasteryError> {
        if new_progress > 100 {
            return Err(InvalidInput::ProgressOutOfRange(new_progress).into());
        }
        let record = self.get_mut(language, lesson)?;
        record.progress = record.progress.max(new_progress);
        record.last_score = Some(raw_score);
        record.needs_review = needs_review;
        Ok(record)
    }

    pub fn set_rating(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
        rating: u8,
    ) -> Result<&LessonRecord, MasteryError> {
        if !(1..=5).contains(&rating) {
            return Err(InvalidInput::RatingOutOfRange(rating).into());
        }
        let record = self.get_mut(language, lesson)?;
        record.rating = Some(rating);
        Ok(record)
    }

    /// Lessons whose latest attempt was imperfect, in catalog order.
    pub fn list_due_for_review(&self, language: &LanguageId) -> Result<Vec<&LessonRecord>, NotFound> {
        Ok(self
            .records(language)?
            .iter()
            .filter(|record| record.needs_review)
            .collect())
    }

    /// Records with full progress and nothing left to review, across all languages.
    pub fn mastered_count(&self) -> usize {
        self.languages
            .values()
            .flatten()
            .filter(|record| record.is_mastered())
            .count()
    }
}
