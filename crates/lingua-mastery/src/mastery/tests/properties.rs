use super::common::*;
use proptest::prelude::*;

use crate::mastery::domain::{LanguageId, LessonId};
use crate::mastery::{compute_reward, progress_percent, LearnerProfile};

#[derive(Debug, Clone)]
enum Operation {
    Select(&'static str),
    Complete {
        language: &'static str,
        lesson: u8,
        score: u32,
        total: u32,
    },
    Vocab {
        language: &'static str,
        lesson: u8,
        terms: u32,
    },
    Rate {
        language: &'static str,
        lesson: u8,
        rating: u8,
    },
    Streak(u32),
}

fn arb_language() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("es"), Just("fr"), Just("de"), Just("ja")]
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        arb_language().prop_map(Operation::Select),
        (arb_language(), 1u8..8, 0u32..25, 0u32..20).prop_map(
            |(language, lesson, score, total)| Operation::Complete {
                language,
                lesson,
                score,
                total,
            }
        ),
        (arb_language(), 1u8..8, 0u32..6).prop_map(|(language, lesson, terms)| {
            Operation::Vocab {
                language,
                lesson,
                terms,
            }
        }),
        (arb_language(), 1u8..8, 0u8..7).prop_map(|(language, lesson, rating)| {
            Operation::Rate {
                language,
                lesson,
                rating,
            }
        }),
        (0u32..15).prop_map(Operation::Streak),
    ]
}

fn apply(profile: &mut LearnerProfile, operation: &Operation) {
    let lesson_id = |lesson: u8| LessonId(format!("l{lesson}"));
    // Rejected operations are part of the sequence; their errors are ignored.
    let _ = match operation {
        Operation::Select(language) => profile
            .select_language(&LanguageId::from(*language), catalog().as_ref())
            .map(|_| ()),
        Operation::Complete {
            language,
            lesson,
            score,
            total,
        } => profile
            .complete_lesson(&LanguageId::from(*language), &lesson_id(*lesson), *score, *total)
            .map(|_| ()),
        Operation::Vocab {
            language,
            lesson,
            terms,
        } => profile
            .complete_vocab_session(&LanguageId::from(*language), &lesson_id(*lesson), *terms)
            .map(|_| ()),
        Operation::Rate {
            language,
            lesson,
            rating,
        } => profile
            .rate_lesson(&LanguageId::from(*language), &lesson_id(*lesson), *rating)
            .map(|_| ()),
        Operation::Streak(days) => {
            profile.record_streak(*days);
            Ok(())
        }
    };
}

proptest! {
    #[test]
    fn prop_reward_is_deterministic_and_bounded(total in 1u32..=u32::MAX, seed in any::<u32>()) {
        let score = (seed % total.saturating_add(1)).min(total);
        let first = compute_reward(score, total).expect("valid attempt");
        let second = compute_reward(score, total).expect("valid attempt");
        prop_assert_eq!(first, second);
        prop_assert!((10..=60).contains(&first.coins));
        prop_assert!((20..=120).contains(&first.xp));
        prop_assert!(progress_percent(score, total).expect("valid attempt") <= 100);
    }

    #[test]
    fn prop_perfect_attempts_never_need_review(total in 1u32..50, lesson in 1u8..8) {
        let mut profile = spanish_profile();
        let lesson = LessonId(format!("l{lesson}"));
        profile.complete_lesson(&es(), &lesson, 0, total).expect("first attempt");
        let completion = profile.complete_lesson(&es(), &lesson, total, total).expect("perfect");
        prop_assert!(!completion.record.needs_review);
        prop_assert_eq!(completion.record.progress, 100);
    }

    #[test]
    fn prop_imperfect_attempts_always_need_review(total in 2u32..50, gap in 1u32..50) {
        let mut profile = spanish_profile();
        let score = total.saturating_sub(gap.min(total));
        profile.complete_lesson(&es(), &lesson("l1"), total, total).expect("perfect");
        let completion = profile.complete_lesson(&es(), &lesson("l1"), score, total).expect("imperfect");
        prop_assert!(completion.record.needs_review);
        prop_assert_eq!(completion.record.progress, 100);
    }

    #[test]
    fn prop_state_only_moves_forward(operations in prop::collection::vec(arb_operation(), 1..40)) {
        let mut profile = fresh_profile();
        for operation in &operations {
            let before = profile.snapshot();
            apply(&mut profile, operation);
            let after = profile.snapshot();

            prop_assert!(after.aggregate.coins >= before.aggregate.coins);
            prop_assert!(after.aggregate.xp >= before.aggregate.xp);
            prop_assert!(
                after.aggregate.completed_lesson_count >= before.aggregate.completed_lesson_count
            );
            prop_assert!(after
                .aggregate
                .studied_languages
                .is_superset(&before.aggregate.studied_languages));

            for (old, new) in before.badges.iter().zip(&after.badges) {
                prop_assert!(!old.unlocked || new.unlocked, "badge {} locked again", old.id);
            }

            for (language, records) in &before.progress {
                let current = &after.progress[language];
                prop_assert_eq!(records.len(), current.len());
                for (old, new) in records.iter().zip(current) {
                    prop_assert!(new.progress >= old.progress);
                }
            }
        }
    }
}
