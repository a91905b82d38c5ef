use crate::infra::{InMemoryNotifier, InMemoryProfileRepository};
use clap::Args;
use lingua_mastery::error::AppError;
use lingua_mastery::mastery::{
    score_attempt, BadgeTable, LanguageId, LessonId, MasteryError, MasteryService, ProfileId,
    StaticLessonCatalog, UnlockedBadge, VocabRewardConfig,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Language the demo learner studies first
    #[arg(long, default_value = "es")]
    pub(crate) language: String,
    /// Second language used to show independent progress tracking
    #[arg(long, default_value = "fr")]
    pub(crate) second_language: String,
    /// Print the final profile snapshot as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RewardArgs {
    /// Correct answers in the quiz
    #[arg(long)]
    pub(crate) score: u32,
    /// Questions in the quiz
    #[arg(long)]
    pub(crate) total: u32,
}

pub(crate) fn run_reward(args: RewardArgs) -> Result<(), AppError> {
    let attempt = score_attempt(args.score, args.total).map_err(MasteryError::from)?;
    println!(
        "{}/{} -> +{} coins, +{} XP, progress {}%{}",
        attempt.score,
        attempt.total,
        attempt.reward.coins,
        attempt.reward.xp,
        attempt.progress,
        if attempt.is_perfect() {
            ""
        } else {
            " (marked for review)"
        }
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        language,
        second_language,
        json,
    } = args;
    let language = LanguageId(language);
    let second_language = LanguageId(second_language);

    let notifier = Arc::new(InMemoryNotifier::default());
    let service = MasteryService::new(
        Arc::new(InMemoryProfileRepository::default()),
        notifier.clone(),
        Arc::new(StaticLessonCatalog::standard()),
        Arc::new(BadgeTable::standard()),
        VocabRewardConfig::default(),
    );

    println!("Lingua mastery demo");
    let profile = service.create_profile(Some(ProfileId::from("demo-learner")))?;
    let id = profile.id;
    println!("- Created profile {id}");

    let selection = service.select_language(&id, &language)?;
    let lesson_count = service
        .snapshot(&id)?
        .progress
        .get(&language)
        .map(Vec::len)
        .unwrap_or_default();
    println!(
        "- Selected {} ({} lessons materialized)",
        selection.language, lesson_count
    );

    let l1 = LessonId::from("l1");
    let l2 = LessonId::from("l2");

    let perfect = service.complete_lesson(&id, &language, &l1, 10, 10)?;
    println!(
        "- {l1}: 10/10 -> +{} coins, +{} XP, progress {}%, review {}",
        perfect.reward.coins, perfect.reward.xp, perfect.record.progress, perfect.record.needs_review
    );
    print_unlocks(&perfect.unlocked_badges);

    let partial = service.complete_lesson(&id, &language, &l2, 3, 10)?;
    println!(
        "- {l2}: 3/10 -> +{} coins, +{} XP, progress {}%, review {}",
        partial.reward.coins, partial.reward.xp, partial.record.progress, partial.record.needs_review
    );

    let retry = service.complete_lesson(&id, &language, &l1, 5, 10)?;
    println!(
        "- {l1} retried at 5/10 -> progress stays {}%, review {}",
        retry.record.progress, retry.record.needs_review
    );

    let due: Vec<String> = service
        .due_for_review(&id, &language)?
        .into_iter()
        .map(|record| record.id.to_string())
        .collect();
    println!("- Due for review in {language}: {}", due.join(", "));

    let vocab = service.complete_vocab_session(&id, &language, &l1, None)?;
    println!("- Flashcards for {l1} -> +{} XP", vocab.xp_awarded);

    service.rate_lesson(&id, &language, &l2, 4)?;
    println!("- Rated {l2} 4/5");

    service.select_language(&id, &second_language)?;
    let snapshot = service.snapshot(&id)?;
    if let Some(untouched) = snapshot
        .progress
        .get(&second_language)
        .and_then(|records| records.first())
    {
        println!(
            "- Selected {second_language}; its {} sits at {}% while {language} keeps its own record",
            untouched.id, untouched.progress
        );
    }

    let streak = service.record_streak(&id, 10)?;
    println!("- Recorded a 10 day streak");
    print_unlocks(&streak);

    let snapshot = service.snapshot(&id)?;
    let aggregate = &snapshot.aggregate;
    println!(
        "\nTotals: {} coins | {} XP | {} lessons completed | {} perfect | {} languages",
        aggregate.coins,
        aggregate.xp,
        aggregate.completed_lesson_count,
        aggregate.perfect_score_count,
        aggregate.studied_languages.len()
    );
    println!("Badges:");
    for badge in &snapshot.badges {
        let mark = if badge.unlocked { "x" } else { " " };
        println!("  [{mark}] {} {} ({})", badge.icon, badge.name, badge.requirement);
    }
    println!("Daily goals:");
    for goal in &snapshot.daily_goals {
        println!(
            "  {} {} {}/{}{}",
            goal.icon,
            goal.title,
            goal.current,
            goal.target,
            if goal.completed { " done" } else { "" }
        );
    }
    println!("Notifications published: {}", notifier.events().len());

    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("\n{json}"),
            Err(err) => println!("\nSnapshot unavailable: {err}"),
        }
    }

    Ok(())
}

fn print_unlocks(badges: &[UnlockedBadge]) {
    for badge in badges {
        println!("  unlocked {} {}", badge.icon, badge.name);
    }
}
