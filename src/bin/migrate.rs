// SPDX-License-Identifier: MIT

//! Migration toolkit: v1 (flat user documents) -> v2 (weekly submissions).
//!
//! Usage:
//!   migrate backup                      Export all data to a JSON file
//!   migrate check                       Summarize migration state
//!   migrate migrate [--execute]         Run the migration (dry run by default)
//!   migrate validate                    Audit the migrated data
//!   migrate fix-week OLD NEW [--execute] Rename a week id everywhere
//!
//! All mutating commands preview their changes unless --execute is given.
//! The migration never deletes v1 fields; re-running is safe.

use weekly_quiz::config::Config;
use weekly_quiz::db::FirestoreDb;
use weekly_quiz::migration::{
    build_check_report, plan_user_migration, question_needs_week_id, rename_submission,
    validate_question, validate_user, Backup, BackupUser, MigrationStats, WriteMode,
    LEGACY_WEEK_ID,
};
use weekly_quiz::models::{Submission, User};
use weekly_quiz::time_utils::{file_timestamp, now_rfc3339};
use weekly_quiz::week;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let execute = args.iter().any(|a| a == "--execute");
    let mode = if execute {
        WriteMode::execute()
    } else {
        WriteMode::dry_run()
    };

    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    // Store/credential failures here are fatal; everything later is
    // logged per record and processing continues.
    let config = Config::from_env()?;
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    println!("Migration tool: weekly quiz system");
    println!("  Project:        {}", config.gcp_project_id);
    println!("  Legacy week id: {}", LEGACY_WEEK_ID);
    println!();

    match command.as_str() {
        "backup" => backup(&db, &config.gcp_project_id).await?,
        "check" => check(&db).await?,
        "migrate" => migrate(&db, mode).await?,
        "validate" => {
            if !validate(&db).await? {
                std::process::exit(1);
            }
        }
        "fix-week" => {
            let (old_week, new_week) = match (args.get(1), args.get(2)) {
                (Some(old), Some(new)) if week::is_week_id(old) && week::is_week_id(new) => {
                    (old.clone(), new.clone())
                }
                _ => {
                    eprintln!("fix-week requires OLD and NEW week ids (YYYY-Www)");
                    std::process::exit(2);
                }
            };
            fix_week(&db, &old_week, &new_week, mode).await?;
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: migrate <backup|check|migrate|validate|fix-week OLD NEW> [--execute]");
    println!();
    println!("Recommended workflow:");
    println!("  1. migrate backup             create a backup first");
    println!("  2. migrate check              see current state");
    println!("  3. migrate migrate            preview the changes");
    println!("  4. migrate migrate --execute  apply the changes");
    println!("  5. migrate validate           confirm everything is correct");
}

/// Load every user together with their submissions subcollection.
/// Per-user read failures are logged and the user is skipped.
async fn load_users_with_submissions(
    db: &FirestoreDb,
) -> anyhow::Result<Vec<(User, Vec<Submission>)>> {
    let users = db.list_users().await?;
    let mut out = Vec::with_capacity(users.len());

    for user in users {
        match db.list_submissions_for_user(&user.user_id).await {
            Ok(submissions) => out.push((user, submissions)),
            Err(e) => {
                eprintln!("  ! Skipping {}: failed to read submissions: {}", user.user_id, e);
            }
        }
    }

    Ok(out)
}

// ─── backup ──────────────────────────────────────────────────

async fn backup(db: &FirestoreDb, project: &str) -> anyhow::Result<()> {
    println!("Starting backup...");

    let users = load_users_with_submissions(db).await?;
    let questions = db.list_questions().await?;

    let backup = Backup {
        backup_timestamp: now_rfc3339(),
        project: project.to_string(),
        users: users
            .into_iter()
            .map(|(user, submissions)| BackupUser { user, submissions })
            .collect(),
        questions,
    };

    let filename = format!("backup_{}_{}.json", project, file_timestamp());
    std::fs::write(&filename, serde_json::to_string_pretty(&backup)?)?;

    println!("Backup complete");
    println!("  {} users backed up", backup.users.len());
    println!("  {} questions backed up", backup.questions.len());
    println!("  Saved to: {}", filename);
    Ok(())
}

// ─── check ───────────────────────────────────────────────────

async fn check(db: &FirestoreDb) -> anyhow::Result<()> {
    let users = load_users_with_submissions(db).await?;
    let questions = db.list_questions().await?;
    let report = build_check_report(&users, &questions);

    println!("DATABASE CHECK");
    println!("--------------");
    println!("Users: {} total", report.total_users);
    println!("  with cumulative_score: {}", report.users_with_cumulative);
    println!("  submissions: {}", report.total_submissions);
    if report.submission_weeks.is_empty() {
        println!("  no submission documents found");
    } else {
        println!("  submission week ids:");
        for (week_id, count) in &report.submission_weeks {
            println!("    {}: {} submissions", week_id, count);
        }
    }
    println!("Questions: {} total", report.total_questions);
    for (week_id, count) in &report.question_weeks {
        println!("    {}: {} questions", week_id, count);
    }
    if report.questions_without_week > 0 {
        println!("  without week_id: {}", report.questions_without_week);
    }
    Ok(())
}

// ─── migrate ─────────────────────────────────────────────────

async fn migrate(db: &FirestoreDb, mode: WriteMode) -> anyhow::Result<()> {
    println!("{}: migration v1 -> v2", mode.label());
    println!("Legacy week id: {}", LEGACY_WEEK_ID);
    println!();

    let users = db.list_users().await?;
    let now = now_rfc3339();

    let mut stats = MigrationStats {
        total_users: users.len(),
        ..Default::default()
    };

    for user in &users {
        let Some(plan) = plan_user_migration(user, &now) else {
            println!("  - Skipping {}: already migrated", user.user_id);
            stats.already_migrated += 1;
            continue;
        };

        println!(
            "  * Migrating {} ({}) - score: {}",
            plan.user.name,
            plan.user.user_id,
            plan.user.cumulative_score.unwrap_or(0)
        );
        if plan.legacy_submission.is_some() {
            stats.submissions_created += 1;
        }

        let result = mode
            .apply("migrate user", || {
                db.apply_user_migration(&plan.user, plan.legacy_submission.as_ref())
            })
            .await;

        match result {
            Ok(()) => stats.users_migrated += 1,
            Err(e) => eprintln!("  ! Failed to migrate {}: {}", plan.user.user_id, e),
        }
    }

    println!();
    println!("Migrating questions...");
    for question in db.list_questions().await? {
        let Some(id) = question.id.clone() else {
            continue;
        };
        if !question_needs_week_id(&question) {
            println!("  - Skipping {}: already has week_id", id);
            continue;
        }

        println!("  * Assigning {} to {}", id, LEGACY_WEEK_ID);
        let result = mode
            .apply("assign question week", || {
                db.set_question_week_id(&id, LEGACY_WEEK_ID)
            })
            .await;

        match result {
            Ok(()) => stats.questions_migrated += 1,
            Err(e) => eprintln!("  ! Failed to update {}: {}", id, e),
        }
    }

    println!();
    println!("MIGRATION SUMMARY");
    println!("  Total users:         {}", stats.total_users);
    println!("  Already migrated:    {}", stats.already_migrated);
    println!("  Users migrated:      {}", stats.users_migrated);
    println!("  Submissions created: {}", stats.submissions_created);
    println!("  Questions migrated:  {}", stats.questions_migrated);
    print_dry_run_notice(mode);
    Ok(())
}

// ─── validate ────────────────────────────────────────────────

async fn validate(db: &FirestoreDb) -> anyhow::Result<bool> {
    println!("VALIDATING MIGRATION");
    println!("--------------------");

    let users = load_users_with_submissions(db).await?;
    println!("Checking {} users...", users.len());

    let mut issues = Vec::new();
    for (user, submissions) in &users {
        issues.extend(validate_user(user, submissions));
    }

    let questions = db.list_questions().await?;
    println!("Checking {} questions...", questions.len());
    for question in &questions {
        if let Some(id) = &question.id {
            issues.extend(validate_question(id, question));
        }
    }

    println!();
    println!("VALIDATION SUMMARY");
    println!("  Users checked:     {}", users.len());
    println!("  Questions checked: {}", questions.len());
    println!("  Issues found:      {}", issues.len());

    if issues.is_empty() {
        println!();
        println!("All validations passed.");
        Ok(true)
    } else {
        println!();
        println!("ISSUES DETECTED:");
        for issue in &issues {
            println!("  {}", issue);
        }
        Ok(false)
    }
}

// ─── fix-week ────────────────────────────────────────────────

async fn fix_week(
    db: &FirestoreDb,
    old_week: &str,
    new_week: &str,
    mode: WriteMode,
) -> anyhow::Result<()> {
    println!("{}: fix week ids", mode.label());
    println!("  Changing: {} -> {}", old_week, new_week);
    println!();

    let mut submissions_fixed = 0usize;
    let mut questions_fixed = 0usize;

    println!("Checking submissions...");
    for user in db.list_users().await? {
        let submission = match db.get_submission(&user.user_id, old_week).await {
            Ok(Some(submission)) => submission,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("  ! Skipping {}: {}", user.user_id, e);
                continue;
            }
        };

        println!("  * Fixing submission for {}", submission.user_name);
        let renamed = rename_submission(&submission, new_week);

        let result = mode
            .apply("rename submission", || async {
                // Copy first, delete after: a failure in between leaves
                // both documents rather than neither.
                db.set_submission(&user.user_id, &renamed).await?;
                db.delete_submission(&user.user_id, old_week).await
            })
            .await;

        match result {
            Ok(()) => submissions_fixed += 1,
            Err(e) => eprintln!("  ! Failed to fix {}: {}", user.user_id, e),
        }
    }

    println!("Checking questions...");
    for question in db.list_questions().await? {
        let Some(id) = question.id.clone() else {
            continue;
        };
        if question.week_id.as_deref() != Some(old_week) {
            continue;
        }

        println!("  * Fixing question {}", id);
        let result = mode
            .apply("fix question week", || db.set_question_week_id(&id, new_week))
            .await;

        match result {
            Ok(()) => questions_fixed += 1,
            Err(e) => eprintln!("  ! Failed to fix {}: {}", id, e),
        }
    }

    println!();
    println!("FIX SUMMARY");
    println!("  Submissions fixed: {}", submissions_fixed);
    println!("  Questions fixed:   {}", questions_fixed);
    print_dry_run_notice(mode);
    Ok(())
}

fn print_dry_run_notice(mode: WriteMode) {
    if !mode.commit {
        println!();
        println!("This was a DRY RUN. No changes were made.");
        println!("Run with --execute to apply changes.");
    }
}
