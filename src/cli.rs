use clap::{Parser, Subcommand};
use rand::rngs::ThreadRng;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;
use thiserror::Error;

use crate::assessments::{
    self, BDEFS_QUESTIONS, BDEFS_SCALE, STROOP_DEFAULT_TRIALS, StroopOutcome,
};
use crate::config::{self, AppConfig, ConfigError};
use crate::database::{Database, DatabaseError};
use crate::encouragement::{self, Nudges};
use crate::models::{AssessmentType, TaskStatus, TimerConfig};
use crate::timer;
use crate::utils::Profile;

#[derive(Parser)]
#[command(name = "momentum")]
#[command(about = "A gentle tool to help you get things done, one small step at a time")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        /// What do you need to do?
        title: String,
    },
    /// Break a task into smaller sub-steps
    BreakDown {
        /// ID of the task to break down
        task_id: i64,
        /// Sub-step titles; prompted interactively when omitted
        steps: Vec<String>,
    },
    /// Mark a task as done
    Done {
        /// ID of the task to mark complete
        task_id: i64,
    },
    /// Revert a completed task back to pending
    Undo {
        /// ID of the task to revert
        task_id: i64,
    },
    /// Delete a task (and its sub-steps)
    Delete {
        /// ID of the task to delete
        task_id: i64,
    },
    /// List your tasks
    List {
        /// Include completed tasks
        #[arg(long, short)]
        all: bool,
    },
    /// Start a focus timer
    Focus {
        /// Focus duration in minutes
        #[arg(long, short, default_value_t = 15)]
        minutes: i64,
        /// Task ID to focus on
        #[arg(long, short)]
        task: Option<i64>,
    },
    /// Take a break. You have earned it
    TakeBreak {
        /// Break duration in minutes
        #[arg(long, short, default_value_t = 5)]
        minutes: i64,
    },
    /// See how your day is going
    Status,
    /// Get a gentle encouragement message
    Nudge,
    /// Take a self-assessment test (BDEFS or Stroop)
    Test {
        /// Take the Stroop colour-word test instead
        #[arg(long)]
        stroop: bool,
        /// Number of Stroop trials
        #[arg(long, default_value_t = STROOP_DEFAULT_TRIALS)]
        trials: usize,
    },
    /// View past self-assessment results
    TestResults {
        /// Filter by type: bdefs or stroop
        #[arg(long, short = 't')]
        r#type: Option<String>,
        /// Number of results to show
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: i64,
    },
    /// Configure where your data is stored (for cloud sync)
    Config {
        /// Set a custom database file path
        #[arg(long)]
        db_path: Option<String>,
        /// Sync DB via cloud folder: onedrive, dropbox, google-drive
        #[arg(long)]
        sync: Option<String>,
        /// Reset to default local DB
        #[arg(long)]
        reset: bool,
        /// Show current config
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Task #{0} not found")]
    TaskNotFound(i64),
    #[error("Unknown assessment type '{0}'. Use 'bdefs' or 'stroop'")]
    UnknownAssessmentType(String),
    #[error("Failed to read input: {0}")]
    InputError(#[from] std::io::Error),
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(message: &str) -> Result<String, CliError> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(message: &str, default_yes: bool) -> Result<bool, CliError> {
    let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
    let answer = prompt(&format!("{message} {suffix} "))?;
    Ok(match answer.to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Handle the add command
pub fn handle_add(title: String, db: &Database) -> Result<(), CliError> {
    let task = db.add_task(&title, None)?;
    println!("Added task #{}: {}", task.id, task.title);
    Ok(())
}

/// Handle the break-down command
pub fn handle_break_down(
    task_id: i64,
    steps: Vec<String>,
    db: &Database,
) -> Result<(), CliError> {
    let parent = db.get_task(task_id)?.ok_or(CliError::TaskNotFound(task_id))?;
    println!("Breaking down: \"{}\"", parent.title);

    let steps = if steps.is_empty() {
        println!("Enter sub-steps one per line. Empty line to finish.");
        let mut collected = Vec::new();
        loop {
            let step = prompt("  Sub-step: ")?;
            if step.is_empty() {
                break;
            }
            collected.push(step);
        }
        collected
    } else {
        steps
    };

    let mut count = 0;
    for step in &steps {
        let sub = db.add_task(step, Some(parent.id))?;
        println!("  Added #{}: {}", sub.id, sub.title);
        count += 1;
    }

    if count == 0 {
        println!("No sub-steps added.");
    } else {
        println!("Created {count} sub-step{}.", if count == 1 { "" } else { "s" });
    }
    Ok(())
}

/// Handle the done command
pub fn handle_done(task_id: i64, db: &Database, nudges: &Nudges) -> Result<(), CliError> {
    let task = db
        .complete_task(task_id)?
        .ok_or(CliError::TaskNotFound(task_id))?;
    println!("Completed: {}", task.title);
    println!("{}", nudges.pick(&mut rand::rng()));
    Ok(())
}

/// Handle the undo command
pub fn handle_undo(task_id: i64, db: &Database) -> Result<(), CliError> {
    let task = db
        .uncomplete_task(task_id)?
        .ok_or(CliError::TaskNotFound(task_id))?;
    println!("Back to pending: {}", task.title);
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(task_id: i64, db: &Database) -> Result<(), CliError> {
    let task = db.get_task(task_id)?.ok_or(CliError::TaskNotFound(task_id))?;
    db.delete_task(task.id)?;
    println!("Deleted: {}", task.title);
    Ok(())
}

/// Handle the list command
pub fn handle_list(all: bool, db: &Database) -> Result<(), CliError> {
    let tasks = if all {
        db.list_tasks(None, None)?
    } else {
        let mut tasks = db.list_tasks(Some(TaskStatus::Active), None)?;
        tasks.extend(db.list_tasks(Some(TaskStatus::Pending), None)?);
        tasks
    };

    if tasks.is_empty() {
        println!("No tasks yet. Add one with: momentum add \"...\"");
        return Ok(());
    }

    println!("Tasks:");
    for task in tasks.iter().filter(|t| !t.is_subtask()) {
        println!("  #{} [{}] {}", task.id, task.status.as_str(), task.title);
        for sub in tasks.iter().filter(|t| t.parent_id == Some(task.id)) {
            println!("    #{} [{}] {}", sub.id, sub.status.as_str(), sub.title);
        }
    }
    Ok(())
}

/// Handle the focus command: run the countdown and log the session only when
/// it finishes naturally
pub fn handle_focus(
    minutes: i64,
    task_id: Option<i64>,
    db: &Database,
    nudges: &Nudges,
) -> Result<(), CliError> {
    // Reject out-of-range durations before running the countdown
    if !(crate::database::MIN_SESSION_MINUTES..=crate::database::MAX_SESSION_MINUTES)
        .contains(&minutes)
    {
        return Err(CliError::DatabaseError(DatabaseError::ValidationError(
            format!(
                "session duration must be between {} and {} minutes",
                crate::database::MIN_SESSION_MINUTES,
                crate::database::MAX_SESSION_MINUTES
            ),
        )));
    }

    if let Some(id) = task_id {
        let task = db.get_task(id)?.ok_or(CliError::TaskNotFound(id))?;
        db.set_task_active(id)?;
        println!("Focusing on: \"{}\" for {minutes} min", task.title);
    } else {
        println!("Starting {minutes}-minute focus session.");
    }

    timer::run_timer(&TimerConfig::focus(minutes, task_id));

    db.log_focus_session(task_id, minutes)?;
    println!("Focus session logged.");
    println!("{}", nudges.pick(&mut rand::rng()));

    if confirm("Take a 5-minute break?", true)? {
        run_break(5);
    }
    Ok(())
}

/// Handle the take-break command
pub fn handle_take_break(minutes: i64) -> Result<(), CliError> {
    println!("Break time: {minutes} minutes.");
    run_break(minutes);
    Ok(())
}

fn run_break(minutes: i64) {
    timer::run_timer(&TimerConfig::take_break(minutes));
    println!("{}", encouragement::break_message(&mut rand::rng()));
}

/// Handle the status command
pub fn handle_status(db: &Database) -> Result<(), CliError> {
    let summary = db.status()?;

    println!("Today ({})", summary.today.date);
    println!(
        "  {} task{} completed, {} focus minutes",
        summary.today.tasks_completed,
        if summary.today.tasks_completed == 1 { "" } else { "s" },
        summary.today.focus_minutes
    );
    println!(
        "This week: {} tasks, {} focus minutes",
        summary.week_tasks_completed, summary.week_focus_minutes
    );
    println!(
        "Streak: {} day{}",
        summary.streak_days,
        if summary.streak_days == 1 { "" } else { "s" }
    );

    if !summary.active_tasks.is_empty() {
        println!("Active:");
        for task in &summary.active_tasks {
            println!("  #{} {}", task.id, task.title);
        }
    }
    if !summary.pending_tasks.is_empty() {
        println!("Pending:");
        for task in &summary.pending_tasks {
            println!("  #{} {}", task.id, task.title);
        }
    }
    Ok(())
}

/// Handle the nudge command
pub fn handle_nudge(nudges: &Nudges) -> Result<(), CliError> {
    println!("{}", nudges.pick(&mut rand::rng()));
    Ok(())
}

/// Handle the test command (BDEFS questionnaire or Stroop test)
pub fn handle_test(stroop: bool, trials: usize, db: &Database) -> Result<(), CliError> {
    if stroop {
        run_stroop_test(trials, db)
    } else {
        run_bdefs_test(db)
    }
}

fn run_bdefs_test(db: &Database) -> Result<(), CliError> {
    println!("{}\n", assessments::BDEFS_INSTRUCTIONS);
    println!("Rate each statement:");
    for (rating, label) in BDEFS_SCALE {
        println!("  {rating} - {label}");
    }

    let mut answers: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for (domain, questions) in BDEFS_QUESTIONS {
        println!("\n{domain}");
        let mut domain_answers = Vec::new();
        for question in questions {
            loop {
                let raw = prompt(&format!("  {question} (1-4): "))?;
                match raw.parse::<i64>() {
                    Ok(val) if (1..=4).contains(&val) => {
                        domain_answers.push(val);
                        break;
                    }
                    _ => println!("  Please enter 1, 2, 3, or 4."),
                }
            }
        }
        answers.insert(domain.to_string(), domain_answers);
    }

    let scored = assessments::score_bdefs(&answers);
    let saved = db.save_assessment(&scored)?;
    println!("\nTotal score: {}/{}", saved.score, saved.max_score);
    for (domain, questions) in BDEFS_QUESTIONS {
        if let Some(score) = saved.domain_scores.get(domain) {
            println!("  {domain}: {score}/{}", questions.len() as i64 * 4);
        }
    }
    println!("{}", assessments::interpret_bdefs(saved.score, saved.max_score));
    Ok(())
}

fn ansi_colour(colour: &str) -> &'static str {
    match colour {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "blue" => "\x1b[34m",
        "yellow" => "\x1b[33m",
        _ => "",
    }
}

fn run_stroop_test(trials: usize, db: &Database) -> Result<(), CliError> {
    println!("{}\n", assessments::STROOP_INSTRUCTIONS);
    if !confirm("Ready?", true)? {
        return Ok(());
    }

    let mut rng: ThreadRng = rand::rng();
    let generated = assessments::generate_stroop_trials(trials, &mut rng);

    let mut correct = 0;
    let mut total_time = 0.0;
    let mut per_trial = Vec::new();

    for (i, trial) in generated.iter().enumerate() {
        println!(
            "\n  {}{}\x1b[0m",
            ansi_colour(trial.ink_colour),
            trial.word.to_uppercase()
        );
        let started = Instant::now();
        let answer = prompt(&format!("  ({}/{}) Colour: ", i + 1, generated.len()))?;
        let elapsed = started.elapsed().as_secs_f64();
        total_time += elapsed;

        let is_correct = assessments::stroop_answer_correct(trial, &answer);
        per_trial.push((is_correct, elapsed));
        if is_correct {
            correct += 1;
            println!("  Correct!");
        } else {
            println!("  The colour was {}.", trial.ink_colour);
        }
    }

    let outcome = StroopOutcome {
        trials: generated.len() as i64,
        correct,
        total_time_s: total_time,
        per_trial,
    };
    let scored = assessments::score_stroop(&outcome);
    db.save_assessment(&scored)?;

    println!(
        "\nResult: {}/{} correct, avg {:.1}s per trial",
        outcome.correct,
        outcome.trials,
        outcome.avg_time_s()
    );
    println!(
        "{}",
        assessments::interpret_stroop(outcome.correct, outcome.trials, outcome.avg_time_ms())
    );
    Ok(())
}

/// Handle the test-results command
pub fn handle_test_results(
    type_filter: Option<String>,
    limit: i64,
    db: &Database,
) -> Result<(), CliError> {
    let atype = match type_filter {
        Some(raw) => Some(
            AssessmentType::parse(&raw.to_lowercase())
                .ok_or(CliError::UnknownAssessmentType(raw))?,
        ),
        None => None,
    };

    let results = db.list_assessments(atype, limit)?;
    if results.is_empty() {
        println!("No assessment results found.");
        return Ok(());
    }

    for result in results {
        println!(
            "\n#{} {}  ({})",
            result.id,
            result.assessment_type.as_str().to_uppercase(),
            result.taken_at
        );
        println!("  Score: {}/{}", result.score, result.max_score);
        match result.assessment_type {
            AssessmentType::Bdefs => {
                for (domain, score) in &result.domain_scores {
                    println!("    {domain}: {score}");
                }
                println!(
                    "  {}",
                    assessments::interpret_bdefs(result.score, result.max_score)
                );
            }
            AssessmentType::Stroop => {
                let avg_ms = result.domain_scores.get("avg_time_ms").copied().unwrap_or(0);
                println!("  Avg response: {avg_ms}ms");
                println!(
                    "  {}",
                    assessments::interpret_stroop(result.score, result.max_score, avg_ms)
                );
            }
        }
    }
    Ok(())
}

/// Handle the config command
pub fn handle_config(
    db_path: Option<String>,
    sync: Option<String>,
    reset: bool,
    show: bool,
    profile: Profile,
) -> Result<(), CliError> {
    if let Some(provider) = sync {
        let result = config::set_cloud_sync(profile, &provider)?;
        println!(
            "Database will sync via {provider}: {}",
            result.db_path.as_deref().unwrap_or_default()
        );
    } else if let Some(path) = db_path {
        let result = config::set_db_path(profile, &path)?;
        println!(
            "Database path set to: {}",
            result.db_path.as_deref().unwrap_or_default()
        );
    } else if reset {
        config::reset_db_path(profile)?;
        println!("Reset to default local database.");
    } else if show {
        let current = AppConfig::load(profile)?;
        let resolved = current.resolve_db_path(profile)?;
        match &current.db_path {
            Some(custom) => println!("Database: {custom}"),
            None => println!("Database: {} (default)", resolved.display()),
        }
    } else {
        println!("Use --sync, --db-path, --reset, or --show.");
    }
    Ok(())
}
