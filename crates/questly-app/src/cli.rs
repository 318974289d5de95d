//! Command-line interface.
//!
//! Defines the `questly` argument structure with clap and executes one
//! command against a [`QuestSession`]. Quest ids may be abbreviated to any
//! unique prefix.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use questly_gateway::AiGateway;
use questly_progression::level::level_progress_pct;
use questly_progression::stats::{average_completion_time, completion_percent};
use questly_progression::{NewTask, OnboardingDraft, TaskBoard};
use questly_types::{
    PERSONALITY_PRESETS, Task, TaskCategory, TaskDifficulty, TaskId, ThemeColor,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::CONFIG_FILE;
use crate::error::AppError;
use crate::session::QuestSession;

/// Questly command line.
#[derive(Debug, Parser)]
#[command(name = "questly")]
#[command(about = "Questly - turn study goals into ranked quests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, global = true, env = "QUESTLY_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create your profile and first quests from a goal
    Onboard {
        /// Display name
        name: String,
        /// Your first big goal
        goal: String,
        /// Profile picture URL
        #[arg(long)]
        picture: Option<String>,
    },

    /// Show profile, rank, nudge and the quest board
    Status,

    /// Add a quest
    Add(TaskArgs),

    /// Add a quest and let the assistant break it into steps
    Quest(TaskArgs),

    /// Complete or reopen a quest
    Complete {
        /// Quest id or unique prefix
        id: String,
        /// Take the mastery quiz instead of skipping it
        #[arg(long)]
        quiz: bool,
    },

    /// Complete or reopen one step of a quest
    Subtask {
        /// Quest id or unique prefix
        id: String,
        /// Step number, starting at 1
        step: usize,
    },

    /// Delete a quest
    Delete {
        /// Quest id or unique prefix
        id: String,
    },

    /// Remove completed quests
    Clear,

    /// Search quests by title or description
    Search {
        /// Text to look for
        query: Option<String>,
    },

    /// Talk to the assistant
    Chat {
        /// Message text
        message: Vec<String>,
        /// Purge the conversation instead of sending a message
        #[arg(long)]
        reset: bool,
    },

    /// Change settings
    Settings(SettingsArgs),

    /// Show this week's completions
    History,
}

/// Fields for a new quest.
#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Title
    pub title: String,
    /// Description
    #[arg(long, short)]
    pub description: Option<String>,
    /// Study, Health, Coding, Creative or Other
    #[arg(long, default_value = "Study", value_parser = parse_category)]
    pub category: TaskCategory,
    /// Easy, Hard or extremely-hard
    #[arg(long, default_value = "Easy", value_parser = parse_difficulty)]
    pub difficulty: TaskDifficulty,
    /// Due date (YYYY-MM-DD or RFC 3339); today when omitted
    #[arg(long, value_parser = parse_due)]
    pub due: Option<DateTime<Utc>>,
}

impl TaskArgs {
    fn into_new_task(self, now: DateTime<Utc>) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            due_date: self.due.unwrap_or(now),
        }
    }
}

/// Settings to change; omitted flags keep their value.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Theme color (violet, emerald, blue, rose, amber or their labels)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<ThemeColor>,
    /// High-contrast theme
    #[arg(long)]
    pub high_contrast: Option<bool>,
    /// Show XP and rank notices
    #[arg(long)]
    pub notifications: Option<bool>,
    /// Track rank XP
    #[arg(long)]
    pub ranked: Option<bool>,
    /// Assistant personality: a preset name or free text
    #[arg(long)]
    pub personality: Option<String>,
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

fn parse_category(raw: &str) -> Result<TaskCategory, String> {
    TaskCategory::from_label(raw).ok_or_else(|| format!("unknown category '{raw}'"))
}

fn parse_difficulty(raw: &str) -> Result<TaskDifficulty, String> {
    TaskDifficulty::from_label(raw).ok_or_else(|| format!("unknown difficulty '{raw}'"))
}

fn parse_color(raw: &str) -> Result<ThemeColor, String> {
    ThemeColor::from_label(raw).ok_or_else(|| format!("unknown color '{raw}'"))
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid due date '{raw}'"))
}

/// Map a preset name to its prompt text; anything else is used verbatim.
pub fn resolve_personality(raw: &str) -> String {
    let raw = raw.trim();
    PERSONALITY_PRESETS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(raw))
        .map_or_else(|| raw.to_owned(), |(_, text)| (*text).to_owned())
}

/// Find the quest whose id starts with `prefix`.
pub fn resolve_task(board: &TaskBoard, prefix: &str) -> Result<TaskId, AppError> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(AppError::InvalidInput(String::from("empty quest id")));
    }
    let mut matches = board
        .tasks()
        .iter()
        .filter(|t| t.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => Err(AppError::InvalidInput(format!("no quest matches '{prefix}'"))),
        (Some(_), Some(_)) => Err(AppError::InvalidInput(format!(
            "'{prefix}' matches more than one quest"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(8).collect()
}

fn print_task(task: &Task) {
    let mark = if task.is_completed { 'x' } else { ' ' };
    let ai = if task.is_ai_generated { " [AI]" } else { "" };
    println!(
        "[{mark}] {}  {}{ai}  ({}, {}, {} XP, due {})",
        short_id(task),
        task.title,
        task.difficulty,
        task.category,
        task.xp_value,
        task.due_date.format("%Y-%m-%d"),
    );
    for (n, sub) in (1..).zip(&task.sub_tasks) {
        let mark = if sub.is_completed { 'x' } else { ' ' };
        println!("      {n}. [{mark}] {}", sub.title);
    }
}

fn print_notices<G: AiGateway>(session: &mut QuestSession<G>) {
    for notice in session.notices_mut().active(Instant::now()) {
        println!(">> {notice}");
    }
}

fn print_status<G: AiGateway>(session: &QuestSession<G>) {
    let state = session.state();
    let user = &state.user;
    println!("{}  Lvl {} ({}%)  {} XP", user.name, user.level, level_progress_pct(user.xp), user.xp);
    if user.settings.is_ranked_mode {
        println!(
            "Rank: {} {}  ({} rank XP, best {})",
            user.current_rank, user.current_tier, user.rank_xp, user.highest_rank
        );
    }
    println!(
        "Completed: {}  Completion: {}%  Avg time: {}",
        user.total_completed,
        completion_percent(state.tasks.tasks()),
        average_completion_time(state.tasks.tasks()),
    );
    if let Some(nudge) = &state.nudge {
        println!("\"{nudge}\"");
    }
    println!();
    if state.tasks.tasks().is_empty() {
        println!("No quests yet. Add one with `questly add`.");
    }
    for task in state.tasks.tasks() {
        print_task(task);
    }
}

// ---------------------------------------------------------------------------
// Mastery quiz
// ---------------------------------------------------------------------------

/// Walk through the pending mastery challenge, reading one answer per line
/// from `input`. An answer may be the option number or its text. End of
/// input skips the rest of the quiz.
pub async fn run_quiz<G, R>(
    session: &mut QuestSession<G>,
    input: &mut R,
    now: DateTime<Utc>,
) -> Result<(), AppError>
where
    G: AiGateway,
    R: AsyncBufRead + Unpin,
{
    let questions = session
        .state()
        .mastery
        .as_ref()
        .map_or(0, questly_progression::MasterySession::len);
    if questions == 0 {
        let quest = session.skip_mastery(now).await?;
        println!("Next quest: {}", quest.title);
        return Ok(());
    }
    session.accept_mastery()?;

    let mut lines = input.lines();
    loop {
        let Some(question) = session
            .state()
            .mastery
            .as_ref()
            .and_then(|m| m.current_question().cloned())
        else {
            break;
        };
        println!("\n{}", question.question);
        for (n, option) in (1..).zip(&question.options) {
            println!("  {n}. {option}");
        }

        let Some(line) = lines.next_line().await.map_err(|e| {
            AppError::InvalidInput(format!("failed to read answer: {e}"))
        })?
        else {
            println!("Quiz abandoned.");
            let quest = session.skip_mastery(now).await?;
            println!("Next quest: {}", quest.title);
            return Ok(());
        };
        let answer = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.options.get(i).cloned())
            .unwrap_or_else(|| line.trim().to_owned());

        if let Err(e) = session.answer_mastery(&answer) {
            println!("{e}");
            continue;
        }
        if !question.explanation.is_empty() {
            println!("{}", question.explanation);
        }
        let last = session.state().mastery.as_ref().is_none_or(|m| m.is_last_step());
        if last {
            break;
        }
        session.advance_mastery()?;
    }

    let reward = session.finish_mastery(now).await?;
    println!(
        "\nMastery: {}/{} correct, +{} XP. Next quest: {}",
        reward.correct, reward.total, reward.bonus_xp, reward.effective_quest.title
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Execute `command` against `session`.
#[allow(clippy::too_many_lines)]
pub async fn run<G: AiGateway>(
    command: Command,
    session: &mut QuestSession<G>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let onboarded = session.state().user.onboarding_complete;
    match (&command, onboarded) {
        (Command::Onboard { .. }, true) => {
            return Err(AppError::InvalidInput(String::from("profile already exists")));
        }
        (Command::Onboard { .. }, false) | (_, true) => {}
        (_, false) => return Err(AppError::NotOnboarded),
    }

    match command {
        Command::Onboard {
            name,
            goal,
            picture,
        } => {
            let mut draft = OnboardingDraft::new(name, goal);
            if let Some(picture) = picture {
                draft = draft.with_picture(picture);
            }
            session.complete_onboarding(draft, now).await?;
            print_notices(session);
            print_status(session);
        }
        Command::Status => {
            session.refresh_nudge().await;
            print_status(session);
        }
        Command::Add(args) => {
            let id = session.add_task(args.into_new_task(now), now).await?;
            if let Some(task) = session.state().tasks.get(id) {
                print_task(task);
            }
        }
        Command::Quest(args) => {
            let id = session.add_ai_quest(args.into_new_task(now), now).await?;
            if let Some(task) = session.state().tasks.get(id) {
                print_task(task);
            }
        }
        Command::Complete { id, quiz } => {
            let id = resolve_task(&session.state().tasks, &id)?;
            let toggle = session.toggle_task(id, now).await?;
            print_notices(session);
            if toggle.completing {
                println!("Quest complete: {}", toggle.title);
                if quiz {
                    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
                    run_quiz(session, &mut stdin, now).await?;
                } else {
                    let quest = session.skip_mastery(now).await?;
                    println!("Next quest: {}", quest.title);
                }
            } else {
                println!("Quest reopened: {}", toggle.title);
            }
        }
        Command::Subtask { id, step } => {
            let task_id = resolve_task(&session.state().tasks, &id)?;
            let sub_id = session
                .state()
                .tasks
                .get(task_id)
                .and_then(|t| t.sub_tasks.get(step.checked_sub(1)?))
                .map(|s| s.id)
                .ok_or_else(|| AppError::InvalidInput(format!("quest has no step {step}")))?;
            session.toggle_sub_task(task_id, sub_id, now).await?;
            print_notices(session);
            if let Some(task) = session.state().tasks.get(task_id) {
                print_task(task);
            }
        }
        Command::Delete { id } => {
            let id = resolve_task(&session.state().tasks, &id)?;
            let removed = session.delete_task(id).await?;
            println!("Deleted: {}", removed.title);
        }
        Command::Clear => {
            let removed = session.clear_completed().await?;
            println!("Removed {removed} completed quest(s).");
        }
        Command::Search { query } => {
            let query = query.unwrap_or_default();
            for task in session.state().tasks.search(&query) {
                print_task(task);
            }
        }
        Command::Chat { message, reset } => {
            if reset {
                session.reset_chat(now).await?;
                println!("Conversation reset.");
            } else if let Some(reply) = session.send_chat(&message.join(" "), now).await? {
                println!("{}", reply.text);
                for source in &reply.sources {
                    println!("  source: {} <{}>", source.label(), source.uri);
                }
                if let Some(model) = reply.model_used {
                    println!("  ({model})");
                }
            }
        }
        Command::Settings(args) => {
            let mut settings = session.state().user.settings.clone();
            if let Some(color) = args.color {
                settings.color = color;
            }
            if let Some(value) = args.high_contrast {
                settings.is_high_contrast = value;
            }
            if let Some(value) = args.notifications {
                settings.notifications_enabled = value;
            }
            if let Some(value) = args.ranked {
                settings.is_ranked_mode = value;
            }
            if let Some(personality) = args.personality {
                settings.assistant_personality = resolve_personality(&personality);
            }
            session.update_settings(settings.clone()).await?;
            println!(
                "Theme {} ({}), high contrast {}, notifications {}, ranked {}",
                settings.color.label(),
                settings.color.hex(),
                settings.is_high_contrast,
                settings.notifications_enabled,
                settings.is_ranked_mode,
            );
            println!("Personality: {}", settings.assistant_personality);
        }
        Command::History => {
            let history = &session.state().history;
            for day in history.entries() {
                println!("{:<4}{:>3} {}", day.date, day.count, "#".repeat(usize::try_from(day.count).unwrap_or(0)));
            }
            println!("Total: {}", history.total());
        }
    }
    Ok(())
}
