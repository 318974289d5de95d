//! End-to-end session flows against a scripted gateway and the offline one.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Datelike, Local, Utc};
use questly_app::{AppError, QuestSession};
use questly_gateway::{AiGateway, ChatReply, GatewayError, OfflineGateway, fallback};
use questly_progression::{NewTask, OnboardingDraft, ProgressionError};
use questly_store::MockStore;
use questly_types::{
    ChatMessage, ChatRole, MasteryChallenge, PracticeQuestion, RankName, RankTier, SuggestedTask,
    TaskCategory, TaskDifficulty, TaskId, WebSource,
};

// ---------------------------------------------------------------------------
// Scripted gateway
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedGateway {
    suggestions: Vec<SuggestedTask>,
    sources: Vec<WebSource>,
    challenge: Option<MasteryChallenge>,
    nudge: Option<String>,
    fail_chat: bool,
    chat_context: Arc<Mutex<Vec<usize>>>,
    topics: Arc<Mutex<Vec<String>>>,
}

impl AiGateway for ScriptedGateway {
    async fn suggest_tasks(&self, _goal: &str) -> Result<Vec<SuggestedTask>, GatewayError> {
        Ok(self.suggestions.clone())
    }

    async fn mastery_challenge(&self, topic: &str) -> Result<MasteryChallenge, GatewayError> {
        self.topics.lock().unwrap().push(topic.to_owned());
        self.challenge.clone().ok_or(GatewayError::Unavailable)
    }

    async fn progress_nudge(&self, completed: usize, total: usize) -> Result<String, GatewayError> {
        self.nudge
            .as_ref()
            .map(|n| format!("{n} ({completed}/{total})"))
            .ok_or(GatewayError::Unavailable)
    }

    async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        personality: &str,
    ) -> Result<ChatReply, GatewayError> {
        self.chat_context.lock().unwrap().push(history.len());
        if self.fail_chat {
            return Err(GatewayError::Backend(String::from("HTTP 503")));
        }
        Ok(ChatReply {
            text: format!("[{personality}] re: {message}"),
            model_used: String::from("gemini-3-flash-preview"),
            sources: self.sources.clone(),
        })
    }
}

fn suggestion(title: &str) -> SuggestedTask {
    SuggestedTask {
        title: title.to_owned(),
        description: format!("{title} in detail"),
        category: String::from("Study"),
    }
}

fn question(n: usize) -> PracticeQuestion {
    PracticeQuestion {
        id: n.to_string(),
        question: format!("Question {n}?"),
        options: vec![String::from("right"), String::from("wrong")],
        correct_answer: String::from("right"),
        explanation: String::new(),
    }
}

fn scripted() -> ScriptedGateway {
    ScriptedGateway {
        suggestions: vec![
            suggestion("Read chapter 1"),
            suggestion("Solve exercises"),
            suggestion("Summarize notes"),
        ],
        challenge: Some(MasteryChallenge {
            questions: vec![question(1), question(2)],
            next_quest: SuggestedTask {
                title: String::from("Teach it back"),
                description: String::from("Explain the chapter to a friend."),
                category: String::from("creative"),
            },
        }),
        nudge: Some(String::from("Keep going")),
        ..ScriptedGateway::default()
    }
}

fn new_task(title: &str, difficulty: TaskDifficulty, now: DateTime<Utc>) -> NewTask {
    NewTask {
        title: title.to_owned(),
        description: None,
        category: TaskCategory::Coding,
        difficulty,
        due_date: now,
    }
}

async fn onboarded<G: AiGateway>(store: MockStore, gateway: G) -> QuestSession<G> {
    let mut session = QuestSession::load(store, gateway).await;
    session
        .complete_onboarding(OnboardingDraft::new("Ada", "Pass calculus"), Utc::now())
        .await
        .unwrap();
    session
}

fn notice_texts<G>(session: &mut QuestSession<G>) -> Vec<String>
where
    G: AiGateway,
{
    session
        .notices_mut()
        .active(Instant::now())
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quests_need_a_profile_first() {
    let mut session = QuestSession::load(MockStore::in_memory(), scripted()).await;
    let result = session
        .add_task(new_task("Early", TaskDifficulty::Easy, Utc::now()), Utc::now())
        .await;
    assert!(matches!(result, Err(AppError::NotOnboarded)));
}

#[tokio::test]
async fn removing_quests_needs_a_profile_first() {
    let mut session = QuestSession::load(MockStore::in_memory(), scripted()).await;

    let id = TaskId::new();
    assert!(matches!(
        session.delete_task(id).await,
        Err(AppError::NotOnboarded)
    ));
    assert!(matches!(
        session.clear_completed().await,
        Err(AppError::NotOnboarded)
    ));
}

#[tokio::test]
async fn onboarding_seeds_quests_and_celebrates() {
    let store = MockStore::in_memory();
    let mut session = onboarded(store.clone(), scripted()).await;

    let state = session.state();
    assert!(state.user.onboarding_complete);
    assert_eq!(state.user.profile_picture, "https://picsum.photos/seed/Ada/200");
    assert_eq!(state.tasks.tasks().len(), 3);
    assert!(state.tasks.tasks().iter().all(|t| t.xp_value == 100 && t.is_ai_generated));
    assert_eq!(state.nudge.as_deref(), Some("Keep going (0/3)"));

    assert_eq!(notice_texts(&mut session), vec!["YOUR QUEST BEGINS NOW"]);

    let stored = store.get_user().await;
    assert!(stored.onboarding_complete);
    assert_eq!(store.get_tasks().await.len(), 3);
}

#[tokio::test]
async fn onboarding_rejects_blank_goal() {
    let mut session = QuestSession::load(MockStore::in_memory(), scripted()).await;
    let result = session
        .complete_onboarding(OnboardingDraft::new("Ada", "   "), Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(AppError::Progression {
            source: ProgressionError::MissingField("goal")
        })
    ));
    assert!(!session.state().user.onboarding_complete);
}

// ---------------------------------------------------------------------------
// Completion, rank and mastery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_a_quest_ranks_up_and_offers_mastery() {
    let gateway = scripted();
    let topics = Arc::clone(&gateway.topics);
    let mut session = onboarded(MockStore::in_memory(), gateway).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;

    let toggle = session.toggle_task(id, now).await.unwrap();
    assert!(toggle.completing);
    assert_eq!(toggle.delta, 100);

    let state = session.state();
    assert_eq!(state.user.xp, 100);
    assert_eq!(state.user.rank_xp, 100);
    assert_eq!(state.user.current_rank, RankName::Iron);
    assert_eq!(state.user.current_tier, RankTier::Three);
    assert_eq!(state.user.highest_rank.ordinal, 1);
    assert_eq!(state.user.total_completed, 1);
    let today = now.with_timezone(&Local).weekday();
    assert_eq!(state.history.count_for(today), 1);
    assert_eq!(state.nudge.as_deref(), Some("Keep going (1/3)"));
    assert_eq!(state.mastery.as_ref().map(|m| m.len()), Some(2));
    assert_eq!(*topics.lock().unwrap(), vec![String::from("Read chapter 1")]);

    let texts = notice_texts(&mut session);
    assert!(texts.contains(&String::from("RANK UP! Iron III")));
    assert!(texts.contains(&String::from("+100 RANK XP")));
}

#[tokio::test]
async fn finishing_mastery_pays_bonus_and_queues_effective_quest() {
    let gateway = scripted();
    let mut session = onboarded(MockStore::in_memory(), gateway).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();

    session.accept_mastery().unwrap();
    session.answer_mastery("right").unwrap();
    session.advance_mastery().unwrap();
    session.answer_mastery("wrong").unwrap();
    let reward = session.finish_mastery(now).await.unwrap();

    assert_eq!((reward.correct, reward.total, reward.bonus_xp), (1, 2, 100));
    let state = session.state();
    assert!(state.mastery.is_none());
    assert_eq!(state.user.xp, 200);
    assert_eq!(state.user.rank_xp, 200);
    assert_eq!(state.user.current_tier, RankTier::Two);
    assert_eq!(state.user.total_completed, 1);

    let first = &state.tasks.tasks()[0];
    assert_eq!(first.title, "Effective: Teach it back");
    assert_eq!(first.category, TaskCategory::Creative);
    assert_eq!(first.xp_value, 150);
    assert!(state.tasks.tasks().iter().all(|t| !t.is_completed));
    assert_eq!(state.tasks.tasks().len(), 3);
}

#[tokio::test]
async fn finishing_early_keeps_the_challenge_pending() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();

    let result = session.finish_mastery(now).await;
    assert!(matches!(
        result,
        Err(AppError::Progression {
            source: ProgressionError::NotAccepted
        })
    ));
    assert!(session.state().mastery.is_some());

    session.accept_mastery().unwrap();
    session.answer_mastery("right").unwrap();
    let result = session.finish_mastery(now).await;
    assert!(matches!(
        result,
        Err(AppError::Progression {
            source: ProgressionError::Unanswered { step: 1 }
        })
    ));
    assert!(session.state().mastery.is_some());
}

#[tokio::test]
async fn reopening_a_quest_takes_the_xp_back() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();
    session.skip_mastery(now).await.unwrap();
    let _ = notice_texts(&mut session);

    let toggle = session.toggle_task(id, now);
    // The completed quest was cleared when the follow-up was queued.
    assert!(matches!(
        toggle.await,
        Err(AppError::Progression {
            source: ProgressionError::TaskNotFound(_)
        })
    ));

    let other = session.state().tasks.tasks()[1].id;
    session.toggle_task(other, now).await.unwrap();
    let reopen = session.toggle_task(other, now).await.unwrap();
    assert!(!reopen.completing);
    assert_eq!(reopen.delta, -100);

    let state = session.state();
    assert_eq!(state.user.rank_xp, 100);
    assert_eq!(state.user.current_tier, RankTier::Three);
    assert_eq!(state.user.highest_rank.ordinal, 2);
    assert_eq!(state.user.total_completed, 1);
    assert!(notice_texts(&mut session).contains(&String::from("RANK DOWN Iron III")));
}

#[tokio::test]
async fn steps_pay_five_xp_without_counting_completions() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let id = session
        .add_ai_quest(new_task("Build a parser", TaskDifficulty::ExtremelyHard, now), now)
        .await
        .unwrap();

    let task = session.state().tasks.get(id).unwrap();
    assert_eq!(task.sub_tasks.len(), 3);
    assert_eq!(task.xp_value, 280);
    let step = task.sub_tasks[0].id;

    assert_eq!(session.toggle_sub_task(id, step, now).await.unwrap(), 5);
    assert_eq!(session.state().user.xp, 5);
    assert_eq!(session.toggle_sub_task(id, step, now).await.unwrap(), -5);
    assert_eq!(session.state().user.xp, 0);
    assert_eq!(session.state().user.total_completed, 0);
}

#[tokio::test]
async fn ai_quest_is_stored_with_ten_xp_per_suggested_step() {
    let store = MockStore::in_memory();
    let mut session = onboarded(store.clone(), scripted()).await;
    let now = Utc::now();
    let id = session
        .add_ai_quest(new_task("Learn integrals", TaskDifficulty::Hard, now), now)
        .await
        .unwrap();

    let state = session.state();
    let first = &state.tasks.tasks()[0];
    assert_eq!(first.id, id);
    assert!(first.is_ai_generated);
    assert_eq!(first.xp_value, 130);
    let steps: Vec<&str> = first.sub_tasks.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(steps, vec!["Read chapter 1", "Solve exercises", "Summarize notes"]);
    assert!(first.sub_tasks.iter().all(|s| !s.is_completed));

    let stored = store.get_tasks().await;
    let saved = stored.iter().find(|t| t.id == id).unwrap();
    assert_eq!(saved.sub_tasks.len(), 3);
    assert_eq!(saved.xp_value, 130);
}

#[tokio::test]
async fn ai_quest_without_a_breakdown_keeps_base_xp() {
    let store = MockStore::in_memory();
    let mut session = onboarded(store.clone(), OfflineGateway::new()).await;
    let now = Utc::now();
    let id = session
        .add_ai_quest(new_task("Learn integrals", TaskDifficulty::Easy, now), now)
        .await
        .unwrap();

    let task = session.state().tasks.get(id).unwrap();
    assert!(task.is_ai_generated);
    assert_eq!(task.xp_value, 25);
    assert!(task.sub_tasks.is_empty());

    let stored = store.get_tasks().await;
    assert!(stored.iter().any(|t| t.id == id && t.sub_tasks.is_empty()));
}

#[tokio::test]
async fn quiz_reads_numbered_or_literal_answers() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();

    let mut input: &[u8] = b"1\nwrong\n";
    questly_app::cli::run_quiz(&mut session, &mut input, now)
        .await
        .unwrap();

    let state = session.state();
    assert!(state.mastery.is_none());
    assert_eq!(state.user.xp, 200);
    assert_eq!(state.tasks.tasks()[0].title, "Effective: Teach it back");
}

#[tokio::test]
async fn quiz_abandoned_at_end_of_input_is_skipped() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();

    let mut input: &[u8] = b"";
    questly_app::cli::run_quiz(&mut session, &mut input, now)
        .await
        .unwrap();

    let state = session.state();
    assert!(state.mastery.is_none());
    assert_eq!(state.user.xp, 100);
    assert_eq!(state.tasks.tasks()[0].title, "Effective: Teach it back");
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unranked_and_silent_settings_are_honored() {
    let mut session = onboarded(MockStore::in_memory(), scripted()).await;
    let now = Utc::now();
    let mut settings = session.state().user.settings.clone();
    settings.is_ranked_mode = false;
    settings.notifications_enabled = false;
    session.update_settings(settings).await.unwrap();

    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, now).await.unwrap();

    let state = session.state();
    assert_eq!(state.user.xp, 100);
    assert_eq!(state.user.rank_xp, 0);
    assert_eq!(state.user.current_tier, RankTier::Four);
    assert!(notice_texts(&mut session).is_empty());
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_sends_prior_history_and_personality() {
    let gateway = scripted();
    let context = Arc::clone(&gateway.chat_context);
    let mut session = onboarded(MockStore::in_memory(), gateway).await;
    let now = Utc::now();

    let first = session.send_chat("What is a limit?", now).await.unwrap().unwrap();
    assert!(first.text.ends_with("re: What is a limit?"));
    assert_eq!(first.model_used.as_deref(), Some("gemini-3-flash-preview"));
    session.send_chat("And a derivative?", now).await.unwrap();
    assert!(session.send_chat("   ", now).await.unwrap().is_none());

    let chat = &session.state().chat;
    assert_eq!(chat.len(), 4);
    assert_eq!(chat[0].role, ChatRole::User);
    assert_eq!(chat[1].role, ChatRole::Model);
    assert_eq!(*context.lock().unwrap(), vec![0, 2]);

}

#[tokio::test]
async fn reset_leaves_only_the_purge_notice() {
    let store = MockStore::in_memory();
    let mut session = onboarded(store.clone(), scripted()).await;
    let now = Utc::now();
    session.send_chat("What is a limit?", now).await.unwrap();
    session.send_chat("And a derivative?", now).await.unwrap();

    session.reset_chat(now).await.unwrap();

    let chat = &session.state().chat;
    assert_eq!(chat.len(), 1);
    assert_eq!(chat[0].role, ChatRole::Model);
    assert_eq!(chat[0].text, "Data core purged. New session ready.");
    assert_eq!(chat[0].text, questly_app::session::CHAT_RESET_TEXT);
    assert_eq!(chat[0].model_used, None);

    let stored = store.get_chat_history().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, questly_app::session::CHAT_RESET_TEXT);
}

#[tokio::test]
async fn grounded_reply_keeps_its_sources() {
    let gateway = ScriptedGateway {
        sources: vec![WebSource {
            uri: String::from("https://example.org/limits"),
            title: Some(String::from("Limits")),
        }],
        ..scripted()
    };
    let store = MockStore::in_memory();
    let mut session = onboarded(store.clone(), gateway).await;

    let reply = session
        .send_chat("What is a limit?", Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.sources[0].label(), "Limits");

    let chat = &session.state().chat;
    assert!(chat[0].sources.is_empty());
    assert_eq!(chat[1].sources, reply.sources);
    assert_eq!(store.get_chat_history().await[1].sources, reply.sources);
}

#[tokio::test]
async fn chat_failure_uses_canned_reply() {
    let gateway = ScriptedGateway {
        fail_chat: true,
        ..scripted()
    };
    let mut session = onboarded(MockStore::in_memory(), gateway).await;

    let reply = session.send_chat("Hello?", Utc::now()).await.unwrap().unwrap();
    assert_eq!(reply.text, fallback::CHAT_REPLY);
    assert_eq!(reply.model_used, None);
    assert!(reply.sources.is_empty());
    assert_eq!(session.state().chat.len(), 2);
}

// ---------------------------------------------------------------------------
// Offline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_gateway_degrades_every_call() {
    let mut session = onboarded(MockStore::in_memory(), OfflineGateway::new()).await;
    let now = Utc::now();
    assert!(session.state().tasks.tasks().is_empty());
    assert_eq!(session.state().nudge.as_deref(), Some(fallback::NUDGE));

    let id = session
        .add_ai_quest(new_task("Learn Rust", TaskDifficulty::Hard, now), now)
        .await
        .unwrap();
    assert!(session.state().tasks.get(id).unwrap().sub_tasks.is_empty());

    session.toggle_task(id, now).await.unwrap();
    assert_eq!(session.state().mastery.as_ref().map(|m| m.len()), Some(0));
    assert!(session.accept_mastery().is_err());

    let quest = session.skip_mastery(now).await.unwrap();
    assert_eq!(quest.title, "Effective: Knowledge Review");
    assert_eq!(quest.category, TaskCategory::Other);
    assert!(matches!(
        session.skip_mastery(now).await,
        Err(AppError::NoMasteryChallenge)
    ));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn state_survives_reopening_the_snapshot() {
    let path = std::env::temp_dir().join(format!("questly-session-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let store = MockStore::open(&path).await.unwrap();
    let mut session = onboarded(store, scripted()).await;
    let id = session.state().tasks.tasks()[0].id;
    session.toggle_task(id, Utc::now()).await.unwrap();
    drop(session);

    let reopened = MockStore::open(&path).await.unwrap();
    let session = QuestSession::load(reopened, scripted()).await;
    assert_eq!(session.state().user.name, "Ada");
    assert_eq!(session.state().user.xp, 100);
    assert_eq!(session.state().history.total(), 1);
    assert!(session.state().tasks.get(id).is_some_and(|t| t.is_completed));

    let _ = std::fs::remove_file(&path);
}
