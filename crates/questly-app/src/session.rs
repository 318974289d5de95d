//! The quest session: one user's state plus the collaborators that act on it.
//!
//! Every operation follows the same shape: apply the progression rules to
//! the in-memory [`AppState`], raise notices for whatever changed, consult
//! the gateway where needed (substituting the static fallback on failure)
//! and finally write the affected collections back to the store.
//!
//! Operations run one at a time on `&mut self`, so a slow gateway call
//! delays the rest of the event but can never interleave with another one.

use std::time::Instant;

use chrono::{DateTime, Datelike, Local, Utc};
use questly_gateway::{AiGateway, fallback};
use questly_progression::{
    MasteryReward, MasterySession, NewTask, OnboardingDraft, Progress, TaskBoard, TaskToggle,
    WeeklyHistory, XpDelta, apply_xp,
};
use questly_store::MockStore;
use questly_types::{ChatMessage, ChatRole, MessageId, SubTaskId, Task, TaskId, ThemeSettings, UserProfile};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::notify::NotificationBoard;

/// Text of the single message left after a chat reset.
pub const CHAT_RESET_TEXT: &str = "Data core purged. New session ready.";

/// Everything the session mutates.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The profile.
    pub user: UserProfile,
    /// The quest board.
    pub tasks: TaskBoard,
    /// Completions per weekday.
    pub history: WeeklyHistory,
    /// Conversation with the assistant, oldest first.
    pub chat: Vec<ChatMessage>,
    /// Latest encouragement line, if one was fetched.
    pub nudge: Option<String>,
    /// Challenge offered after the last completion, if still open.
    pub mastery: Option<MasterySession>,
}

/// A running session over a store and a gateway.
pub struct QuestSession<G> {
    state: AppState,
    store: MockStore,
    gateway: G,
    notices: NotificationBoard,
}

impl<G: AiGateway> QuestSession<G> {
    /// Read the stored data into a new session. Makes no gateway calls.
    pub async fn load(store: MockStore, gateway: G) -> Self {
        let data = store.get_data().await;
        let notices = NotificationBoard::new(data.user.settings.notifications_enabled);
        let state = AppState {
            user: data.user,
            tasks: TaskBoard::from_tasks(data.tasks),
            history: WeeklyHistory::from_entries(data.history),
            chat: data.chat_history,
            nudge: None,
            mastery: None,
        };
        debug!(
            tasks = state.tasks.tasks().len(),
            onboarded = state.user.onboarding_complete,
            "session loaded"
        );
        Self {
            state,
            store,
            gateway,
            notices,
        }
    }

    /// [`load`](Self::load), then fetch a nudge for an onboarded user.
    pub async fn open(store: MockStore, gateway: G) -> Self {
        let mut session = Self::load(store, gateway).await;
        if session.state.user.onboarding_complete {
            session.refresh_nudge().await;
        }
        session
    }

    /// Current state.
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The notice board.
    pub const fn notices(&self) -> &NotificationBoard {
        &self.notices
    }

    /// Mutable access to the notice board, for reading live notices.
    pub const fn notices_mut(&mut self) -> &mut NotificationBoard {
        &mut self.notices
    }

    const fn require_onboarded(&self) -> Result<(), AppError> {
        if self.state.user.onboarding_complete {
            Ok(())
        } else {
            Err(AppError::NotOnboarded)
        }
    }

    /// Run the XP mutation handler and raise notices for its events.
    /// Returns whether a fresh nudge was requested.
    fn apply_delta(&mut self, delta: XpDelta, now: DateTime<Utc>) -> bool {
        let progress = Progress {
            user: std::mem::take(&mut self.state.user),
            history: std::mem::take(&mut self.state.history),
        };
        let today = now.with_timezone(&Local).weekday();
        let outcome = apply_xp(progress, delta, today);
        self.state.user = outcome.progress.user;
        self.state.history = outcome.progress.history;
        self.notices.push_events(&outcome.events, Instant::now());
        outcome.nudge_requested
    }

    // -----------------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------------

    /// Create the profile and the first quests from the user's goal.
    pub async fn complete_onboarding(
        &mut self,
        draft: OnboardingDraft,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        draft.validate()?;
        let suggestions = fallback::resolve(
            "suggest_tasks",
            self.gateway.suggest_tasks(draft.goal.trim()).await,
            fallback::suggestions,
        );
        let (user, tasks) = draft.finish(&suggestions, now)?;
        info!(name = %user.name, quests = tasks.len(), "onboarding complete");

        self.notices.set_enabled(user.settings.notifications_enabled);
        self.state.user = user;
        self.state.tasks = TaskBoard::from_tasks(tasks);
        self.notices.celebrate(Instant::now());
        self.persist().await?;
        self.refresh_nudge().await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    /// Add a manual quest.
    pub async fn add_task(&mut self, new: NewTask, now: DateTime<Utc>) -> Result<TaskId, AppError> {
        self.require_onboarded()?;
        let id = self.state.tasks.add_task(new, now)?;
        self.persist().await?;
        Ok(id)
    }

    /// Add an AI quest, then ask the gateway to break it into steps.
    ///
    /// The quest is stored before the gateway is consulted; a failed
    /// breakdown leaves it without sub-tasks.
    pub async fn add_ai_quest(
        &mut self,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> Result<TaskId, AppError> {
        self.require_onboarded()?;
        let title = new.title.trim().to_owned();
        let id = self.state.tasks.add_ai_quest(new, now)?;
        self.persist().await?;

        let steps = fallback::resolve(
            "suggest_tasks",
            self.gateway.suggest_tasks(&title).await,
            fallback::suggestions,
        );
        let added = self.state.tasks.attach_breakdown(id, &steps)?;
        if added > 0 {
            self.persist().await?;
        }
        Ok(id)
    }

    /// Complete or reopen a quest.
    ///
    /// Completing offers a mastery challenge on the quest's topic and drops
    /// every other completed quest from the board.
    pub async fn toggle_task(
        &mut self,
        id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<TaskToggle, AppError> {
        self.require_onboarded()?;
        let toggle = self.state.tasks.toggle_task(id, now)?;
        let nudge = self.apply_delta(XpDelta::major(toggle.delta), now);

        if toggle.completing {
            let challenge = fallback::resolve(
                "mastery_challenge",
                self.gateway.mastery_challenge(&toggle.title).await,
                fallback::mastery_challenge,
            );
            debug!(task = %id, questions = challenge.questions.len(), "mastery challenge offered");
            self.state.mastery = Some(MasterySession::new(challenge));
            self.state.tasks.prune_completed_except(id);
        }

        self.persist().await?;
        if nudge {
            self.refresh_nudge().await;
        }
        Ok(toggle)
    }

    /// Complete or reopen one step of a quest (plus or minus five XP).
    pub async fn toggle_sub_task(
        &mut self,
        task: TaskId,
        sub_task: SubTaskId,
        now: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        self.require_onboarded()?;
        let delta = self.state.tasks.toggle_sub_task(task, sub_task)?;
        self.apply_delta(XpDelta::minor(delta), now);
        self.persist().await?;
        Ok(delta)
    }

    /// Remove a quest without touching XP.
    pub async fn delete_task(&mut self, id: TaskId) -> Result<Task, AppError> {
        self.require_onboarded()?;
        let removed = self.state.tasks.delete_task(id)?;
        self.persist().await?;
        Ok(removed)
    }

    /// Remove every completed quest.
    pub async fn clear_completed(&mut self) -> Result<usize, AppError> {
        self.require_onboarded()?;
        let removed = self.state.tasks.clear_completed();
        self.persist().await?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Mastery
    // -----------------------------------------------------------------------

    fn mastery_mut(&mut self) -> Result<&mut MasterySession, AppError> {
        self.state.mastery.as_mut().ok_or(AppError::NoMasteryChallenge)
    }

    /// Start answering the pending challenge.
    pub fn accept_mastery(&mut self) -> Result<(), AppError> {
        Ok(self.mastery_mut()?.accept()?)
    }

    /// Record an answer to the current question.
    pub fn answer_mastery(&mut self, option: &str) -> Result<(), AppError> {
        Ok(self.mastery_mut()?.answer(option)?)
    }

    /// Move to the next question.
    pub fn advance_mastery(&mut self) -> Result<(), AppError> {
        Ok(self.mastery_mut()?.advance()?)
    }

    /// Score the challenge, pay the bonus and queue the follow-up quest.
    ///
    /// On a rule violation (not accepted, unanswered question) the challenge
    /// stays pending.
    pub async fn finish_mastery(&mut self, now: DateTime<Utc>) -> Result<MasteryReward, AppError> {
        let session = self.state.mastery.take().ok_or(AppError::NoMasteryChallenge)?;
        let reward = match session.clone().finish(now) {
            Ok(reward) => reward,
            Err(e) => {
                self.state.mastery = Some(session);
                return Err(e.into());
            }
        };
        info!(correct = reward.correct, total = reward.total, "mastery challenge finished");

        self.apply_delta(XpDelta::minor(reward.bonus_xp), now);
        self.queue_effective_quest(reward.effective_quest.clone());
        self.persist().await?;
        Ok(reward)
    }

    /// Dismiss the challenge. The follow-up quest is still queued.
    pub async fn skip_mastery(&mut self, now: DateTime<Utc>) -> Result<Task, AppError> {
        let session = self.state.mastery.take().ok_or(AppError::NoMasteryChallenge)?;
        let quest = session.skip(now);
        self.queue_effective_quest(quest.clone());
        self.persist().await?;
        Ok(quest)
    }

    fn queue_effective_quest(&mut self, quest: Task) {
        self.state.tasks.clear_completed();
        self.state.tasks.insert_front(quest);
    }

    // -----------------------------------------------------------------------
    // Assistant
    // -----------------------------------------------------------------------

    /// Send a message to the assistant and append both sides to the log.
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn send_chat(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ChatMessage>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let result = self
            .gateway
            .chat(text, &self.state.chat, &self.state.user.settings.assistant_personality)
            .await;
        let (reply_text, model_used, sources) = match result {
            Ok(reply) => (reply.text, Some(reply.model_used), reply.sources),
            Err(e) => {
                warn!(call = "chat", error = %e, "AI call failed, using fallback");
                (fallback::CHAT_REPLY.to_owned(), None, Vec::new())
            }
        };

        self.state.chat.push(ChatMessage {
            id: MessageId::new(),
            role: ChatRole::User,
            text: text.to_owned(),
            model_used: None,
            sources: Vec::new(),
            created_at: now,
        });
        let reply = ChatMessage {
            id: MessageId::new(),
            role: ChatRole::Model,
            text: reply_text,
            model_used,
            sources,
            created_at: now,
        };
        self.state.chat.push(reply.clone());
        self.persist().await?;
        Ok(Some(reply))
    }

    /// Replace the conversation with a single reset notice.
    pub async fn reset_chat(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        self.state.chat = vec![ChatMessage {
            id: MessageId::new(),
            role: ChatRole::Model,
            text: CHAT_RESET_TEXT.to_owned(),
            model_used: None,
            sources: Vec::new(),
            created_at: now,
        }];
        self.persist().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Settings and nudge
    // -----------------------------------------------------------------------

    /// Replace the user's settings.
    pub async fn update_settings(&mut self, settings: ThemeSettings) -> Result<(), AppError> {
        self.notices.set_enabled(settings.notifications_enabled);
        self.state.user.settings = settings;
        self.persist().await?;
        Ok(())
    }

    /// Ask the gateway for a new encouragement line.
    pub async fn refresh_nudge(&mut self) {
        let completed = self.state.tasks.completed_count();
        let total = self.state.tasks.tasks().len();
        let nudge = fallback::resolve(
            "progress_nudge",
            self.gateway.progress_nudge(completed, total).await,
            || fallback::NUDGE.to_owned(),
        );
        self.state.nudge = Some(nudge);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write every collection back to the store and flush its snapshot.
    pub async fn persist(&self) -> Result<(), AppError> {
        self.store.update_user(self.state.user.clone()).await;
        self.store.update_tasks(self.state.tasks.tasks().to_vec()).await;
        self.store
            .update_history(self.state.history.entries().to_vec())
            .await;
        self.store.update_chat_history(self.state.chat.clone()).await;
        self.store.sync_data().await?;
        Ok(())
    }
}
