//! The chat session: message log, turn state and widget host.
//!
//! A session has a single owner. User input is appended immediately;
//! assistant replies and other deferred work go through a [`Scheduler`] and
//! only land when the owner calls [`ChatSession::advance`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use travelcare_core::catalog::Catalog;
use travelcare_core::config::{ChatConfig, TravelCareConfig};
use travelcare_core::types::{MessageId, Profile};
use uuid::Uuid;

use crate::dispatch::ActionDispatcher;
use crate::error::{ChatError, WidgetError};
use crate::intent::keywords::KeywordClassifier;
use crate::response;
use crate::scheduler::Scheduler;
use crate::types::{
    ActionId, ActionPayload, DispatchResult, Effect, Message, MessageDraft, SessionState,
};
use crate::widget::{WidgetOutcome, WidgetSession, WidgetSignal, WidgetTimer};

/// Deferred work owned by the session.
#[derive(Debug)]
enum Job {
    Reply { utterance: String },
    FollowUp(MessageDraft),
    Widget { host: MessageId, timer: WidgetTimer },
}

#[derive(Debug)]
struct ActiveWidget {
    host: MessageId,
    session: WidgetSession,
}

pub struct ChatSession {
    id: Uuid,
    config: ChatConfig,
    classifier: KeywordClassifier,
    dispatcher: ActionDispatcher,
    catalog: Arc<Catalog>,
    profile: Option<Profile>,
    today: NaiveDate,
    messages: Vec<Message>,
    next_id: u64,
    scheduler: Scheduler<Job>,
    pending_replies: usize,
    widget: Option<ActiveWidget>,
    effects: Vec<Effect>,
}

impl ChatSession {
    /// Start a session. The log opens with the greeting.
    pub fn new(config: &TravelCareConfig, catalog: Arc<Catalog>) -> Self {
        let dispatcher = ActionDispatcher::new(
            Arc::clone(&catalog),
            config.chat.dispatch_mode,
            config.emergency.clone(),
        );

        let mut session = Self {
            id: Uuid::new_v4(),
            config: config.chat.clone(),
            classifier: KeywordClassifier::new(),
            dispatcher,
            catalog,
            profile: None,
            today: Local::now().date_naive(),
            messages: Vec::new(),
            next_id: 1,
            scheduler: Scheduler::new(),
            pending_replies: 0,
            widget: None,
            effects: Vec::new(),
        };
        session.append(MessageDraft::assistant(response::greeting()));

        tracing::info!(session = %session.id, mode = ?config.chat.dispatch_mode, "Chat session started");
        session
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.set_profile(Some(profile));
        self
    }

    /// Override the day used to validate booking dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Replace the profile. A policy widget waiting for one is refreshed.
    pub fn set_profile(&mut self, profile: Option<Profile>) {
        self.profile = profile;
        if let (Some(profile), Some(active)) = (self.profile.as_ref(), self.widget.as_mut()) {
            active
                .session
                .profile_loaded(profile, &self.catalog, self.today);
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn state(&self) -> SessionState {
        if self.pending_replies > 0 {
            SessionState::AwaitingResponse
        } else {
            SessionState::Idle
        }
    }

    /// The open widget and the message hosting it.
    pub fn widget(&self) -> Option<(MessageId, &WidgetSession)> {
        self.widget.as_ref().map(|w| (w.host, &w.session))
    }

    pub fn has_widget(&self) -> bool {
        self.widget.is_some()
    }

    pub fn pending_jobs(&self) -> usize {
        self.scheduler.len()
    }

    /// Time until the next deferred job, or `None` when nothing is pending.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.scheduler.next_due_in()
    }

    /// Drain navigation and external-open effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // =========================================================================
    // Turns
    // =========================================================================

    /// Append a user message and schedule the reply.
    pub fn submit(&mut self, text: &str) -> Result<MessageId, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let length = text.chars().count();
        if length > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(length));
        }

        let id = self.append(MessageDraft::user(text));
        self.pending_replies += 1;
        self.scheduler.schedule(
            self.config.response_delay(),
            Job::Reply {
                utterance: text.to_string(),
            },
        );

        tracing::info!(session = %self.id, message = %id, pending = self.pending_replies, "User message submitted");
        Ok(id)
    }

    /// Run every job due within `by` of the session clock. Returns how many ran.
    pub fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.now() + by;
        let mut ran = 0;
        while let Some(job) = self.scheduler.next_ready(deadline) {
            self.run(job);
            ran += 1;
        }
        self.scheduler.settle(deadline);
        ran
    }

    /// Drop all pending jobs. Pending replies are never produced.
    pub fn cancel_pending(&mut self) -> usize {
        self.pending_replies = 0;
        let dropped = self.scheduler.clear();
        if dropped > 0 {
            tracing::debug!(session = %self.id, dropped, "Dropped pending jobs");
        }
        dropped
    }

    fn run(&mut self, job: Job) {
        match job {
            Job::Reply { utterance } => {
                let classification = self.classifier.classify_detailed(&utterance);
                tracing::debug!(
                    intent = %classification.intent,
                    keyword = classification.keyword.unwrap_or("-"),
                    "Classified message"
                );
                self.append(MessageDraft::assistant(response::respond(
                    classification.intent,
                )));
                self.pending_replies = self.pending_replies.saturating_sub(1);
            }
            Job::FollowUp(draft) => {
                self.append(draft);
            }
            Job::Widget { host, timer } => {
                let signal = match self.widget.as_mut() {
                    Some(active) if active.host == host => active.session.fire(timer),
                    _ => {
                        tracing::debug!(host = %host, timer = ?timer, "Widget gone, timer skipped");
                        return;
                    }
                };
                if let Err(e) = self.handle_signal(host, signal) {
                    tracing::warn!(error = %e, "Widget timer failed");
                }
            }
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Dispatch the button at `index` of message `message`.
    pub fn press(&mut self, message: MessageId, index: usize) -> Result<(), ChatError> {
        let button = self
            .messages
            .iter()
            .find(|m| m.id == message)
            .ok_or(ChatError::MessageNotFound(message))?
            .actions
            .get(index)
            .ok_or(ChatError::NoSuchAction { message, index })?;

        let (action, payload) = (button.action.clone(), button.payload);
        self.dispatch(&action, &payload);
        Ok(())
    }

    /// Dispatch an action and apply its result.
    ///
    /// A rejected payload is logged and answered with an apology message.
    pub fn dispatch(&mut self, action: &ActionId, payload: &ActionPayload) {
        match self.dispatcher.dispatch(action, payload) {
            Ok(result) => self.apply(result),
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Action rejected");
                self.append(MessageDraft::assistant(response::invalid_payload()));
            }
        }
    }

    fn apply(&mut self, result: DispatchResult) {
        match result {
            DispatchResult::AppendMessage(draft) => {
                self.append(draft);
            }
            DispatchResult::EchoThenReply { echo, reply } => {
                self.append(echo);
                self.scheduler
                    .schedule(self.config.action_delay(), Job::FollowUp(reply));
            }
            DispatchResult::Navigate { route, state } => {
                tracing::info!(route = %route, state = ?state, "Navigation requested");
                self.effects.push(Effect::Navigate { route, state });
            }
            DispatchResult::OpenExternal(uri) => {
                tracing::info!(uri = %uri, "External link requested");
                self.effects.push(Effect::OpenExternal { uri });
            }
            DispatchResult::RemoveLastAndAppend(draft) => {
                self.remove_last_widget_and_append(draft);
            }
        }
    }

    /// Remove the last message if it hosts a widget, then append `draft`.
    fn remove_last_widget_and_append(&mut self, draft: MessageDraft) -> bool {
        let hosts_widget = self.messages.last().is_some_and(|m| m.hosts_widget());
        if !hosts_widget {
            tracing::debug!(session = %self.id, "No widget message to remove");
            return false;
        }

        if let Some(removed) = self.messages.pop() {
            if self.widget.as_ref().is_some_and(|w| w.host == removed.id) {
                self.widget = None;
            }
            tracing::info!(message = %removed.id, "Removed widget message");
        }
        self.append(draft);
        true
    }

    /// Close the widget shown in the last message.
    ///
    /// Returns `false` and leaves the log untouched when the last message
    /// hosts no widget.
    pub fn dismiss_widget(&mut self) -> bool {
        match self
            .dispatcher
            .dispatch(&ActionId::CloseWidget, &ActionPayload::None)
        {
            Ok(DispatchResult::RemoveLastAndAppend(draft)) => {
                self.remove_last_widget_and_append(draft)
            }
            _ => false,
        }
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Run `f` against the open widget and act on the signal it returns.
    pub fn interact<F>(&mut self, f: F) -> Result<WidgetSignal, ChatError>
    where
        F: FnOnce(&mut WidgetSession) -> Result<WidgetSignal, WidgetError>,
    {
        let active = self.widget.as_mut().ok_or(ChatError::NoActiveWidget)?;
        let host = active.host;
        let signal = f(&mut active.session)?;
        self.handle_signal(host, signal.clone())?;
        Ok(signal)
    }

    fn handle_signal(&mut self, host: MessageId, signal: WidgetSignal) -> Result<(), ChatError> {
        match signal {
            WidgetSignal::Updated => Ok(()),
            WidgetSignal::Schedule(timer) => {
                let delay = match timer {
                    WidgetTimer::Connected => self.config.connect_delay(),
                    WidgetTimer::AutoComplete => self.config.widget_complete_delay(),
                };
                self.scheduler.schedule(delay, Job::Widget { host, timer });
                Ok(())
            }
            WidgetSignal::Complete(outcome) => self.complete_widget(host, outcome),
        }
    }

    /// Hand a widget's completion to the dispatcher.
    ///
    /// When other messages were appended after the host, the host stays in
    /// the log and only the follow-up is appended.
    fn complete_widget(&mut self, host: MessageId, outcome: WidgetOutcome) -> Result<(), ChatError> {
        tracing::info!(host = %host, outcome = ?outcome, "Widget completed");
        let (action, payload) = outcome.action();
        let result = self.dispatcher.dispatch(&action, &payload)?;

        let host_is_last = self.messages.last().is_some_and(|m| m.id == host);
        match result {
            DispatchResult::RemoveLastAndAppend(draft) if !host_is_last => {
                self.widget = None;
                self.append(draft);
            }
            other => self.apply(other),
        }
        Ok(())
    }

    // =========================================================================
    // Log
    // =========================================================================

    fn append(&mut self, draft: MessageDraft) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        let message = Message::from_draft(id, draft);
        if let Some(widget) = message.widget {
            let session = WidgetSession::open(
                &widget,
                Arc::clone(&self.catalog),
                self.profile.as_ref(),
                self.today,
            );
            if let Some(previous) = self.widget.replace(ActiveWidget { host: id, session }) {
                tracing::debug!(host = %previous.host, "Widget superseded");
            }
        }

        tracing::debug!(message = %id, sender = %message.sender, "Appended message");
        self.messages.push(message);
        id
    }
}
