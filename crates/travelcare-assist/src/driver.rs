//! Async driver that runs a [`ChatSession`] on a tokio runtime.
//!
//! The driver owns the session. It sleeps until the next scheduled job or
//! the next input, advances the session clock by the real time elapsed and
//! publishes what changed. Shutting down drops pending jobs. Once every
//! handle is dropped, pending jobs still run before the driver stops.

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use travelcare_core::types::{MessageId, Profile};

use crate::error::{ChatError, WidgetError};
use crate::session::ChatSession;
use crate::types::{ActionId, ActionPayload, Effect, Message, SessionState};
use crate::widget::{WidgetSession, WidgetSignal};

/// A widget interaction shipped to the driver task.
pub type WidgetCommand =
    Box<dyn FnOnce(&mut WidgetSession) -> Result<WidgetSignal, WidgetError> + Send>;

/// Input accepted by a running session.
pub enum SessionInput {
    Text(String),
    Press { message: MessageId, index: usize },
    Dispatch(ActionId, ActionPayload),
    DismissWidget,
    Interact(WidgetCommand),
    Profile(Option<Profile>),
}

/// Changes published after each input or timer.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub appended: Vec<Message>,
    pub removed: Vec<MessageId>,
    pub effects: Vec<Effect>,
    pub state: Option<SessionState>,
    /// Rendering of the open widget, if any.
    pub widget: Option<String>,
    /// The widget shown before this update is gone.
    pub widget_closed: bool,
    /// Why the last input was rejected.
    pub rejected: Option<ChatError>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.appended.is_empty()
            && self.removed.is_empty()
            && self.effects.is_empty()
            && self.rejected.is_none()
            && !self.widget_closed
    }
}

/// Cloneable front door to a running driver.
#[derive(Clone)]
pub struct SessionHandle {
    inputs: mpsc::Sender<SessionInput>,
    shutdown: Arc<Notify>,
}

impl SessionHandle {
    pub async fn send(&self, input: SessionInput) -> Result<(), ChatError> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| ChatError::SessionClosed)
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<(), ChatError> {
        self.send(SessionInput::Text(text.into())).await
    }

    pub async fn interact<F>(&self, f: F) -> Result<(), ChatError>
    where
        F: FnOnce(&mut WidgetSession) -> Result<WidgetSignal, WidgetError> + Send + 'static,
    {
        self.send(SessionInput::Interact(Box::new(f))).await
    }

    /// Signal the driver to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

pub struct SessionDriver {
    session: ChatSession,
    inputs: mpsc::Receiver<SessionInput>,
    updates: mpsc::Sender<SessionUpdate>,
    shutdown: Arc<Notify>,
    known: Vec<MessageId>,
    last_state: SessionState,
    last_widget: Option<String>,
}

impl SessionDriver {
    /// Wrap a session. Returns the driver, its handle and the update stream.
    pub fn new(
        session: ChatSession,
        capacity: usize,
    ) -> (Self, SessionHandle, mpsc::Receiver<SessionUpdate>) {
        let (input_tx, input_rx) = mpsc::channel(capacity);
        let (update_tx, update_rx) = mpsc::channel(capacity);
        let shutdown = Arc::new(Notify::new());

        let driver = Self {
            session,
            inputs: input_rx,
            updates: update_tx,
            shutdown: Arc::clone(&shutdown),
            known: Vec::new(),
            last_state: SessionState::Idle,
            last_widget: None,
        };
        let handle = SessionHandle {
            inputs: input_tx,
            shutdown,
        };
        (driver, handle, update_rx)
    }

    /// Run until shutdown, or until every handle is dropped and no jobs are
    /// left. Returns the session.
    pub async fn run(mut self) -> ChatSession {
        let mut clock = Instant::now();
        let mut draining = false;
        self.publish(None).await;

        loop {
            let wait = self.session.next_due_in();
            if draining && wait.is_none() {
                break;
            }
            let timer = async move {
                match wait {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = self.shutdown.notified() => break,
                input = self.inputs.recv(), if !draining => match input {
                    Some(input) => {
                        self.catch_up(&mut clock);
                        let rejected = self.handle(input).err();
                        self.publish(rejected).await;
                    }
                    None => {
                        tracing::debug!(
                            pending = self.session.pending_jobs(),
                            "Inputs closed, draining"
                        );
                        draining = true;
                    }
                },
                _ = timer => {
                    self.catch_up(&mut clock);
                    self.publish(None).await;
                }
            }
        }

        let dropped = self.session.cancel_pending();
        tracing::info!(session = %self.session.id(), dropped, "Session driver stopped");
        self.session
    }

    fn catch_up(&mut self, clock: &mut Instant) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(*clock);
        *clock = now;
        self.session.advance(elapsed);
    }

    fn handle(&mut self, input: SessionInput) -> Result<(), ChatError> {
        match input {
            SessionInput::Text(text) => self.session.submit(&text).map(|_| ()),
            SessionInput::Press { message, index } => self.session.press(message, index),
            SessionInput::Dispatch(action, payload) => {
                self.session.dispatch(&action, &payload);
                Ok(())
            }
            SessionInput::DismissWidget => {
                if self.session.dismiss_widget() {
                    Ok(())
                } else {
                    Err(ChatError::NoActiveWidget)
                }
            }
            SessionInput::Interact(command) => self.session.interact(command).map(|_| ()),
            SessionInput::Profile(profile) => {
                self.session.set_profile(profile);
                Ok(())
            }
        }
    }

    async fn publish(&mut self, rejected: Option<ChatError>) {
        let update = self.diff(rejected);
        if update.is_empty() && update.state.is_none() && update.widget.is_none() {
            return;
        }
        if self.updates.send(update).await.is_err() {
            tracing::debug!("Update receiver dropped");
        }
    }

    fn diff(&mut self, rejected: Option<ChatError>) -> SessionUpdate {
        let messages = self.session.messages();
        let newest = self.known.last().copied();

        let removed: Vec<MessageId> = self
            .known
            .iter()
            .filter(|id| !messages.iter().any(|m| m.id == **id))
            .copied()
            .collect();
        let appended: Vec<Message> = messages
            .iter()
            .filter(|m| newest.map_or(true, |n| m.id > n))
            .cloned()
            .collect();
        self.known = messages.iter().map(|m| m.id).collect();

        let state = self.session.state();
        let state_changed = state != self.last_state;
        self.last_state = state;

        let widget = self.session.widget().map(|(_, w)| w.describe());
        let widget_changed = widget != self.last_widget;
        let widget_closed = widget.is_none() && self.last_widget.is_some();
        self.last_widget = widget.clone();

        SessionUpdate {
            appended,
            removed,
            effects: self.session.take_effects(),
            state: state_changed.then_some(state),
            widget: if widget_changed { widget } else { None },
            widget_closed,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;
    use std::time::Duration;
    use travelcare_core::catalog::Catalog;
    use travelcare_core::config::TravelCareConfig;
    use travelcare_core::types::Sender;

    fn spawn() -> (
        tokio::task::JoinHandle<ChatSession>,
        SessionHandle,
        mpsc::Receiver<SessionUpdate>,
    ) {
        let session = ChatSession::new(&TravelCareConfig::default(), Arc::new(Catalog::demo()));
        let (driver, handle, updates) = SessionDriver::new(session, 16);
        (tokio::spawn(driver.run()), handle, updates)
    }

    async fn collect_until(
        updates: &mut mpsc::Receiver<SessionUpdate>,
        count: usize,
    ) -> Vec<Message> {
        let mut seen = Vec::new();
        while seen.len() < count {
            match updates.recv().await {
                Some(update) => seen.extend(update.appended),
                None => break,
            }
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_arrive_in_submission_order() {
        let (task, handle, mut updates) = spawn();

        handle.submit("hello").await.unwrap();
        handle.submit("emergency").await.unwrap();

        let seen = collect_until(&mut updates, 5).await;
        let texts: Vec<&str> = seen.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                response::GREETING,
                "hello",
                "emergency",
                response::FALLBACK_TEXT,
                response::EMERGENCY_TEXT,
            ]
        );

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_response_delay() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        let start = Instant::now();
        handle.submit("policy").await.unwrap();
        let seen = collect_until(&mut updates, 2).await;
        assert_eq!(seen[1].sender, Sender::Assistant);
        assert!(start.elapsed() >= Duration::from_millis(1500));

        handle.shutdown();
        let session = task.await.unwrap();
        assert!(session.has_widget());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_are_reported() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle.submit("   ").await.unwrap();
        let update = updates.recv().await.unwrap();
        assert_eq!(update.rejected, Some(ChatError::EmptyMessage));
        assert!(update.appended.is_empty());

        handle.send(SessionInput::DismissWidget).await.unwrap();
        let update = updates.recv().await.unwrap();
        assert_eq!(update.rejected, Some(ChatError::NoActiveWidget));

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_effects_are_published() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle
            .send(SessionInput::Dispatch(ActionId::Call112, ActionPayload::None))
            .await
            .unwrap();
        let update = updates.recv().await.unwrap();
        assert_eq!(
            update.effects,
            vec![Effect::OpenExternal {
                uri: "tel:112".to_string()
            }]
        );

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_reply() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle.submit("hello").await.unwrap();
        let update = updates.recv().await.unwrap();
        assert_eq!(update.appended.len(), 1);

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.pending_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_widget_interaction_through_handle() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle.submit("video call").await.unwrap();
        collect_until(&mut updates, 2).await;

        handle
            .interact(|w| w.telemedicine_mut()?.connect_to(3))
            .await
            .unwrap();
        let update = updates.recv().await.unwrap();
        assert!(update.widget.unwrap().contains("Connecting to Dr. Lisa Zhang"));

        let update = updates.recv().await.unwrap();
        assert!(update.widget.unwrap().contains("Connected to Dr. Lisa Zhang"));

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_drains_pending_replies() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle.submit("I need a doctor").await.unwrap();
        drop(handle);

        let session = task.await.unwrap();
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].sender, Sender::Assistant);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.pending_jobs(), 0);

        let seen = collect_until(&mut updates, 2).await;
        assert_eq!(seen.last().map(|m| m.sender), Some(Sender::Assistant));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_widget_is_published() {
        let (task, handle, mut updates) = spawn();
        collect_until(&mut updates, 1).await;

        handle.submit("policy").await.unwrap();
        collect_until(&mut updates, 2).await;

        handle.send(SessionInput::DismissWidget).await.unwrap();
        let update = updates.recv().await.unwrap();
        assert!(update.widget_closed);
        assert!(update.widget.is_none());
        assert_eq!(update.removed.len(), 1);

        handle.submit("hello").await.unwrap();
        let update = updates.recv().await.unwrap();
        assert!(!update.widget_closed);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_after_stop_fails() {
        let (task, handle, _updates) = spawn();
        handle.shutdown();
        task.await.unwrap();
        assert_eq!(
            handle.submit("hello").await.unwrap_err(),
            ChatError::SessionClosed
        );
    }
}
