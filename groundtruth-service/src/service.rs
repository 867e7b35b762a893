use chrono::Utc;
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::collaborator::ChatCollaborator;
use crate::config::SessionConfig;
use crate::context::EditTarget;
use crate::error::{ServiceError, ServiceResult};
use crate::i18n::I18n;
use crate::parser::parse_reply;
use crate::session::{PendingTurn, Session, SessionError, SessionSnapshot, TurnKind};
use crate::wizard::WizardInput;

/// Collaborator failures are always reported in English
const ERROR_LOCALE: &str = "en";

/// Main service coordinator: owns every live session
pub struct CopilotService {
    sessions: Arc<DashMap<Uuid, Session>>,
    collaborator: Arc<dyn ChatCollaborator>,
    pub i18n: Arc<I18n>,
    session_config: SessionConfig,
}

impl CopilotService {
    pub fn new(collaborator: Arc<dyn ChatCollaborator>, session_config: SessionConfig) -> Self {
        if !collaborator.is_configured() {
            warn!("No collaborator credential configured; consultations will fail");
        }

        Self {
            sessions: Arc::new(DashMap::new()),
            collaborator,
            i18n: Arc::new(I18n::new()),
            session_config,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn create_session(&self) -> SessionSnapshot {
        let id = Uuid::new_v4();
        let session = Session::new(id);
        let snapshot = session.snapshot();
        self.sessions.insert(id, session);

        counter!("groundtruth_sessions_created_total").increment(1);
        gauge!("groundtruth_sessions_active").set(self.sessions.len() as f64);
        info!(session_id = %id, "Session created");

        snapshot
    }

    pub fn snapshot(&self, id: Uuid) -> ServiceResult<SessionSnapshot> {
        self.sessions
            .get(&id)
            .map(|session| session.snapshot())
            .ok_or_else(|| not_found(id))
    }

    pub fn delete_session(&self, id: Uuid) -> ServiceResult<()> {
        self.sessions.remove(&id).ok_or_else(|| not_found(id))?;
        gauge!("groundtruth_sessions_active").set(self.sessions.len() as f64);
        debug!(session_id = %id, "Session deleted");
        Ok(())
    }

    /// Apply a wizard input; a completed edit dispatches the automatic follow-up
    pub async fn wizard_input(&self, id: Uuid, input: WizardInput) -> ServiceResult<SessionSnapshot> {
        if let Some(turn) = self.with_session(id, |session| session.apply_wizard(input))? {
            info!(session_id = %id, "Context edited, requesting updated assessment");
            self.dispatch(id, turn).await;
        }
        self.snapshot(id)
    }

    pub fn set_query(&self, id: Uuid, text: String) -> ServiceResult<SessionSnapshot> {
        self.with_session(id, |session| session.set_query_text(text))?;
        self.snapshot(id)
    }

    /// Submit the opening question, optionally replacing the draft first
    pub async fn submit_query(&self, id: Uuid, text: Option<String>) -> ServiceResult<SessionSnapshot> {
        let turn = self.with_session(id, |session| {
            if let Some(text) = text {
                session.set_query_text(text)?;
            }
            session.begin_query()
        })?;
        self.dispatch(id, turn).await;
        self.snapshot(id)
    }

    /// Ask a follow-up. A no-op while another turn is in flight.
    pub async fn follow_up(&self, id: Uuid, text: &str) -> ServiceResult<SessionSnapshot> {
        match self.with_session(id, |session| session.begin_follow_up(text))? {
            Some(turn) => self.dispatch(id, turn).await,
            None => debug!(session_id = %id, "Follow-up ignored, turn already in flight"),
        }
        self.snapshot(id)
    }

    pub fn open_edit(&self, id: Uuid, target: EditTarget) -> ServiceResult<SessionSnapshot> {
        self.with_session(id, |session| session.open_edit(target))?;
        self.snapshot(id)
    }

    pub fn cancel_edit(&self, id: Uuid) -> ServiceResult<SessionSnapshot> {
        self.with_session(id, Session::cancel_edit)?;
        self.snapshot(id)
    }

    pub fn reset(&self, id: Uuid) -> ServiceResult<SessionSnapshot> {
        self.with_session(id, Session::reset)?;
        self.snapshot(id)
    }

    /// Drop sessions idle for longer than the configured TTL
    pub fn cleanup_idle_sessions(&self) -> usize {
        let now = Utc::now();
        let ttl = self.session_config.ttl();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_expired(now, ttl));
        let removed = before.saturating_sub(self.sessions.len());

        if removed > 0 {
            counter!("groundtruth_sessions_evicted_total").increment(removed as u64);
            gauge!("groundtruth_sessions_active").set(self.sessions.len() as f64);
        }
        removed
    }

    /// Run `f` under the session's entry lock. The lock is released on return.
    fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> ServiceResult<T> {
        let mut session = self.sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        Ok(f(&mut session)?)
    }

    /// Send a pending turn and apply the outcome.
    ///
    /// The turn runs on its own task, so it completes even when the caller's
    /// future is dropped. No session lock is held while waiting.
    async fn dispatch(&self, id: Uuid, turn: PendingTurn) {
        let sessions = self.sessions.clone();
        let collaborator = self.collaborator.clone();
        let i18n = self.i18n.clone();
        let turn_id = turn.id;

        let task = tokio::spawn(async move {
            run_turn(&sessions, collaborator.as_ref(), &i18n, id, turn).await;
        });
        if let Err(e) = task.await {
            error!(session_id = %id, turn_id = %turn_id, error = %e, "Turn task failed");
        }
    }
}

async fn run_turn(
    sessions: &DashMap<Uuid, Session>,
    collaborator: &dyn ChatCollaborator,
    i18n: &I18n,
    id: Uuid,
    turn: PendingTurn,
) {
    let kind = match turn.kind {
        TurnKind::Initial => "initial",
        TurnKind::FollowUp => "follow_up",
    };
    counter!("groundtruth_turns_dispatched_total", "kind" => kind).increment(1);
    debug!(session_id = %id, turn_id = %turn.id, kind, "Dispatching turn");

    let outcome = match collaborator.send(turn.request).await {
        Ok(reply) => Ok(parse_reply(&reply.text, &reply.grounding)),
        Err(e) => {
            warn!(session_id = %id, turn_id = %turn.id, error = %e, "Collaborator turn failed");
            counter!("groundtruth_turns_failed_total", "kind" => kind).increment(1);
            Err(e.user_message(i18n, ERROR_LOCALE))
        }
    };

    let applied = sessions
        .get_mut(&id)
        .is_some_and(|mut session| session.complete_turn(turn.id, outcome));
    if !applied {
        debug!(session_id = %id, turn_id = %turn.id, "Discarded result for a turn no longer expected");
    }
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::SessionNotFound {
        session_id: id.to_string(),
    }
}
