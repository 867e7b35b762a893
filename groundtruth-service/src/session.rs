//! Consultation session state machine.
//!
//! A session moves `Setup -> Idle -> Loading -> Consulting`, with `Editing` as a
//! detour from `Consulting`. Collaborator turns are split in two: a `begin_*` call
//! performs the transition and hands back a [`PendingTurn`], and
//! [`Session::complete_turn`] applies the outcome once the call returns. Nothing in
//! here awaits, so callers can hold the session lock for each half without holding
//! it across the network call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

use crate::collaborator::TurnRequest;
use crate::context::{Context, EditTarget, PartialContext};
use crate::parser::{ParsedReply, RiskFlags, WeatherReading};
use crate::prompts::{SAFETY_DISCLAIMER, UPDATED_ASSESSMENT_PROMPT};
use crate::transcript::{ChatMessage, Transcript};
use crate::wizard::{Wizard, WizardError, WizardInput, WizardStatus, WizardView};

const UPDATE_PREFIX: &str = "SYSTEM UPDATE: Parameters modified.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionMode {
    Setup,
    Idle,
    Loading,
    Consulting,
    Editing,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot {action} while the session is in {mode} mode")]
    InvalidTransition {
        action: &'static str,
        mode: SessionMode,
    },

    #[error("Query text is empty")]
    EmptyQuery,

    #[error("No locked context is available")]
    MissingContext,

    #[error("{0}")]
    Wizard(#[from] WizardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Opening question; success starts a fresh transcript
    Initial,
    FollowUp,
}

/// A collaborator call the session is waiting on
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub id: Uuid,
    pub kind: TurnKind,
    pub request: TurnRequest,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: Uuid,
    kind: TurnKind,
    query: String,
}

/// District weather panel: the first reading of the consultation plus its flags
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPanel {
    #[serde(flatten)]
    pub reading: WeatherReading,
    pub risk: RiskFlags,
}

/// Everything a renderer needs, in one serializable value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub mode: SessionMode,
    pub summary: PartialContext,
    pub summary_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_target: Option<EditTarget>,
    pub query_text: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherPanel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<&'static str>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    mode: SessionMode,
    context: Option<Context>,
    partial: PartialContext,
    wizard: Option<Wizard>,
    edit_target: Option<EditTarget>,
    query_text: String,
    transcript: Transcript,
    error: Option<String>,
    in_flight: Option<InFlight>,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let wizard = Wizard::new();
        let now = Utc::now();
        Self {
            id,
            mode: SessionMode::Setup,
            context: None,
            partial: wizard.partial(),
            wizard: Some(wizard),
            edit_target: None,
            query_text: String::new(),
            transcript: Transcript::new(),
            error: None,
            in_flight: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Whether the session has been idle for longer than `ttl`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.last_active > ttl,
            Err(_) => false,
        }
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            mode: self.mode,
        }
    }

    /// Feed one wizard input. In edit mode a completion may produce the automatic
    /// follow-up turn, which the caller must dispatch.
    pub fn apply_wizard(&mut self, input: WizardInput) -> Result<Option<PendingTurn>, SessionError> {
        let mode = self.mode;
        let wizard = match (&mut self.wizard, mode) {
            (Some(wizard), SessionMode::Setup | SessionMode::Editing) => wizard,
            _ => {
                return Err(SessionError::InvalidTransition {
                    action: "use the wizard",
                    mode,
                });
            }
        };
        let output = wizard.apply(input)?;
        self.touch();

        if self.mode == SessionMode::Setup {
            self.partial = output.partial;
        }

        match output.status {
            WizardStatus::Open => Ok(None),
            WizardStatus::Cancelled => {
                self.wizard = None;
                self.edit_target = None;
                self.mode = SessionMode::Consulting;
                Ok(None)
            }
            WizardStatus::Completed(context) if self.mode == SessionMode::Setup => {
                self.partial = context.to_partial();
                self.context = Some(context);
                self.wizard = None;
                self.mode = SessionMode::Idle;
                Ok(None)
            }
            WizardStatus::Completed(context) => {
                let notice = self
                    .context
                    .as_ref()
                    .map(|previous| change_notice(previous, &context))
                    .unwrap_or_else(|| UPDATE_PREFIX.to_string());
                self.transcript.push(ChatMessage::system_update(notice));
                self.partial = context.to_partial();
                self.context = Some(context);
                self.wizard = None;
                self.edit_target = None;
                self.mode = SessionMode::Consulting;
                self.begin_follow_up(UPDATED_ASSESSMENT_PROMPT)
            }
        }
    }

    /// Replace the draft opening question
    pub fn set_query_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        if self.mode != SessionMode::Idle {
            return Err(self.invalid("edit the query"));
        }
        self.query_text = text.into();
        self.touch();
        Ok(())
    }

    /// Submit the draft question. Moves to `Loading` until the turn completes.
    pub fn begin_query(&mut self) -> Result<PendingTurn, SessionError> {
        if self.mode != SessionMode::Idle {
            return Err(self.invalid("submit a query"));
        }
        if self.query_text.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let context = self.context.clone().ok_or(SessionError::MissingContext)?;

        let query = self.query_text.clone();
        let id = Uuid::new_v4();
        self.in_flight = Some(InFlight {
            id,
            kind: TurnKind::Initial,
            query: query.clone(),
        });
        self.error = None;
        self.mode = SessionMode::Loading;
        self.touch();

        Ok(PendingTurn {
            id,
            kind: TurnKind::Initial,
            request: TurnRequest {
                context,
                history: Vec::new(),
                query,
            },
        })
    }

    /// Ask a follow-up question. Returns `Ok(None)` when a turn is already in
    /// flight; the question is dropped without touching the transcript.
    pub fn begin_follow_up(&mut self, text: &str) -> Result<Option<PendingTurn>, SessionError> {
        if self.mode != SessionMode::Consulting {
            return Err(self.invalid("ask a follow-up"));
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if self.in_flight.is_some() {
            return Ok(None);
        }
        let context = self.context.clone().ok_or(SessionError::MissingContext)?;

        let history = self.transcript.history();
        self.transcript.push(ChatMessage::user(text));

        let id = Uuid::new_v4();
        self.in_flight = Some(InFlight {
            id,
            kind: TurnKind::FollowUp,
            query: text.to_string(),
        });
        self.touch();

        Ok(Some(PendingTurn {
            id,
            kind: TurnKind::FollowUp,
            request: TurnRequest {
                context,
                history,
                query: text.to_string(),
            },
        }))
    }

    /// Apply the outcome of a turn. Returns `false` when the session no longer
    /// expects `turn_id` and the outcome was discarded.
    pub fn complete_turn(&mut self, turn_id: Uuid, outcome: Result<ParsedReply, String>) -> bool {
        let Some(in_flight) = self.in_flight.take_if(|f| f.id == turn_id) else {
            return false;
        };
        self.touch();

        match (in_flight.kind, outcome) {
            (TurnKind::Initial, Ok(reply)) => {
                self.transcript.replace(vec![
                    ChatMessage::user(in_flight.query),
                    ChatMessage::model(reply),
                ]);
                self.mode = SessionMode::Consulting;
            }
            (TurnKind::Initial, Err(message)) => {
                self.error = Some(message);
                self.mode = SessionMode::Idle;
            }
            (TurnKind::FollowUp, Ok(reply)) => {
                self.transcript.push(ChatMessage::model(reply));
            }
            (TurnKind::FollowUp, Err(message)) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Open one part of the locked context for editing.
    ///
    /// The query target skips the wizard: it returns to `Idle` with the opening
    /// question restored as the draft.
    pub fn open_edit(&mut self, target: EditTarget) -> Result<(), SessionError> {
        if self.mode != SessionMode::Consulting {
            return Err(self.invalid("open an edit"));
        }

        if target == EditTarget::Query {
            self.query_text = self
                .transcript
                .first_user_query()
                .unwrap_or_default()
                .to_string();
            self.in_flight = None;
            self.mode = SessionMode::Idle;
        } else {
            let context = self.context.as_ref().ok_or(SessionError::MissingContext)?;
            self.wizard = Some(Wizard::editing(context, target)?);
            self.edit_target = Some(target);
            self.mode = SessionMode::Editing;
        }
        self.touch();
        Ok(())
    }

    pub fn cancel_edit(&mut self) -> Result<(), SessionError> {
        if self.mode != SessionMode::Editing {
            return Err(self.invalid("cancel an edit"));
        }
        self.wizard = None;
        self.edit_target = None;
        self.mode = SessionMode::Consulting;
        self.touch();
        Ok(())
    }

    /// Start a new consultation with the same context
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.mode != SessionMode::Consulting {
            return Err(self.invalid("reset"));
        }
        self.transcript.clear();
        self.query_text.clear();
        self.error = None;
        self.in_flight = None;
        self.mode = SessionMode::Idle;
        self.touch();
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let summary = match self.mode {
            SessionMode::Setup => self.partial.clone(),
            _ => self
                .context
                .as_ref()
                .map(Context::to_partial)
                .unwrap_or_else(|| self.partial.clone()),
        };
        let consulting = matches!(self.mode, SessionMode::Consulting | SessionMode::Editing);

        SessionSnapshot {
            id: self.id,
            mode: self.mode,
            summary_visible: summary.summary_visible(),
            summary,
            context: self.context.clone(),
            wizard: self.wizard.as_ref().map(Wizard::view),
            edit_target: self.edit_target,
            query_text: self.query_text.clone(),
            messages: self.transcript.messages().to_vec(),
            error: self.error.clone(),
            pending: self.in_flight.is_some(),
            weather: self.transcript.first_weather().map(|reading| WeatherPanel {
                risk: reading.risk_flags(),
                reading: reading.clone(),
            }),
            disclaimer: consulting.then_some(SAFETY_DISCLAIMER),
            created_at: self.created_at,
            last_active: self.last_active,
        }
    }
}

/// Summarize what changed between two locked contexts, one clause per group
pub fn change_notice(previous: &Context, updated: &Context) -> String {
    let mut changes = Vec::new();

    if previous.language != updated.language {
        changes.push(format!("Language changed to {}", updated.language.code()));
    }
    if previous.state != updated.state
        || previous.district != updated.district
        || previous.mandal != updated.mandal
        || previous.village != updated.village
    {
        changes.push(format!(
            "Location adjusted to {}, {}",
            updated.village.as_deref().unwrap_or_default(),
            updated.district
        ));
    }
    if previous.intent != updated.intent || previous.crop_or_task != updated.crop_or_task {
        changes.push(format!(
            "Investigation focus shifted to {} ({})",
            updated.crop_or_task, updated.intent
        ));
    }

    if changes.is_empty() {
        UPDATE_PREFIX.to_string()
    } else {
        format!("{UPDATE_PREFIX} {}", changes.join(". "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Intent, Language};
    use crate::transcript::MessageRole;

    fn reply(text: &str) -> ParsedReply {
        ParsedReply {
            text: text.to_string(),
            citations: vec![],
            weather: None,
        }
    }

    fn setup_inputs() -> Vec<WizardInput> {
        vec![
            WizardInput::SelectLanguage {
                language: Language::Te,
            },
            WizardInput::SelectState {
                state: "Telangana".to_string(),
            },
            WizardInput::SelectDistrict {
                district: "Warangal".to_string(),
            },
            WizardInput::Next,
            WizardInput::SetMandal {
                value: "Hanamkonda".to_string(),
            },
            WizardInput::SetVillage {
                value: "Kazipet".to_string(),
            },
            WizardInput::Next,
            WizardInput::SelectIntent {
                intent: Intent::CropAdvisory,
            },
            WizardInput::SetTopic {
                value: "Paddy".to_string(),
            },
            WizardInput::Submit,
        ]
    }

    fn idle_session() -> Session {
        let mut session = Session::new(Uuid::new_v4());
        for input in setup_inputs() {
            assert!(session.apply_wizard(input).unwrap().is_none());
        }
        assert_eq!(session.mode, SessionMode::Idle);
        session
    }

    fn consulting_session() -> Session {
        let mut session = idle_session();
        session.set_query_text("When should I transplant?").unwrap();
        let turn = session.begin_query().unwrap();
        assert!(session.complete_turn(turn.id, Ok(reply("After the first rains."))));
        assert_eq!(session.mode, SessionMode::Consulting);
        session
    }

    #[test]
    fn test_setup_tracks_partial_context() {
        let mut session = Session::new(Uuid::new_v4());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, SessionMode::Setup);
        assert!(snapshot.summary_visible, "hindi is preselected");

        session
            .apply_wizard(WizardInput::SelectLanguage {
                language: Language::Ta,
            })
            .unwrap();
        assert_eq!(session.snapshot().summary.language, Some(Language::Ta));
        assert!(session.snapshot().wizard.is_some());
    }

    #[test]
    fn test_setup_completion_locks_context() {
        let session = idle_session();
        let ctx = session.context.as_ref().unwrap();
        assert_eq!(ctx.district, "Warangal");
        assert_eq!(ctx.village.as_deref(), Some("Kazipet"));
        assert!(session.snapshot().wizard.is_none());
    }

    #[test]
    fn test_rejected_wizard_input_changes_nothing() {
        let mut session = Session::new(Uuid::new_v4());
        let err = session
            .apply_wizard(WizardInput::SetTopic {
                value: "Cotton".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Wizard(_)));
        assert_eq!(session.mode, SessionMode::Setup);
        assert_eq!(session.snapshot().summary.crop_or_task.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut session = idle_session();
        session.set_query_text("   ").unwrap();
        assert!(matches!(session.begin_query(), Err(SessionError::EmptyQuery)));
        assert_eq!(session.mode, SessionMode::Idle);
    }

    #[test]
    fn test_initial_query_success() {
        let mut session = idle_session();
        session.set_query_text("Is it safe to spray?").unwrap();
        let turn = session.begin_query().unwrap();

        assert_eq!(turn.kind, TurnKind::Initial);
        assert!(turn.request.history.is_empty());
        assert_eq!(session.mode, SessionMode::Loading);
        assert!(matches!(
            session.begin_query(),
            Err(SessionError::InvalidTransition {
                mode: SessionMode::Loading,
                ..
            })
        ));

        assert!(session.complete_turn(turn.id, Ok(reply("Wait for calm wind."))));
        let messages = session.transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "Is it safe to spray?");
        assert_eq!(messages[1].role, MessageRole::Model);
        assert_eq!(session.snapshot().disclaimer, Some(SAFETY_DISCLAIMER));
    }

    #[test]
    fn test_initial_query_failure_returns_to_idle() {
        let mut session = idle_session();
        session.set_query_text("Mandi prices?").unwrap();
        let turn = session.begin_query().unwrap();

        assert!(session.complete_turn(turn.id, Err("offline".to_string())));
        assert_eq!(session.mode, SessionMode::Idle);
        assert_eq!(session.error.as_deref(), Some("offline"));
        assert!(session.transcript.messages().is_empty());
        assert_eq!(session.query_text, "Mandi prices?");

        // A fresh submit clears the previous error
        session.begin_query().unwrap();
        assert_eq!(session.error.as_deref(), None);
    }

    #[test]
    fn test_follow_up_appends_turns() {
        let mut session = consulting_session();
        let turn = session
            .begin_follow_up("And for cotton?")
            .unwrap()
            .unwrap();

        assert_eq!(turn.request.history.len(), 2);
        assert_eq!(session.transcript.messages().len(), 3);
        assert!(session.snapshot().pending);

        assert!(session.complete_turn(turn.id, Ok(reply("Cotton needs more water."))));
        assert_eq!(session.transcript.messages().len(), 4);
        assert!(!session.in_flight.is_some());
    }

    #[test]
    fn test_follow_up_while_in_flight_is_noop() {
        let mut session = consulting_session();
        let first = session.begin_follow_up("First?").unwrap().unwrap();
        let len = session.transcript.messages().len();

        assert!(session.begin_follow_up("Second?").unwrap().is_none());
        assert_eq!(session.transcript.messages().len(), len);
        assert!(session.complete_turn(first.id, Ok(reply("Answer"))));
    }

    #[test]
    fn test_follow_up_failure_keeps_transcript() {
        let mut session = consulting_session();
        let turn = session.begin_follow_up("Any subsidy?").unwrap().unwrap();

        assert!(session.complete_turn(turn.id, Err("quota".to_string())));
        assert_eq!(session.mode, SessionMode::Consulting);
        assert_eq!(session.error.as_deref(), Some("quota"));
        assert_eq!(session.transcript.messages().len(), 3);
        assert_eq!(
            session.transcript.messages()[2].role,
            MessageRole::User,
            "the question stays visible"
        );
    }

    #[test]
    fn test_language_edit_inserts_notice_and_follow_up() {
        let mut session = consulting_session();
        session.open_edit(EditTarget::Language).unwrap();
        assert_eq!(session.mode, SessionMode::Editing);
        assert_eq!(session.snapshot().edit_target, Some(EditTarget::Language));

        let turn = session
            .apply_wizard(WizardInput::SelectLanguage {
                language: Language::En,
            })
            .unwrap()
            .expect("follow-up issued");

        assert_eq!(session.mode, SessionMode::Consulting);
        assert_eq!(session.context.as_ref().unwrap().language, Language::En);

        let messages = session.transcript.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].role, MessageRole::System);
        assert!(messages[2].is_update);
        assert_eq!(
            messages[2].text,
            "SYSTEM UPDATE: Parameters modified. Language changed to en"
        );
        assert_eq!(messages[3].text, UPDATED_ASSESSMENT_PROMPT);

        assert_eq!(turn.request.query, UPDATED_ASSESSMENT_PROMPT);
        assert_eq!(turn.request.context.language, Language::En);
        assert!(
            turn.request
                .history
                .iter()
                .all(|m| m.role != MessageRole::System)
        );
    }

    #[test]
    fn test_edit_while_follow_up_in_flight_skips_auto_follow_up() {
        let mut session = consulting_session();
        session.begin_follow_up("Pending?").unwrap().unwrap();
        session.open_edit(EditTarget::Language).unwrap();

        let turn = session
            .apply_wizard(WizardInput::SelectLanguage {
                language: Language::Hi,
            })
            .unwrap();
        assert!(turn.is_none());
        assert_eq!(
            session.transcript.messages().last().unwrap().role,
            MessageRole::System
        );
    }

    #[test]
    fn test_cancel_edit_changes_nothing() {
        let mut session = consulting_session();
        let before = session.context.clone();
        session.open_edit(EditTarget::Assumptions).unwrap();
        session
            .apply_wizard(WizardInput::SetVillage {
                value: "Elsewhere".to_string(),
            })
            .unwrap();
        session.cancel_edit().unwrap();

        assert_eq!(session.mode, SessionMode::Consulting);
        assert_eq!(session.context.clone(), before);
        assert_eq!(session.transcript.messages().len(), 2);
    }

    #[test]
    fn test_wizard_cancel_input_returns_to_consulting() {
        let mut session = consulting_session();
        session.open_edit(EditTarget::Location).unwrap();
        assert!(session.apply_wizard(WizardInput::Cancel).unwrap().is_none());
        assert_eq!(session.mode, SessionMode::Consulting);
    }

    #[test]
    fn test_query_edit_restores_first_question() {
        let mut session = consulting_session();
        session.open_edit(EditTarget::Query).unwrap();

        assert_eq!(session.mode, SessionMode::Idle);
        assert_eq!(session.query_text, "When should I transplant?");
        assert_eq!(session.context.as_ref().unwrap().crop_or_task, "Paddy");
    }

    #[test]
    fn test_reset_clears_consultation() {
        let mut session = consulting_session();
        let turn = session.begin_follow_up("Fertilizer?").unwrap().unwrap();
        let ctx = session.context.clone();

        session.reset().unwrap();
        assert_eq!(session.mode, SessionMode::Idle);
        assert!(session.transcript.messages().is_empty());
        assert_eq!(session.query_text, "");
        assert_eq!(session.error.as_deref(), None);
        assert_eq!(session.context.clone(), ctx);

        // The reply to the abandoned turn is discarded
        assert!(!session.complete_turn(turn.id, Ok(reply("Late"))));
        assert!(session.transcript.messages().is_empty());
    }

    #[test]
    fn test_invalid_transitions_leave_session_unchanged() {
        let mut session = Session::new(Uuid::new_v4());
        assert!(matches!(
            session.reset(),
            Err(SessionError::InvalidTransition {
                mode: SessionMode::Setup,
                ..
            })
        ));
        assert!(session.open_edit(EditTarget::Language).is_err());
        assert!(session.begin_follow_up("hello").is_err());
        assert!(session.set_query_text("hello").is_err());
        assert_eq!(session.mode, SessionMode::Setup);

        let mut session = idle_session();
        assert!(session.cancel_edit().is_err());
        assert!(session.apply_wizard(WizardInput::Next).is_err());
        assert_eq!(session.mode, SessionMode::Idle);
    }

    #[test]
    fn test_change_notice_groups() {
        let previous = Context {
            state: "Telangana".to_string(),
            district: "Warangal".to_string(),
            mandal: Some("Hanamkonda".to_string()),
            village: Some("Kazipet".to_string()),
            intent: Intent::CropAdvisory,
            crop_or_task: "Paddy".to_string(),
            language: Language::Te,
            location: None,
        };
        let mut updated = previous.clone();
        updated.district = "Khammam".to_string();
        updated.village = Some("Wyra".to_string());
        updated.intent = Intent::MarketPrices;
        updated.crop_or_task = "Chilli".to_string();

        assert_eq!(
            change_notice(&previous, &updated),
            "SYSTEM UPDATE: Parameters modified. Location adjusted to Wyra, Khammam. \
             Investigation focus shifted to Chilli (Market Prices & Nearest Mandis)"
        );
        assert_eq!(change_notice(&previous, &previous), UPDATE_PREFIX);
    }

    #[test]
    fn test_weather_panel_flags() {
        let mut session = idle_session();
        session.set_query_text("Weather?").unwrap();
        let turn = session.begin_query().unwrap();
        let parsed = crate::parser::parse_reply(
            "Hot day. [WEATHER: TEMP=41°C, RAIN=0mm, HUMIDITY=20%, WIND=12 km/h, SOURCE=IMD]",
            &[],
        );
        session.complete_turn(turn.id, Ok(parsed));

        let panel = session.snapshot().weather.unwrap();
        assert_eq!(panel.reading.temp, "41°C");
        assert!(panel.risk.heat_risk);
        assert!(!panel.risk.wind_advisory);
    }

    #[test]
    fn test_expiry() {
        let session = Session::new(Uuid::new_v4());
        let ttl = std::time::Duration::from_secs(60);
        assert!(!session.is_expired(Utc::now(), ttl));
        assert!(session.is_expired(Utc::now() + chrono::Duration::seconds(61), ttl));
    }
}
