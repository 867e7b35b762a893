//! Context wizard: the four-phase form that produces a locked [`Context`].
//!
//! Phases run in order (language, jurisdiction, sub-locality, intent & topic) and
//! forward navigation is gated on the current phase being valid. Every accepted
//! input yields a [`WizardOutput`] carrying the current [`PartialContext`], so the
//! caller can render a live summary even while the form is incomplete.
//!
//! A wizard opened for editing is pinned to one [`EditTarget`] and completes as soon
//! as that target is confirmed, keeping the previously locked values for every
//! other field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog;
use crate::context::{Context, EditTarget, GeoPoint, Intent, Language, PartialContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Language,
    Jurisdiction,
    SubLocality,
    IntentTopic,
}

impl WizardPhase {
    fn next(self) -> Option<Self> {
        match self {
            WizardPhase::Language => Some(WizardPhase::Jurisdiction),
            WizardPhase::Jurisdiction => Some(WizardPhase::SubLocality),
            WizardPhase::SubLocality => Some(WizardPhase::IntentTopic),
            WizardPhase::IntentTopic => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardPhase::Language => None,
            WizardPhase::Jurisdiction => Some(WizardPhase::Language),
            WizardPhase::SubLocality => Some(WizardPhase::Jurisdiction),
            WizardPhase::IntentTopic => Some(WizardPhase::SubLocality),
        }
    }
}

/// A single user action on the wizard form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardInput {
    SelectLanguage { language: Language },
    SelectState { state: String },
    SelectDistrict { district: String },
    /// Device location lookup started
    RequestLocation,
    LocationResolved { latitude: f64, longitude: f64 },
    /// Device location unavailable or denied; ignored apart from clearing the flag
    LocationFailed,
    SetMandal { value: String },
    SetVillage { value: String },
    SelectIntent { intent: Intent },
    SetTopic { value: String },
    Next,
    Back,
    Submit,
    Cancel,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("The {phase:?} phase is not complete yet")]
    PhaseInvalid { phase: WizardPhase },

    #[error("This field is not part of the {phase:?} phase")]
    FieldNotInPhase { phase: WizardPhase },

    #[error("Unknown state: {state}")]
    UnknownState { state: String },

    #[error("District {district} is not part of {state}")]
    UnknownDistrict { state: String, district: String },

    #[error("Choose a state before choosing a district")]
    StateRequired,

    #[error("Navigation is not available while editing")]
    NavigationUnavailable,

    #[error("Cancel is only available while editing")]
    CancelUnavailable,

    #[error("The {target} target is not edited through the wizard")]
    NotWizardTarget { target: EditTarget },

    #[error("The wizard has already finished")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum WizardMode {
    Setup,
    Edit(EditTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStatus {
    Open,
    Completed(Context),
    Cancelled,
}

/// Result of an accepted input
#[derive(Debug, Clone, PartialEq)]
pub struct WizardOutput {
    pub partial: PartialContext,
    pub phase: WizardPhase,
    pub status: WizardStatus,
}

/// Serializable view of the wizard for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub mode: WizardMode,
    pub phase: WizardPhase,
    pub phase_valid: bool,
    pub locating: bool,
    pub districts: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct Wizard {
    mode: WizardMode,
    phase: WizardPhase,
    finished: bool,
    language: Option<Language>,
    state: String,
    district: String,
    mandal: String,
    village: String,
    intent: Option<Intent>,
    topic: String,
    location: Option<GeoPoint>,
    locating: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    /// A fresh setup wizard. Hindi is preselected.
    pub fn new() -> Self {
        Self {
            mode: WizardMode::Setup,
            phase: WizardPhase::Language,
            finished: false,
            language: Some(Language::default()),
            state: String::new(),
            district: String::new(),
            mandal: String::new(),
            village: String::new(),
            intent: None,
            topic: String::new(),
            location: None,
            locating: false,
        }
    }

    /// A wizard pinned to `target`, prefilled from the locked context
    pub fn editing(context: &Context, target: EditTarget) -> Result<Self, WizardError> {
        let phase = match target {
            EditTarget::Language => WizardPhase::Language,
            EditTarget::Location => WizardPhase::Jurisdiction,
            EditTarget::Assumptions => WizardPhase::SubLocality,
            EditTarget::Query => return Err(WizardError::NotWizardTarget { target }),
        };

        Ok(Self {
            mode: WizardMode::Edit(target),
            phase,
            finished: false,
            language: Some(context.language),
            state: context.state.clone(),
            district: context.district.clone(),
            mandal: context.mandal.clone().unwrap_or_default(),
            village: context.village.clone().unwrap_or_default(),
            intent: Some(context.intent),
            topic: context.crop_or_task.clone(),
            location: context.location,
            locating: false,
        })
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            mode: self.mode,
            phase: self.phase,
            phase_valid: self.is_phase_valid(self.phase),
            locating: self.locating,
            districts: catalog::districts(&self.state),
        }
    }

    pub fn is_phase_valid(&self, phase: WizardPhase) -> bool {
        match phase {
            WizardPhase::Language => self.language.is_some(),
            WizardPhase::Jurisdiction => !self.state.is_empty() && !self.district.is_empty(),
            WizardPhase::SubLocality => {
                !self.mandal.trim().is_empty() && !self.village.trim().is_empty()
            }
            WizardPhase::IntentTopic => self.intent.is_some() && !self.topic.is_empty(),
        }
    }

    pub fn partial(&self) -> PartialContext {
        PartialContext {
            state: Some(self.state.clone()),
            district: Some(self.district.clone()),
            mandal: Some(self.mandal.clone()),
            village: Some(self.village.clone()),
            intent: self.intent,
            crop_or_task: Some(self.topic.clone()),
            language: self.language,
            location: self.location,
        }
    }

    /// Apply one input. Rejected inputs leave the wizard unchanged.
    pub fn apply(&mut self, input: WizardInput) -> Result<WizardOutput, WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }

        match input {
            WizardInput::SelectLanguage { language } => {
                self.require_phase(WizardPhase::Language)?;
                self.language = Some(language);
                return match self.mode {
                    WizardMode::Setup => {
                        self.phase = WizardPhase::Jurisdiction;
                        Ok(self.output(WizardStatus::Open))
                    }
                    WizardMode::Edit(_) => self.complete(),
                };
            }
            WizardInput::SelectState { state } => {
                self.require_phase(WizardPhase::Jurisdiction)?;
                if !catalog::is_known_state(&state) {
                    return Err(WizardError::UnknownState { state });
                }
                if self.state != state {
                    self.state = state;
                    self.district.clear();
                }
            }
            WizardInput::SelectDistrict { district } => {
                self.require_phase(WizardPhase::Jurisdiction)?;
                if self.state.is_empty() {
                    return Err(WizardError::StateRequired);
                }
                if !catalog::is_known_district(&self.state, &district) {
                    return Err(WizardError::UnknownDistrict {
                        state: self.state.clone(),
                        district,
                    });
                }
                self.district = district;
            }
            WizardInput::RequestLocation => {
                self.require_phase(WizardPhase::Jurisdiction)?;
                self.locating = true;
            }
            WizardInput::LocationResolved {
                latitude,
                longitude,
            } => {
                self.location = Some(GeoPoint {
                    latitude,
                    longitude,
                });
                self.locating = false;
            }
            WizardInput::LocationFailed => {
                self.locating = false;
            }
            WizardInput::SetMandal { value } => {
                self.require_phase(WizardPhase::SubLocality)?;
                self.mandal = value;
            }
            WizardInput::SetVillage { value } => {
                self.require_phase(WizardPhase::SubLocality)?;
                self.village = value;
            }
            WizardInput::SelectIntent { intent } => {
                self.require_phase(WizardPhase::IntentTopic)?;
                self.intent = Some(intent);
            }
            WizardInput::SetTopic { value } => {
                self.require_phase(WizardPhase::IntentTopic)?;
                self.topic = value;
            }
            WizardInput::Next => return self.advance(),
            WizardInput::Back => {
                if self.mode != WizardMode::Setup {
                    return Err(WizardError::NavigationUnavailable);
                }
                if let Some(previous) = self.phase.previous() {
                    self.phase = previous;
                }
            }
            WizardInput::Submit => return self.submit(),
            WizardInput::Cancel => {
                if self.mode == WizardMode::Setup {
                    return Err(WizardError::CancelUnavailable);
                }
                self.finished = true;
                return Ok(self.output(WizardStatus::Cancelled));
            }
        }

        Ok(self.output(WizardStatus::Open))
    }

    fn require_phase(&self, phase: WizardPhase) -> Result<(), WizardError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(WizardError::FieldNotInPhase { phase: self.phase })
        }
    }

    fn advance(&mut self) -> Result<WizardOutput, WizardError> {
        if !self.is_phase_valid(self.phase) {
            return Err(WizardError::PhaseInvalid { phase: self.phase });
        }

        // A location edit walks jurisdiction then sub-locality before completing
        let last_phase = match self.mode {
            WizardMode::Setup => WizardPhase::IntentTopic,
            WizardMode::Edit(EditTarget::Location) => WizardPhase::SubLocality,
            WizardMode::Edit(_) => self.phase,
        };

        if self.phase >= last_phase {
            return self.submit();
        }
        match self.phase.next() {
            Some(next) => {
                self.phase = next;
                Ok(self.output(WizardStatus::Open))
            }
            None => self.submit(),
        }
    }

    fn submit(&mut self) -> Result<WizardOutput, WizardError> {
        let required: &[WizardPhase] = match self.mode {
            WizardMode::Setup => &[
                WizardPhase::Language,
                WizardPhase::Jurisdiction,
                WizardPhase::SubLocality,
                WizardPhase::IntentTopic,
            ],
            WizardMode::Edit(EditTarget::Location) => {
                &[WizardPhase::Jurisdiction, WizardPhase::SubLocality]
            }
            WizardMode::Edit(_) => std::slice::from_ref(&self.phase),
        };

        if let Some(&phase) = required.iter().find(|&&p| !self.is_phase_valid(p)) {
            return Err(WizardError::PhaseInvalid { phase });
        }
        if self.mode == WizardMode::Setup && self.phase != WizardPhase::IntentTopic {
            return Err(WizardError::FieldNotInPhase { phase: self.phase });
        }
        if self.mode == WizardMode::Edit(EditTarget::Location)
            && self.phase != WizardPhase::SubLocality
        {
            return Err(WizardError::PhaseInvalid { phase: self.phase });
        }

        self.complete()
    }

    fn complete(&mut self) -> Result<WizardOutput, WizardError> {
        let context = self.build_context()?;
        self.finished = true;
        Ok(self.output(WizardStatus::Completed(context)))
    }

    fn build_context(&self) -> Result<Context, WizardError> {
        let language = self.language.ok_or(WizardError::PhaseInvalid {
            phase: WizardPhase::Language,
        })?;
        let intent = self.intent.ok_or(WizardError::PhaseInvalid {
            phase: WizardPhase::IntentTopic,
        })?;

        let context = Context {
            state: self.state.clone(),
            district: self.district.clone(),
            mandal: non_empty(&self.mandal),
            village: non_empty(&self.village),
            intent,
            crop_or_task: self.topic.clone(),
            language,
            location: self.location,
        };

        if context.is_locked() {
            Ok(context)
        } else {
            Err(WizardError::PhaseInvalid { phase: self.phase })
        }
    }

    fn output(&self, status: WizardStatus) -> WizardOutput {
        WizardOutput {
            partial: self.partial(),
            phase: self.phase,
            status,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
