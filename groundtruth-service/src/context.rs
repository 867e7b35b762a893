//! Consultation context: the locked parameters that scope every collaborator turn.
//!
//! A [`Context`] is produced by the wizard once every phase is valid. Until then the
//! wizard keeps emitting [`PartialContext`] snapshots for the live summary strip.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Supported consultation languages, keyed by their ISO 639-1 code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hi,
    En,
    Bn,
    Te,
    Mr,
    Ta,
    Gu,
    Kn,
    Ml,
    Pa,
}

impl Language {
    /// Language code as sent to the collaborator and used for label lookup
    pub fn code(&self) -> &'static str {
        match self {
            Language::Hi => "hi",
            Language::En => "en",
            Language::Bn => "bn",
            Language::Te => "te",
            Language::Mr => "mr",
            Language::Ta => "ta",
            Language::Gu => "gu",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Pa => "pa",
        }
    }

    /// Display name in the native script with the English name alongside
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Hi => "हिन्दी (Hindi)",
            Language::En => "English",
            Language::Bn => "বাংলা (Bengali)",
            Language::Te => "తెలుగు (Telugu)",
            Language::Mr => "मराठी (Marathi)",
            Language::Ta => "தமிழ் (Tamil)",
            Language::Gu => "ગુજરાતી (Gujarati)",
            Language::Kn => "ಕನ್ನಡ (Kannada)",
            Language::Ml => "മലയാളം (Malayalam)",
            Language::Pa => "ਪੰਜਾਬੀ (Punjabi)",
        }
    }

    pub fn all() -> Vec<Language> {
        Language::iter().collect()
    }
}

/// Primary consultation intents offered in the final wizard phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize)]
pub enum Intent {
    #[strum(serialize = "Crop & Input Advisory")]
    #[serde(rename = "Crop & Input Advisory")]
    CropAdvisory,
    #[strum(serialize = "Safety & Occupational Health")]
    #[serde(rename = "Safety & Occupational Health")]
    SafetyHealth,
    #[strum(serialize = "Market Prices & Nearest Mandis")]
    #[serde(rename = "Market Prices & Nearest Mandis")]
    MarketPrices,
    #[strum(serialize = "Wages, Labor Rights & Entitlements")]
    #[serde(rename = "Wages, Labor Rights & Entitlements")]
    LaborRights,
    #[strum(serialize = "Government Schemes & Compliance")]
    #[serde(rename = "Government Schemes & Compliance")]
    GovernmentSchemes,
}

impl Intent {
    pub fn all() -> Vec<Intent> {
        Intent::iter().collect()
    }
}

/// Which part of a locked context the user asked to change mid-consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
    Language,
    /// State and district, followed by mandal and village
    Location,
    /// Mandal and village only
    Assumptions,
    /// Re-open the first question for editing; does not involve the wizard
    Query,
}

/// Device coordinates used to bias map retrieval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A locked consultation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub state: String,
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    pub intent: Intent,
    pub crop_or_task: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Context {
    /// True when every required field carries a value.
    ///
    /// Language and intent are typed, so only the free-text fields can be empty.
    pub fn is_locked(&self) -> bool {
        !self.state.is_empty() && !self.district.is_empty() && !self.crop_or_task.is_empty()
    }

    pub fn to_partial(&self) -> PartialContext {
        PartialContext {
            state: Some(self.state.clone()),
            district: Some(self.district.clone()),
            mandal: self.mandal.clone(),
            village: self.village.clone(),
            intent: Some(self.intent),
            crop_or_task: Some(self.crop_or_task.clone()),
            language: Some(self.language),
            location: self.location,
        }
    }
}

/// Work-in-progress context shown in the summary strip while the wizard is open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_or_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl PartialContext {
    /// The summary strip is only shown once a language has been chosen
    pub fn summary_visible(&self) -> bool {
        self.language.is_some()
    }
}
