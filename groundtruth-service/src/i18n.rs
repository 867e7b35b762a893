use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Locale every lookup falls back to before giving up
pub const FALLBACK_LOCALE: &str = "hi";

/// Wizard label keys, in the order the UI renders them
pub const LABEL_KEYS: &[&str] = &[
    "summary_title",
    "language",
    "location",
    "mandal_village",
    "not_selected",
    "edit",
    "next",
    "back",
    "lock_start",
    "gps_enforce",
    "gps_verified",
    "verifying",
];

/// Internationalization service using Fluent (thread-safe)
pub struct I18n {
    bundles: RwLock<HashMap<String, FluentBundle<FluentResource>>>,
    default_locale: String,
}

impl I18n {
    /// Create a new i18n service with the embedded label tables
    pub fn new() -> Self {
        let i18n = Self {
            bundles: RwLock::new(HashMap::new()),
            default_locale: FALLBACK_LOCALE.to_string(),
        };

        for (locale, content) in [("hi", HI_FTL), ("en", EN_FTL), ("te", TE_FTL)] {
            if let Err(e) = i18n.add_locale(locale, content) {
                warn!(locale, error = %e, "Failed to load embedded translations");
            }
        }

        i18n
    }

    /// Add a locale with translations
    pub fn add_locale(&self, locale: &str, content: &str) -> Result<(), String> {
        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|e| format!("Invalid locale '{}': {}", locale, e))?;

        let resource = FluentResource::try_new(content.to_string())
            .map_err(|(_, errors)| format!("Failed to parse Fluent resource: {:?}", errors))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        // Messages are interpolated into plain text and JSON, not bidi-aware markup
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| format!("Failed to add resource to bundle: {:?}", errors))?;

        let mut bundles = self.bundles.write().unwrap_or_else(PoisonError::into_inner);
        bundles.insert(locale.to_string(), bundle);

        debug!(locale = %locale, "Loaded translations");

        Ok(())
    }

    /// Whether a bundle is loaded for `locale`
    pub fn has_locale(&self, locale: &str) -> bool {
        self.bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(locale)
    }

    /// Get a translated message
    pub fn get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        // Requested locale, then the default, then English, then the key itself
        self.try_get(locale, key, args)
            .or_else(|| self.try_get(&self.default_locale, key, args))
            .or_else(|| self.try_get("en", key, args))
            .unwrap_or_else(|| key.to_string())
    }

    /// Try to get a translation from a specific locale
    fn try_get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundles = self.bundles.read().unwrap_or_else(PoisonError::into_inner);
        let bundle = bundles.get(locale)?;
        let message = bundle.get_message(key)?;
        let pattern = message.value()?;

        let mut errors = vec![];
        let result = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting errors");
        }

        Some(result.to_string())
    }

    /// Get a translated message with arguments
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (k, v) in args {
            fluent_args.set(*k, *v);
        }
        self.get(locale, key, Some(&fluent_args))
    }

    /// The full wizard label table for a locale. Unknown locales get the default table.
    pub fn labels(&self, locale: &str) -> BTreeMap<&'static str, String> {
        let locale = if self.has_locale(locale) {
            locale
        } else {
            &self.default_locale
        };

        LABEL_KEYS
            .iter()
            .map(|key| {
                let message_id = format!("label-{}", key.replace('_', "-"));
                (*key, self.get(locale, &message_id, None))
            })
            .collect()
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

const HI_FTL: &str = r#"
label-summary-title = आपकी पसंद
label-language = भाषा
label-location = स्थान
label-mandal-village = मंडल / गांव
label-not-selected = अभी तक चुना नहीं गया
label-edit = बदलें
label-next = अगला
label-back = पीछे
label-lock-start = पुष्टि करें और शुरू करें
label-gps-enforce = GPS के माध्यम से स्थान खोजें
label-gps-verified = GPS सत्यापित
label-verifying = सत्यापित कर रहे हैं...
"#;

const EN_FTL: &str = r#"
# Wizard labels
label-summary-title = Selection Summary
label-language = Language
label-location = Location
label-mandal-village = Mandal / Village
label-not-selected = Not selected yet
label-edit = Edit
label-next = Next
label-back = Back
label-lock-start = Lock & Start
label-gps-enforce = Enforce GPS Grounding
label-gps-verified = GPS Verified
label-verifying = Verifying...

# Errors
error-missing-credential = SYSTEM ERROR: Secure connection could not be established. Please retry later.
error-collaborator-interrupted = Safety protocol interruption: { $message }. Your location and parameters remain locked.
error-session-not-found = Session not found: { $id }
"#;

const TE_FTL: &str = r#"
label-summary-title = మీ ఎంపికలు
label-language = భాష
label-location = ప్రాంతం
label-mandal-village = మండలం / గ్రామం
label-not-selected = ఇంకా ఎంచుకోలేదు
label-edit = సవరించు
label-next = తర్వాత
label-back = వెనుకకు
label-lock-start = నిర్ధారించి ప్రారంభించండి
label-gps-enforce = GPS ద్వారా ప్రాంతాన్ని గుర్తించండి
label-gps-verified = GPS ధృవీకరించబడింది
label-verifying = ధృవీకరిస్తున్నాము...
"#;
