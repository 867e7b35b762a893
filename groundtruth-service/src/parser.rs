//! Collaborator reply parsing.
//!
//! A reply is free text plus a list of grounding chunks. The text may carry one
//! embedded weather tag of the form
//! `[WEATHER: TEMP=<t>, RAIN=<r>, HUMIDITY=<h>, WIND=<w>, SOURCE=<s>]`, which is
//! lifted into a [`WeatherReading`] and removed from the displayed text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const DEFAULT_WEB_TITLE: &str = "Official Source";
const DEFAULT_MAPS_TITLE: &str = "Location Info";
const DEFAULT_WEATHER_SOURCE: &str = "Official Bulletin";

/// Temperatures above this many degrees raise a heat alert
const HEAT_RISK_THRESHOLD: i64 = 38;
/// Wind speeds above this raise a gust advisory
const WIND_RISK_THRESHOLD: i64 = 30;

static WEATHER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[WEATHER: TEMP=(.*?), RAIN=(.*?), HUMIDITY=(.*?), WIND=(.*?), SOURCE=(.*?)\]",
    )
    .expect("weather tag pattern is valid")
});

/// Any `[WEATHER:...]` fragment, including malformed ones
static LOOSE_WEATHER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[WEATHER:.*?\]").expect("loose weather pattern is valid"));

/// A normalized source link returned alongside an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Citation {
    Web { uri: String, title: String },
    Maps { uri: String, title: String },
}

impl Citation {
    pub fn uri(&self) -> &str {
        match self {
            Citation::Web { uri, .. } | Citation::Maps { uri, .. } => uri,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Citation::Web { title, .. } | Citation::Maps { title, .. } => title,
        }
    }
}

/// Grounding chunk as delivered by the collaborator, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGroundingChunk {
    #[serde(default)]
    pub web: Option<RawSource>,
    #[serde(default)]
    pub maps: Option<RawSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Weather values lifted from a reply. All fields are kept verbatim, units included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temp: String,
    pub rainfall: String,
    pub humidity: String,
    pub wind: String,
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskFlags {
    pub heat_risk: bool,
    pub wind_advisory: bool,
}

impl WeatherReading {
    pub fn is_heat_risk(&self) -> bool {
        leading_integer(&self.temp).is_some_and(|t| t > HEAT_RISK_THRESHOLD)
    }

    pub fn is_wind_advisory(&self) -> bool {
        leading_integer(&self.wind).is_some_and(|w| w > WIND_RISK_THRESHOLD)
    }

    pub fn risk_flags(&self) -> RiskFlags {
        RiskFlags {
            heat_risk: self.is_heat_risk(),
            wind_advisory: self.is_wind_advisory(),
        }
    }
}

/// Parsed reply ready to append to the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub text: String,
    pub citations: Vec<Citation>,
    pub weather: Option<WeatherReading>,
}

/// Parse a raw collaborator reply into display text, citations and weather.
pub fn parse_reply(raw_text: &str, chunks: &[RawGroundingChunk]) -> ParsedReply {
    let (text, weather) = extract_weather(raw_text);
    ParsedReply {
        text: text.trim().to_string(),
        citations: normalize_citations(chunks),
        weather,
    }
}

/// Keep chunks with a usable locator, preferring web over maps, in received order.
pub fn normalize_citations(chunks: &[RawGroundingChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .filter_map(|chunk| {
            if let Some((uri, title)) = usable(chunk.web.as_ref()) {
                return Some(Citation::Web {
                    uri,
                    title: title.unwrap_or_else(|| DEFAULT_WEB_TITLE.to_string()),
                });
            }
            usable(chunk.maps.as_ref()).map(|(uri, title)| Citation::Maps {
                uri,
                title: title.unwrap_or_else(|| DEFAULT_MAPS_TITLE.to_string()),
            })
        })
        .collect()
}

fn usable(source: Option<&RawSource>) -> Option<(String, Option<String>)> {
    let source = source?;
    let uri = source.uri.as_deref().filter(|u| !u.is_empty())?;
    let title = source.title.clone().filter(|t| !t.is_empty());
    Some((uri.to_string(), title))
}

/// Returns the text with the first weather tag removed, plus the reading if the tag
/// was well formed. Only the first occurrence is considered.
fn extract_weather(text: &str) -> (String, Option<WeatherReading>) {
    if let Some(caps) = WEATHER_TAG.captures(text) {
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
        let source = field(5);
        let reading = WeatherReading {
            temp: field(1),
            rainfall: field(2),
            humidity: field(3),
            wind: field(4),
            condition: if source.is_empty() {
                DEFAULT_WEATHER_SOURCE.to_string()
            } else {
                source
            },
        };
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let mut stripped = String::with_capacity(text.len());
        stripped.push_str(&text[..whole.start]);
        stripped.push_str(&text[whole.end..]);
        return (stripped, Some(reading));
    }

    (LOOSE_WEATHER_TAG.replace(text, "").into_owned(), None)
}

/// Integer prefix of a value such as `"41C"` or `" -3 km/h"`; `None` when there is no
/// leading number.
fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // An all-digit run only fails to parse on overflow
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}
