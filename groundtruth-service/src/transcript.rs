//! Conversation transcript for a single consultation.

use serde::{Deserialize, Serialize};

use crate::parser::{Citation, ParsedReply, WeatherReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
    /// Synthetic notice inserted when the context changes mid-consultation
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherReading>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_update: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            citations: None,
            weather: None,
            is_update: false,
        }
    }

    pub fn model(reply: ParsedReply) -> Self {
        Self {
            role: MessageRole::Model,
            text: reply.text,
            citations: Some(reply.citations),
            weather: reply.weather,
            is_update: false,
        }
    }

    pub fn system_update(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            text: text.into(),
            citations: None,
            weather: None,
            is_update: true,
        }
    }
}

/// Append-only, chronologically ordered list of turns
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the whole transcript, used when a fresh consultation starts
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// User and model turns in order; system notices never reach the collaborator.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .cloned()
            .collect()
    }

    /// Text of the opening question, if the transcript starts with one
    pub fn first_user_query(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.text.as_str())
    }

    /// First weather reading in the conversation, shown as the district panel
    pub fn first_weather(&self) -> Option<&WeatherReading> {
        self.messages.iter().find_map(|m| m.weather.as_ref())
    }
}
