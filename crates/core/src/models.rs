use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Catalan,
    Spanish,
    Arabic,
}

impl Default for Language {
    fn default() -> Self {
        Self::Catalan
    }
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "ca" || v == "ca-es" || v == "catalan" || v == "català" => {
                Some(Self::Catalan)
            }
            Some(v) if v == "es" || v == "es-es" || v == "spanish" || v == "castellano" => {
                Some(Self::Spanish)
            }
            Some(v) if v == "ar" || v == "ar-ma" || v == "arabic" || v == "àrab" => {
                Some(Self::Arabic)
            }
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Catalan => "ca",
            Self::Spanish => "es",
            Self::Arabic => "ar",
        }
    }

    /// Tag prepended to outbound backend messages, e.g. `[ES] `.
    pub fn tag_prefix(self) -> &'static str {
        match self {
            Self::Catalan => "[CA] ",
            Self::Spanish => "[ES] ",
            Self::Arabic => "[AR] ",
        }
    }

    pub fn from_tag_prefix(text: &str) -> Option<(Self, &str)> {
        for language in [Self::Catalan, Self::Spanish, Self::Arabic] {
            if let Some(rest) = text.strip_prefix(language.tag_prefix()) {
                return Some((language, rest));
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    None,
    Absence,
    TeacherContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: Option<String>,
    pub message: String,
    pub language: Option<String>,
    pub user_name: Option<String>,
    pub user_contact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAction {
    None,
    ShowAbsenceForm,
    ShowTeacherForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply_text: String,
    pub action: ReplyAction,
    pub language: Language,
    pub intent: Intent,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub at: DateTime<Utc>,
    pub user_text: String,
    pub assistant_text: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub user_name: Option<String>,
    pub user_contact: Option<String>,
    pub language: Language,
    pub expires_at: DateTime<Utc>,
    pub turns: Vec<ConversationTurn>,
}
