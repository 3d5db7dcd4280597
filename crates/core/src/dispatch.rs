use crate::intent::classify_intent;
use crate::language::detect_language;
use crate::models::{Classification, Intent, Language};

pub fn classify(text: &str, current: Language) -> Classification {
    Classification {
        intent: classify_intent(text),
        language: detect_language(text, current),
    }
}

/// What the caller must do next for a given utterance. The planner itself
/// performs no I/O and touches no UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    ShowAbsenceForm { language: Language },
    ShowTeacherForm { language: Language },
    SendToBackend { message: String, language: Language },
}

pub fn plan_dispatch(text: &str, current: Language) -> Dispatch {
    let language = detect_language(text, current);

    match classify_intent(text) {
        Intent::Absence => Dispatch::ShowAbsenceForm { language },
        Intent::TeacherContact => Dispatch::ShowTeacherForm { language },
        Intent::None => {
            let message = if language == Language::Catalan {
                text.to_string()
            } else {
                format!("{}{}", language.tag_prefix(), text)
            };
            Dispatch::SendToBackend { message, language }
        }
    }
}

impl Dispatch {
    pub fn intent(&self) -> Intent {
        match self {
            Self::ShowAbsenceForm { .. } => Intent::Absence,
            Self::ShowTeacherForm { .. } => Intent::TeacherContact,
            Self::SendToBackend { .. } => Intent::None,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Self::ShowAbsenceForm { language }
            | Self::ShowTeacherForm { language }
            | Self::SendToBackend { language, .. } => *language,
        }
    }
}
