use crate::models::Intent;

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Absence,
        &["justificar", "falta", "absència", "absent"],
    ),
    (
        Intent::TeacherContact,
        &["contactar", "professor", "tutor", "reunió", "cita", "parlar amb"],
    ),
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Keyword-containment intent detection. Absence is listed first and wins
/// when a message matches both keyword sets.
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();

    for (intent, keywords) in INTENT_KEYWORDS {
        if contains_any(&lower, keywords) {
            return *intent;
        }
    }

    Intent::None
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_absence_request() {
        assert_eq!(classify_intent("Vull justificar una falta"), Intent::Absence);
        assert_eq!(classify_intent("El meu fill ha estat absent"), Intent::Absence);
    }

    #[test]
    fn detects_teacher_contact_request() {
        assert_eq!(
            classify_intent("Vull parlar amb el tutor"),
            Intent::TeacherContact
        );
        assert_eq!(
            classify_intent("Necessito una reunió amb la professora"),
            Intent::TeacherContact
        );
    }

    #[test]
    fn plain_questions_have_no_intent() {
        assert_eq!(classify_intent("Quin és l'horari?"), Intent::None);
    }

    #[test]
    fn absence_wins_over_contact() {
        assert_eq!(
            classify_intent("Vull contactar el tutor per justificar una falta"),
            Intent::Absence
        );
    }

    #[test]
    fn substring_containment_is_intended() {
        // No word-boundary check: embedded keywords still count.
        assert_eq!(classify_intent("reunió extraordinària"), Intent::TeacherContact);
        assert_eq!(classify_intent("MAJÚSCULES AMB FALTA"), Intent::Absence);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  hola   món \n"), "hola món");
    }
}
