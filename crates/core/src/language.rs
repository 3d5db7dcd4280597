use crate::models::Language;

const ARABIC_RANGES: [(u32, u32); 5] = [
    (0x0600, 0x06FF),
    (0x0750, 0x077F),
    (0x08A0, 0x08FF),
    (0xFB50, 0xFDFF),
    (0xFE70, 0xFEFF),
];

const CATALAN_MARKERS: &[&str] = &[
    "què",
    "com",
    "quan",
    "són",
    "està",
    "hem",
    "bon",
    "molt",
    "professor",
    "alumne",
    "institut",
    "bon dia",
    "bona tarda",
];

const SPANISH_MARKERS: &[&str] = &[
    "qué",
    "cómo",
    "cuándo",
    "son",
    "está",
    "hemos",
    "buen",
    "mucho",
    "profesor",
    "alumno",
    "instituto",
    "buenos días",
    "buenas tardes",
];

const CATALAN_PHRASES: &[&str] = &["com va", "bon dia", "bona tarda"];
const SPANISH_PHRASES: &[&str] = &["qué tal", "buenos días", "buenas tardes"];

/// Decides which language an utterance is most likely written in. An exact
/// score tie keeps `current` rather than guessing.
pub fn detect_language(text: &str, current: Language) -> Language {
    if contains_arabic(text) {
        return Language::Arabic;
    }

    let lower = text.to_lowercase();
    let catalan_score = marker_score(&lower, CATALAN_MARKERS, CATALAN_PHRASES);
    let spanish_score = marker_score(&lower, SPANISH_MARKERS, SPANISH_PHRASES);

    if spanish_score > catalan_score {
        Language::Spanish
    } else if catalan_score > spanish_score {
        Language::Catalan
    } else {
        current
    }
}

fn contains_arabic(text: &str) -> bool {
    text.chars().any(|ch| {
        let code = ch as u32;
        ARABIC_RANGES
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&code))
    })
}

fn marker_score(lower: &str, markers: &[&str], phrases: &[&str]) -> u32 {
    let mut score = 0;

    for marker in markers {
        if lower.contains(marker) {
            score += if marker.chars().count() > 3 { 2 } else { 1 };
        }
    }

    for phrase in phrases {
        if lower.contains(phrase) {
            score += 3;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_codepoints_win_unconditionally() {
        assert_eq!(
            detect_language("hola مرحبا bon dia", Language::Catalan),
            Language::Arabic
        );
        assert_eq!(detect_language("السلام عليكم", Language::Spanish), Language::Arabic);
    }

    #[test]
    fn catalan_greeting_beats_spanish_default() {
        assert_eq!(
            detect_language("Bon dia, com va?", Language::Spanish),
            Language::Catalan
        );
    }

    #[test]
    fn spanish_greeting_beats_catalan_default() {
        assert_eq!(
            detect_language("¿Qué tal estás?", Language::Catalan),
            Language::Spanish
        );
    }

    #[test]
    fn tie_keeps_current_language() {
        assert_eq!(detect_language("12345", Language::Spanish), Language::Spanish);
        assert_eq!(detect_language("12345", Language::Catalan), Language::Catalan);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            detect_language("BUENOS DÍAS", Language::Catalan),
            Language::Spanish
        );
    }
}
