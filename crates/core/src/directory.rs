use crate::models::Teacher;

pub const EMAIL_DOMAIN: &str = "inscalaf.cat";

/// Roster used to seed an empty directory store.
pub fn default_roster() -> Vec<Teacher> {
    [
        ("Jordi Pipó", "jordi.pipo@inscalaf.cat"),
        ("Anna Bresolí", "anna.bresoli@inscalaf.cat"),
        ("Gerard Corominas", "gerard.corominas@inscalaf.cat"),
        ("Roger Codina", "roger.codina@inscalaf.cat"),
    ]
    .into_iter()
    .map(|(name, email)| Teacher {
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

/// Exact-name directory lookup, falling back to a synthetic address derived
/// from the display name.
pub fn resolve_teacher_email(name: &str, roster: &[Teacher]) -> String {
    roster
        .iter()
        .find(|teacher| teacher.name == name)
        .map(|teacher| teacher.email.clone())
        .unwrap_or_else(|| format!("{}@{}", email_slug(name), EMAIL_DOMAIN))
}

/// Lower-cases, strips diacritics, joins words with dots and drops anything
/// outside `[a-z0-9.]`.
pub fn email_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .chars()
        .map(fold_diacritic)
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '.')
        .collect()
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ä' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_accents_and_joins_with_dots() {
        assert_eq!(email_slug("Jordi Pipó"), "jordi.pipo");
        assert_eq!(email_slug("Anna Bresolí"), "anna.bresoli");
        assert_eq!(email_slug("Natàlia Muñoz"), "natalia.munoz");
    }

    #[test]
    fn slug_drops_foreign_punctuation() {
        assert_eq!(email_slug("Lluís  Puig-Oriol"), "lluis.puigoriol");
        assert_eq!(email_slug("M. Àngels"), "m..angels");
    }

    #[test]
    fn known_teachers_resolve_from_the_roster() {
        let roster = default_roster();
        assert_eq!(
            resolve_teacher_email("Roger Codina", &roster),
            "roger.codina@inscalaf.cat"
        );
    }

    #[test]
    fn unknown_teachers_get_a_synthetic_address() {
        let roster = default_roster();
        assert_eq!(
            resolve_teacher_email("Natàlia Muñoz", &roster),
            "natalia.munoz@inscalaf.cat"
        );
    }
}
