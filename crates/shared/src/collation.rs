//! Locale-style string ordering for display names.
//!
//! Levels follow the usual root collation: base letters first, then accents,
//! then case (lower before upper). Raw code points break any remaining tie so
//! the result is a total order.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| tertiary_key(a).cmp(&tertiary_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn secondary_key(s: &str) -> String {
    s.nfd().collect::<String>().to_lowercase()
}

// Upper-case letters sort after their lower-case form at this level.
fn tertiary_key(s: &str) -> Vec<bool> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_base_letters_ignoring_case() {
        assert_eq!(locale_compare("austria", "Australia"), Ordering::Greater);
        assert_eq!(locale_compare("India", "zambia"), Ordering::Less);
    }

    #[test]
    fn accented_letters_sort_next_to_their_base_letter() {
        let mut names = vec!["Zambia", "Åland Islands", "Afghanistan", "Bahamas"];
        names.sort_by(|a, b| locale_compare(a, b));
        assert_eq!(
            names,
            vec!["Afghanistan", "Åland Islands", "Bahamas", "Zambia"]
        );
    }

    #[test]
    fn accent_breaks_a_primary_tie() {
        assert_eq!(locale_compare("Cote", "Côte"), Ordering::Less);
    }

    #[test]
    fn lower_case_precedes_upper_case_on_a_full_tie() {
        assert_eq!(locale_compare("niger", "Niger"), Ordering::Less);
        assert_eq!(locale_compare("Niger", "Niger"), Ordering::Equal);
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        assert_eq!(locale_compare("Guinea", "Guinea-Bissau"), Ordering::Less);
    }
}
