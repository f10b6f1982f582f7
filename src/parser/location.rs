use std::sync::LazyLock;

use regex::Regex;

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static TRAILING_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+([A-Z]{2,3})$").unwrap());

pub const DEFAULT_COUNTRY: &str = "Australia";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
}

impl Location {
    fn unknown(country: &str) -> Self {
        Location {
            city: None,
            state: None,
            country: country.to_string(),
        }
    }
}

/// Split a location like "Richmond, Melbourne VIC (Hybrid)" into city and
/// state. `country` is attached as given; the text never overrides it.
pub fn decompose_in(text: Option<&str>, country: &str) -> Location {
    let Some(text) = text else {
        return Location::unknown(country);
    };

    // Work-arrangement hints like "(Hybrid)" are read by the caller.
    let cleaned = PAREN_RE.replace_all(text, " ");
    let segments: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let (city, state) = match segments.as_slice() {
        [] => (None, None),
        [only] => match TRAILING_CODE_RE.captures(only) {
            Some(caps) => (Some(caps[1].trim().to_string()), Some(caps[2].to_string())),
            None => (Some(only.to_string()), None),
        },
        [first, .., last] => {
            // A bare "NSW" and a spelled-out "Western Australia" both pass through as-is.
            let state = TRAILING_CODE_RE
                .captures(last)
                .map(|caps| caps[2].to_string())
                .unwrap_or_else(|| last.to_string());
            (Some(first.to_string()), Some(state))
        }
    };

    Location {
        city,
        state,
        country: country.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompose(text: Option<&str>) -> Location {
        decompose_in(text, DEFAULT_COUNTRY)
    }

    fn parts(text: &str) -> (Option<String>, Option<String>) {
        let loc = decompose(Some(text));
        assert_eq!(loc.country, DEFAULT_COUNTRY);
        (loc.city, loc.state)
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn city_with_state_code() {
        assert_eq!(parts("Brisbane QLD"), (some("Brisbane"), some("QLD")));
        assert_eq!(parts("Gold Coast QLD"), (some("Gold Coast"), some("QLD")));
        assert_eq!(parts("Darwin NT"), (some("Darwin"), some("NT")));
    }

    #[test]
    fn single_segment_without_code() {
        assert_eq!(parts("Brisbane"), (some("Brisbane"), None));
        assert_eq!(parts("Brisbane Qld"), (some("Brisbane Qld"), None));
    }

    #[test]
    fn comma_then_bare_code() {
        assert_eq!(parts("Sydney, NSW"), (some("Sydney"), some("NSW")));
    }

    #[test]
    fn suburb_then_city_with_code() {
        assert_eq!(
            parts("Richmond, Melbourne VIC"),
            (some("Richmond"), some("VIC"))
        );
        assert_eq!(
            parts("Fortitude Valley, Brisbane, Brisbane QLD"),
            (some("Fortitude Valley"), some("QLD"))
        );
    }

    #[test]
    fn last_segment_verbatim_fallback() {
        assert_eq!(
            parts("Perth, Western Australia"),
            (some("Perth"), some("Western Australia"))
        );
    }

    #[test]
    fn parenthetical_hints_stripped() {
        assert_eq!(parts("Brisbane QLD (Hybrid)"), (some("Brisbane"), some("QLD")));
        assert_eq!(
            parts("Sydney (Remote), NSW"),
            (some("Sydney"), some("NSW"))
        );
        assert_eq!(parts("(Remote)"), (None, None));
    }

    #[test]
    fn empty_segments_ignored() {
        assert_eq!(parts("Adelaide SA, "), (some("Adelaide"), some("SA")));
        assert_eq!(parts(" , "), (None, None));
    }

    #[test]
    fn missing_text_keeps_default_country() {
        assert_eq!(decompose(None), Location::unknown(DEFAULT_COUNTRY));
        assert_eq!(decompose(Some("")), Location::unknown(DEFAULT_COUNTRY));
    }

    #[test]
    fn explicit_country() {
        let loc = decompose_in(Some("Auckland"), "New Zealand");
        assert_eq!(loc.city.as_deref(), Some("Auckland"));
        assert_eq!(loc.country, "New Zealand");
    }
}
