use std::sync::LazyLock;

use regex::Regex;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(k)?").unwrap());

const HOURS_PER_YEAR: f64 = 2080.0; // 40 * 52
const DAYS_PER_YEAR: f64 = 260.0; // 5 * 52
const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Bare figures below this with no period keyword are hourly rates.
const HOURLY_CEILING: f64 = 200.0;

/// Period markers, checked in order. First hit wins. Markers must stand as
/// words so "three", "holiday" or "Monday" never read as a rate, and plurals
/// ("three weeks leave") describe benefits rather than the pay period.
static PERIODS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"\b(?:hour|hourly|hr)\b|/\s*h(?:rs?|our)?\b|\bp\.?h\b", HOURS_PER_YEAR),
        (r"\b(?:day|daily)\b|/\s*d(?:ay)?\b|\bp\.?d\b", DAYS_PER_YEAR),
        (r"\b(?:week|weekly|wk)\b|/\s*w(?:k|eek)?\b|\bp\.?w\b", WEEKS_PER_YEAR),
        (r"\b(?:month|monthly|mth)\b|/\s*m(?:th|onth)?\b|\bp\.?m\b", MONTHS_PER_YEAR),
    ]
    .into_iter()
    .map(|(pattern, m)| (Regex::new(pattern).unwrap(), m))
    .collect()
});

/// Annualized salary range in whole currency units. `min <= max` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualSalary {
    pub min: i64,
    pub max: i64,
}

/// Parse free-text salary like "$100k - $120k" or "$50 per hour" into an
/// annual range. Returns `None` when the text holds no figures.
pub fn parse(text: Option<&str>) -> Option<AnnualSalary> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_lowercase().replace(',', "");
    let values: Vec<f64> = AMOUNT_RE
        .captures_iter(&lower)
        .filter_map(|caps| {
            let n = caps[1].parse::<f64>().ok()?;
            Some(if caps.get(2).is_some() { n * 1000.0 } else { n })
        })
        .collect();

    if values.is_empty() {
        return None;
    }

    let multiplier = period_multiplier(&lower).unwrap_or_else(|| {
        if values.iter().all(|v| *v < HOURLY_CEILING) {
            HOURS_PER_YEAR
        } else {
            1.0
        }
    });

    let mut annual: Vec<i64> = values.iter().map(|v| (v * multiplier) as i64).collect();
    annual.sort_unstable();

    Some(AnnualSalary {
        min: annual[0],
        max: annual[annual.len() - 1],
    })
}

fn period_multiplier(lower: &str) -> Option<f64> {
    PERIODS
        .iter()
        .find(|(re, _)| re.is_match(lower))
        .map(|(_, m)| *m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> Option<(i64, i64)> {
        parse(Some(text)).map(|s| (s.min, s.max))
    }

    #[test]
    fn k_suffix_range() {
        assert_eq!(range("$100k - $120k"), Some((100_000, 120_000)));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(range("100,000 - 120,000"), Some((100_000, 120_000)));
        assert_eq!(range("$100000"), Some((100_000, 100_000)));
    }

    #[test]
    fn hourly_rate() {
        assert_eq!(range("$50 per hour"), Some((104_000, 104_000)));
        assert_eq!(range("$30.50/hr"), Some((63_440, 63_440)));
    }

    #[test]
    fn daily_rate() {
        assert_eq!(range("$800 per day"), Some((208_000, 208_000)));
    }

    #[test]
    fn weekly_and_monthly() {
        assert_eq!(range("$2,000 per week"), Some((104_000, 104_000)));
        assert_eq!(range("$9,000 - $10,000 monthly"), Some((108_000, 120_000)));
    }

    #[test]
    fn period_words_inside_other_words_ignored() {
        assert_eq!(range("$120k + three weeks leave"), Some((120_000, 120_000)));
        assert_eq!(range("$95,000 package, holiday loading"), Some((95_000, 95_000)));
        assert_eq!(range("Monday to Friday $110k"), Some((110_000, 110_000)));
    }

    #[test]
    fn slash_and_abbreviated_periods() {
        assert_eq!(range("$45/h"), Some((93_600, 93_600)));
        assert_eq!(range("$600/day"), Some((156_000, 156_000)));
        assert_eq!(range("$1,500 p.w."), Some((78_000, 78_000)));
        assert_eq!(range("$8k/mth"), Some((96_000, 96_000)));
    }

    #[test]
    fn qualifier_text_ignored() {
        assert_eq!(range("80k + super"), Some((80_000, 80_000)));
    }

    #[test]
    fn bare_small_numbers_are_hourly() {
        assert_eq!(range("45 - 55"), Some((93_600, 114_400)));
    }

    #[test]
    fn fractional_results_truncate() {
        // 33.33 * 2080 = 69326.4
        assert_eq!(range("$33.33 p.h."), Some((69_326, 69_326)));
    }

    #[test]
    fn no_digits() {
        assert_eq!(range("Some text"), None);
        assert_eq!(range("Competitive salary + bonus"), None);
        assert_eq!(parse(Some("   ")), None);
        assert_eq!(parse(None), None);
    }

    #[test]
    fn min_never_exceeds_max() {
        for text in [
            "$140k - $120k",
            "$120,000 + 11% super",
            "from 95k to 85k",
            "$60 - $45 per hour",
            "3 - 1 - 2",
        ] {
            let s = parse(Some(text)).unwrap();
            assert!(s.min <= s.max, "{text}: {s:?}");
        }
    }
}
