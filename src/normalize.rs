use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::db::JobRecord;
use crate::error::IngestError;
use crate::parser::{location, posted, salary};

// Producers name the same field differently; first non-empty key wins.
const COMPANY_KEYS: &[&str] = &["company_name", "advertiser_name"];
const SALARY_KEYS: &[&str] = &["salary_range", "salary"];
const POSTED_KEYS: &[&str] = &["posted_text", "posting_time", "posted"];

/// One job as a producer emitted it: a flat map of text fields.
/// Nulls and blank strings are dropped on the way in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawJob {
    fields: BTreeMap<String, String>,
}

impl From<Map<String, Value>> for RawJob {
    fn from(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .filter_map(|(k, v)| value_to_text(&v).map(|t| (k, t)))
            .collect();
        RawJob { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawJob {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawJob::default();
        for (k, v) in iter {
            raw.set(k, v);
        }
        raw
    }
}

impl RawJob {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Identifier lookups ignore surrounding whitespace.
    fn key_field(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim)
    }

    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Set a field verbatim. Blank values remove it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.fields.remove(&key);
        } else {
            self.fields.insert(key, value);
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.key_field("source")
    }
}

/// Arrays of badges ("Full time", "Hybrid") are joined; objects are dropped.
fn value_to_text(v: &Value) -> Option<String> {
    let text = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => String::new(),
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Turns raw producer fields into a [`JobRecord`]. `now` is the ingestion
/// time every relative date is resolved against.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub now: NaiveDateTime,
    pub country: String,
}

impl Normalizer {
    pub fn new(now: NaiveDateTime) -> Self {
        Normalizer {
            now,
            country: location::DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn normalize(&self, raw: &RawJob) -> Result<JobRecord, IngestError> {
        let Some(url) = raw.key_field("url") else {
            return Err(IngestError::MissingIdentifier {
                source_name: raw.source().unwrap_or("unknown").to_string(),
            });
        };

        let owned = |key: &str| raw.get(key).map(str::to_string);
        let job_title = owned("job_title");
        let location_text = owned("location");
        let work_type = owned("work_type");
        let job_description = owned("job_description");
        let salary_range = raw.first_of(SALARY_KEYS).map(str::to_string);
        let posted_text = raw.first_of(POSTED_KEYS);

        let salary = salary::parse(salary_range.as_deref());
        if salary.is_none() && salary_range.is_some() {
            debug!(url, salary = ?salary_range, "no figures in salary text");
        }

        let posted_date = posted::resolve(posted_text, self.now)
            .or_else(|| self.iso_posted_date(raw.get("posted_date")));
        if posted_date.is_none() && posted_text.is_some() {
            debug!(url, posted = ?posted_text, "unrecognised posted text");
        }

        let loc = location::decompose_in(location_text.as_deref(), &self.country);
        let (is_remote, is_hybrid) = work_arrangement(&[
            job_title.as_deref(),
            location_text.as_deref(),
            work_type.as_deref(),
            job_description.as_deref(),
        ]);

        Ok(JobRecord {
            url: url.to_string(),
            source: owned("source"),
            job_title,
            company_name: raw.first_of(COMPANY_KEYS).map(str::to_string),
            location: location_text,
            city: loc.city,
            state: loc.state,
            country: loc.country,
            is_remote,
            is_hybrid,
            classification: owned("classification"),
            work_type,
            salary_range,
            salary,
            posted_date,
            job_description,
        })
    }

    /// Some producers resolve the date themselves. Future dates are refused.
    fn iso_posted_date(&self, text: Option<&str>) -> Option<NaiveDate> {
        let date = NaiveDate::parse_from_str(text?, "%Y-%m-%d").ok()?;
        (date <= self.now.date()).then_some(date)
    }
}

/// Flags come from the first field that mentions either arrangement, so a
/// title saying "Hybrid" wins over a description that mentions "remote".
fn work_arrangement(fields: &[Option<&str>]) -> (bool, bool) {
    for text in fields.iter().flatten() {
        let lower = text.to_lowercase();
        let remote = lower.contains("remote");
        let hybrid = lower.contains("hybrid");
        if remote || hybrid {
            return (remote, hybrid);
        }
    }
    (false, false)
}

// ── Tests ──
