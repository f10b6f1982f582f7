use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::IngestError;
use crate::normalize::RawJob;

pub const DEFAULT_SOURCES: &[&str] = &["seek", "jobsearch"];

/// Anything that hands over raw jobs: one implementation per job board
/// export. Site-specific scraping lives outside this crate.
pub trait JobSource {
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<Vec<RawJob>, IngestError>;
}

/// A scraper's JSON array output, e.g. `output/seek/seek_jobs.json`.
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        JsonFileSource {
            name: name.into(),
            path: path.into(),
        }
    }

    /// The conventional `<output_dir>/<name>/<name>_jobs.json` location.
    pub fn in_output_dir(output_dir: &Path, name: &str) -> Self {
        let path = output_dir.join(name).join(format!("{}_jobs.json", name));
        JsonFileSource::new(name, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JobSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// A missing file means the scraper produced nothing: warn, return empty.
    /// Records without their own `source` are tagged with this source's name.
    fn fetch(&self) -> Result<Vec<RawJob>, IngestError> {
        if !self.path.exists() {
            warn!("File not found: {:?}", self.path);
            return Ok(Vec::new());
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| IngestError::SourceIo {
            path: self.path.clone(),
            source,
        })?;
        let mut jobs: Vec<RawJob> =
            serde_json::from_str(&text).map_err(|source| IngestError::SourceFormat {
                path: self.path.clone(),
                source,
            })?;

        for job in &mut jobs {
            if job.source().is_none() {
                job.set("source", self.name.as_str());
            }
        }

        info!("Loaded {} jobs from {:?}", jobs.len(), self.path);
        Ok(jobs)
    }
}

/// Fetch every source in order, concatenated. A source that fails to load
/// is logged and contributes nothing; the rest are still ingested.
pub fn fetch_all(sources: &[Box<dyn JobSource>]) -> Vec<RawJob> {
    let mut all = Vec::new();
    for source in sources {
        match source.fetch() {
            Ok(jobs) => {
                info!(source = source.name(), count = jobs.len(), "source fetched");
                all.extend(jobs);
            }
            Err(e) => error!(source = source.name(), "Error loading source: {}", e),
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> JsonFileSource {
        let src = JsonFileSource::in_output_dir(dir, name);
        std::fs::create_dir_all(src.path().parent().unwrap()).unwrap();
        std::fs::write(src.path(), body).unwrap();
        src
    }

    #[test]
    fn conventional_path() {
        let src = JsonFileSource::in_output_dir(Path::new("output"), "seek");
        assert_eq!(src.path(), Path::new("output/seek/seek_jobs.json"));
        assert_eq!(src.name(), "seek");
    }

    #[test]
    fn tags_records_with_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(
            dir.path(),
            "jobsearch",
            r#"[
                {"job_title": "Dev", "url": "https://www.jobsearch.com.au/job/1"},
                {"job_title": "Ops", "url": null, "source": "manual"}
            ]"#,
        );
        let jobs = src.fetch().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].source(), Some("jobsearch"));
        assert_eq!(jobs[1].source(), Some("manual"));
        assert_eq!(jobs[1].get("url"), None);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let src = JsonFileSource::in_output_dir(dir.path(), "seek");
        assert!(src.fetch().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(dir.path(), "seek", "{ not json");
        assert!(matches!(src.fetch(), Err(IngestError::SourceFormat { .. })));
    }

    #[test]
    fn malformed_source_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let sources: Vec<Box<dyn JobSource>> = vec![
            Box::new(write(dir.path(), "seek", "{ truncated")),
            Box::new(write(
                dir.path(),
                "jobsearch",
                r#"[{"url": "https://www.jobsearch.com.au/job/1"}]"#,
            )),
        ];
        let jobs = fetch_all(&sources);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source(), Some("jobsearch"));
    }

    #[test]
    fn fetch_all_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sources: Vec<Box<dyn JobSource>> = vec![
            Box::new(write(dir.path(), "seek", r#"[{"url": "a"}]"#)),
            Box::new(write(dir.path(), "jobsearch", r#"[{"url": "b"}, {"url": "c"}]"#)),
        ];
        let jobs = fetch_all(&sources);
        let urls: Vec<_> = jobs.iter().map(|j| j.get("url").unwrap()).collect();
        assert_eq!(urls, ["a", "b", "c"]);
        assert_eq!(jobs[0].source(), Some("seek"));
    }
}
