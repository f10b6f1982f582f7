use std::io::Write;

use crate::db::JobRecord;

/// Column order of the flat export. Consumers rely on it; append only.
pub const COLUMNS: &[&str] = &[
    "source",
    "job_title",
    "company_name",
    "location",
    "city",
    "state",
    "country",
    "is_remote",
    "is_hybrid",
    "work_type",
    "salary_range",
    "min_annual_salary",
    "max_annual_salary",
    "posted_date",
    "job_description",
    "url",
];

fn to_row(r: &JobRecord) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        text(&r.source),
        text(&r.job_title),
        text(&r.company_name),
        text(&r.location),
        text(&r.city),
        text(&r.state),
        r.country.clone(),
        r.is_remote.to_string(),
        r.is_hybrid.to_string(),
        text(&r.work_type),
        text(&r.salary_range),
        r.salary.map(|s| s.min.to_string()).unwrap_or_default(),
        r.salary.map(|s| s.max.to_string()).unwrap_or_default(),
        r.posted_date.map(|d| d.to_string()).unwrap_or_default(),
        text(&r.job_description),
        r.url.clone(),
    ]
}

/// Write a header row then one row per job. Returns the number of data rows.
pub fn write_csv<W: Write>(w: W, jobs: &[JobRecord]) -> csv::Result<usize> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(COLUMNS)?;
    for job in jobs {
        wtr.write_record(to_row(job))?;
    }
    wtr.flush()?;
    Ok(jobs.len())
}
