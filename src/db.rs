use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::parser::AnnualSalary;

const MEMORY_URL: &str = ":memory:";

/// Open the store named by `database_url`: a file path, `sqlite://path`,
/// `sqlite:path`, or `:memory:`.
pub fn connect(database_url: &str) -> Result<Connection> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if path == MEMORY_URL {
        return Ok(Connection::open_in_memory()?);
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id                INTEGER PRIMARY KEY,
            url               TEXT UNIQUE NOT NULL,
            source            TEXT,
            job_title         TEXT,
            company_name      TEXT,
            location          TEXT,
            city              TEXT,
            state             TEXT,
            country           TEXT NOT NULL DEFAULT 'Australia',
            is_remote         BOOLEAN NOT NULL DEFAULT 0,
            is_hybrid         BOOLEAN NOT NULL DEFAULT 0,
            classification    TEXT,
            work_type         TEXT,
            salary_range      TEXT,
            min_annual_salary INTEGER,
            max_annual_salary INTEGER,
            posted_date       TEXT,
            job_description   TEXT,
            created_at        TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at        TEXT,
            CHECK ((min_annual_salary IS NULL) = (max_annual_salary IS NULL)),
            CHECK (min_annual_salary <= max_annual_salary)
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_source ON jobs(source);
        CREATE INDEX IF NOT EXISTS idx_jobs_title ON jobs(job_title);
        CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company_name);
        CREATE INDEX IF NOT EXISTS idx_jobs_state ON jobs(state);
        ",
    )?;
    Ok(())
}

pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS jobs;")?;
    Ok(())
}

// ── Records ──

/// A normalized job, ready to be stored. `url` is the natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub url: String,
    pub source: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub classification: Option<String>,
    pub work_type: Option<String>,
    pub salary_range: Option<String>,
    pub salary: Option<AnnualSalary>,
    pub posted_date: Option<NaiveDate>,
    pub job_description: Option<String>,
}

// ── Upsert ──

/// How an existing row absorbs an incoming record for the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MergePolicy {
    /// Every field takes the incoming value, nulls included.
    #[default]
    Overwrite,
    /// Incoming nulls leave the stored value in place.
    KeepExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

const INSERT_SQL: &str = "INSERT INTO jobs
     (url, source, job_title, company_name, location, city, state, country,
      is_remote, is_hybrid, classification, work_type, salary_range,
      min_annual_salary, max_annual_salary, posted_date, job_description)
     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)";

const OVERWRITE_SQL: &str = "UPDATE jobs SET
     source = ?2, job_title = ?3, company_name = ?4, location = ?5,
     city = ?6, state = ?7, country = ?8, is_remote = ?9, is_hybrid = ?10,
     classification = ?11, work_type = ?12, salary_range = ?13,
     min_annual_salary = ?14, max_annual_salary = ?15, posted_date = ?16,
     job_description = ?17, updated_at = datetime('now')
     WHERE url = ?1";

// Salary min/max are null together on both sides, so per-column COALESCE
// keeps the pair intact.
const KEEP_EXISTING_SQL: &str = "UPDATE jobs SET
     source = COALESCE(?2, source), job_title = COALESCE(?3, job_title),
     company_name = COALESCE(?4, company_name), location = COALESCE(?5, location),
     city = COALESCE(?6, city), state = COALESCE(?7, state), country = ?8,
     is_remote = ?9, is_hybrid = ?10,
     classification = COALESCE(?11, classification), work_type = COALESCE(?12, work_type),
     salary_range = COALESCE(?13, salary_range),
     min_annual_salary = COALESCE(?14, min_annual_salary),
     max_annual_salary = COALESCE(?15, max_annual_salary),
     posted_date = COALESCE(?16, posted_date),
     job_description = COALESCE(?17, job_description), updated_at = datetime('now')
     WHERE url = ?1";

/// Insert `record`, or merge it into the row already stored under its URL.
/// `created_at` is written once on insert and never touched again.
pub fn upsert(
    conn: &Connection,
    record: &JobRecord,
    policy: MergePolicy,
) -> rusqlite::Result<UpsertOutcome> {
    let exists = conn
        .prepare_cached("SELECT 1 FROM jobs WHERE url = ?1")?
        .query_row([&record.url], |_| Ok(()))
        .optional()?
        .is_some();

    let (sql, outcome) = match (exists, policy) {
        (false, _) => (INSERT_SQL, UpsertOutcome::Inserted),
        (true, MergePolicy::Overwrite) => (OVERWRITE_SQL, UpsertOutcome::Updated),
        (true, MergePolicy::KeepExisting) => (KEEP_EXISTING_SQL, UpsertOutcome::Updated),
    };

    let r = record;
    conn.prepare_cached(sql)?.execute(rusqlite::params![
        r.url,
        r.source,
        r.job_title,
        r.company_name,
        r.location,
        r.city,
        r.state,
        r.country,
        r.is_remote,
        r.is_hybrid,
        r.classification,
        r.work_type,
        r.salary_range,
        r.salary.map(|s| s.min),
        r.salary.map(|s| s.max),
        r.posted_date,
        r.job_description,
    ])?;
    Ok(outcome)
}

// ── Reads ──

const SELECT_COLUMNS: &str = "url, source, job_title, company_name, location, city, state,
     country, is_remote, is_hybrid, classification, work_type, salary_range,
     min_annual_salary, max_annual_salary, posted_date, job_description";

fn record_from_row(row: &Row) -> rusqlite::Result<JobRecord> {
    let min: Option<i64> = row.get(13)?;
    let max: Option<i64> = row.get(14)?;
    Ok(JobRecord {
        url: row.get(0)?,
        source: row.get(1)?,
        job_title: row.get(2)?,
        company_name: row.get(3)?,
        location: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        country: row.get(7)?,
        is_remote: row.get(8)?,
        is_hybrid: row.get(9)?,
        classification: row.get(10)?,
        work_type: row.get(11)?,
        salary_range: row.get(12)?,
        salary: min.zip(max).map(|(min, max)| AnnualSalary { min, max }),
        posted_date: row.get(15)?,
        job_description: row.get(16)?,
    })
}

/// Every stored job in insertion order.
pub fn fetch_all(conn: &Connection) -> Result<Vec<JobRecord>> {
    let sql = format!("SELECT {} FROM jobs ORDER BY id", SELECT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
pub fn fetch_by_url(conn: &Connection, url: &str) -> Result<Option<JobRecord>> {
    let sql = format!("SELECT {} FROM jobs WHERE url = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, [url], record_from_row).optional()?)
}

pub fn count_jobs(conn: &Connection) -> Result<usize> {
    let n: usize = conn.query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?;
    Ok(n)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub by_source: Vec<(String, usize)>,
    pub with_salary: usize,
    pub with_posted_date: usize,
    pub remote: usize,
    pub hybrid: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total = count_jobs(conn)?;
    let with_salary: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE min_annual_salary IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let with_posted_date: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE posted_date IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let remote: usize =
        conn.query_row("SELECT COUNT(*) FROM jobs WHERE is_remote = 1", [], |r| r.get(0))?;
    let hybrid: usize =
        conn.query_row("SELECT COUNT(*) FROM jobs WHERE is_hybrid = 1", [], |r| r.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT COALESCE(source, '(none)'), COUNT(*) FROM jobs GROUP BY 1 ORDER BY 2 DESC, 1",
    )?;
    let by_source = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        total,
        by_source,
        with_salary,
        with_posted_date,
        remote,
        hybrid,
    })
}

// ── Tests ──
