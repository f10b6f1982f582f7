use indicatif::ProgressBar;
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, MergePolicy, UpsertOutcome};
use crate::error::IngestError;
use crate::normalize::{Normalizer, RawJob};

const CHUNK_SIZE: usize = 500;

/// Per-batch counts. `processed` covers records that reached the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub seen: usize,
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped_missing_url: usize,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Processed {} of {} jobs: {} inserted, {} updated, {} skipped (no url).",
            self.processed, self.seen, self.inserted, self.updated, self.skipped_missing_url,
        );
    }
}

/// Normalize and upsert a whole batch inside one transaction.
///
/// Records are normalized in parallel a chunk at a time, then written in input
/// order, so a later record for the same URL wins. Records without a URL are
/// counted and skipped. Any store failure rolls the entire batch back.
pub fn ingest_batch(
    conn: &Connection,
    raws: &[RawJob],
    normalizer: &Normalizer,
    policy: MergePolicy,
    pb: &ProgressBar,
) -> Result<BatchReport, IngestError> {
    let mut report = BatchReport::default();
    let persistence = |processed: usize| {
        move |source: rusqlite::Error| IngestError::Persistence { processed, source }
    };

    let tx = conn.unchecked_transaction().map_err(persistence(0))?;

    for chunk in raws.chunks(CHUNK_SIZE) {
        let results: Vec<_> = chunk.par_iter().map(|raw| normalizer.normalize(raw)).collect();

        for result in results {
            report.seen += 1;
            let record = match result {
                Ok(record) => record,
                Err(IngestError::MissingIdentifier { source_name }) => {
                    warn!(source = %source_name, "skipping job without url");
                    report.skipped_missing_url += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match db::upsert(&tx, &record, policy).map_err(persistence(report.seen - 1))? {
                UpsertOutcome::Inserted => report.inserted += 1,
                UpsertOutcome::Updated => report.updated += 1,
            }
            report.processed += 1;
        }
        pb.inc(chunk.len() as u64);
    }

    tx.commit().map_err(persistence(report.seen))?;
    info!(
        processed = report.processed,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped_missing_url,
        "Ingestion complete"
    );
    Ok(report)
}

// ── Tests ──
