use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use super::{
    BatchError, BatchOptions, BatchSummary, SkipReason, compute_batch, load_rules, write_back,
};
use crate::db::TaxRepository;

/// One recompute run over every pending record.
///
/// Reads happen once, up front: the rule table and the pending records are
/// fetched concurrently and both must succeed before anything is computed.
/// Workers only see the in-memory table. The sink is called exactly once,
/// after every worker has finished, so a failure before that point leaves
/// the store untouched.
pub struct TaxBatch<'a> {
    repository: &'a dyn TaxRepository,
    options: BatchOptions,
}

impl<'a> TaxBatch<'a> {
    pub fn new(repository: &'a dyn TaxRepository, options: BatchOptions) -> Self {
        Self {
            repository,
            options,
        }
    }

    pub async fn run_batch(&self) -> Result<BatchSummary, BatchError> {
        let result = self.run().await;
        if let Err(e) = &result {
            error!(stage = e.stage(), error = %e, "tax batch aborted");
        }
        result
    }

    async fn run(&self) -> Result<BatchSummary, BatchError> {
        let started = Instant::now();
        let workers = self.options.worker_count();

        let (table, records) = tokio::try_join!(
            async { load_rules(self.repository).await.map_err(BatchError::LoadRules) },
            async {
                self.repository
                    .list_pending_records()
                    .await
                    .map_err(BatchError::LoadRecords)
            },
        )?;

        let processed = records.len();
        info!(
            records = processed,
            jurisdictions = table.len(),
            workers = workers.get(),
            "loaded batch inputs"
        );

        let computation = compute_batch(Arc::new(table), records, workers).await?;

        let computed = computation.results.len();
        let written = write_back(self.repository, &computation.results)
            .await
            .map_err(|source| BatchError::WriteBack {
                count: computed,
                source,
            })?;

        let summary = BatchSummary {
            processed,
            computed,
            unknown_regime: computation
                .count_skipped(|r| matches!(r, SkipReason::UnknownRegime(_))),
            missing_jurisdiction: computation
                .count_skipped(|r| matches!(r, SkipReason::MissingJurisdiction)),
            overflowed: computation.count_skipped(|r| matches!(r, SkipReason::Overflow)),
            written,
            workers: workers.get(),
            skipped: computation.skipped,
            elapsed: started.elapsed(),
        };

        info!(
            processed = summary.processed,
            computed = summary.computed,
            unknown_regime = summary.unknown_regime,
            missing_jurisdiction = summary.missing_jurisdiction,
            overflowed = summary.overflowed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "tax batch complete"
        );

        Ok(summary)
    }
}
