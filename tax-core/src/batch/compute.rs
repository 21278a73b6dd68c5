//! In-memory fan-out of the per-record tax computation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use super::{BatchError, SkipReason, SkippedRecord};
use crate::calculations::{Evaluation, evaluate};
use crate::models::{ComputedResult, PendingRecord, RuleTable};

/// What happened to a single pending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Computed(ComputedResult),
    Skipped(SkippedRecord),
}

/// Merged output of every worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Computation {
    pub results: Vec<ComputedResult>,
    pub skipped: Vec<SkippedRecord>,
}

impl Computation {
    fn push(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Computed(result) => self.results.push(result),
            RecordOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
    }

    fn merge(&mut self, other: Computation) {
        self.results.extend(other.results);
        self.skipped.extend(other.skipped);
    }

    pub fn count_skipped(&self, reason: fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| reason(&s.reason)).count()
    }
}

/// Computes one record against the rule table.
///
/// The jurisdiction lookup comes first, so a record that is both unmapped
/// and carries an unknown regime is reported as a missing jurisdiction. A
/// tax or net pay outside `Decimal` range skips only that record.
pub fn compute_record(
    table: &RuleTable,
    record: &PendingRecord,
) -> RecordOutcome {
    let skipped = |reason| {
        RecordOutcome::Skipped(SkippedRecord {
            record_id: record.record_id,
            jurisdiction_id: record.jurisdiction_id,
            reason,
        })
    };

    let Some(rules) = table.get(record.jurisdiction_id) else {
        debug!(
            record_id = record.record_id,
            jurisdiction_id = record.jurisdiction_id,
            "skipping record: jurisdiction has no tax rules"
        );
        return skipped(SkipReason::MissingJurisdiction);
    };

    let tax = match evaluate(&record.regime, rules, record.gross_income) {
        Evaluation::Taxed(tax) => Some(tax),
        Evaluation::UnknownRegime => {
            debug!(
                record_id = record.record_id,
                jurisdiction_id = record.jurisdiction_id,
                "skipping record: unrecognised tax regime"
            );
            return skipped(SkipReason::UnknownRegime(record.regime.as_str().to_string()));
        }
        Evaluation::Overflow => None,
    };

    match tax.and_then(|tax| ComputedResult::new(record.record_id, record.gross_income, tax)) {
        Some(result) => RecordOutcome::Computed(result),
        None => {
            debug!(
                record_id = record.record_id,
                jurisdiction_id = record.jurisdiction_id,
                "skipping record: amount out of range"
            );
            skipped(SkipReason::Overflow)
        }
    }
}

fn compute_chunk(
    table: &RuleTable,
    records: Vec<PendingRecord>,
) -> Computation {
    let mut computation = Computation::default();
    for record in &records {
        computation.push(compute_record(table, record));
    }
    computation
}

/// Splits `records` into at most `workers` contiguous chunks of near-equal
/// size. No chunk is empty.
pub fn partition(
    records: Vec<PendingRecord>,
    workers: usize,
) -> Vec<Vec<PendingRecord>> {
    if records.is_empty() {
        return Vec::new();
    }

    let chunk_size = records.len().div_ceil(workers.max(1));
    let mut chunks = Vec::with_capacity(workers);
    let mut remaining = records.into_iter().peekable();
    while remaining.peek().is_some() {
        chunks.push(remaining.by_ref().take(chunk_size).collect());
    }
    chunks
}

/// Runs the computation across `workers` blocking tasks.
///
/// The rule table is shared read-only; each worker accumulates into its own
/// [`Computation`] and the parts are merged once every worker has joined. No
/// ordering is guaranteed between records.
pub async fn compute_batch(
    table: Arc<RuleTable>,
    records: Vec<PendingRecord>,
    workers: NonZeroUsize,
) -> Result<Computation, BatchError> {
    let chunks = partition(records, workers.get());
    debug!(workers = workers.get(), chunks = chunks.len(), "fanning out tax computation");

    let mut tasks = JoinSet::new();
    for chunk in chunks {
        let table = Arc::clone(&table);
        tasks.spawn_blocking(move || compute_chunk(&table, chunk));
    }

    let mut computation = Computation::default();
    while let Some(joined) = tasks.join_next().await {
        let part = joined.map_err(|e| BatchError::Worker(e.to_string()))?;
        computation.merge(part);
    }

    Ok(computation)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BracketLine, RateCode, TaxRate, TaxRegime};

    fn test_table() -> RuleTable {
        RuleTable::from_rows(
            vec![
                TaxRate {
                    jurisdiction_id: 2,
                    rate: dec!(15),
                    rate_code: RateCode::Percentage,
                },
                TaxRate {
                    jurisdiction_id: 3,
                    rate: dec!(50),
                    rate_code: RateCode::FlatRate,
                },
                TaxRate {
                    jurisdiction_id: 3,
                    rate: dec!(500),
                    rate_code: RateCode::Threshold,
                },
            ],
            vec![
                BracketLine {
                    jurisdiction_id: 1,
                    order_number: 1,
                    lower_limit: dec!(0),
                    upper_limit: dec!(1000),
                    rate: dec!(10),
                },
                BracketLine {
                    jurisdiction_id: 1,
                    order_number: 2,
                    lower_limit: dec!(1000),
                    upper_limit: dec!(5000),
                    rate: dec!(20),
                },
            ],
        )
    }

    /// Jurisdiction 2 at 150%, so an income near `Decimal::MAX` overflows.
    fn high_rate_table() -> RuleTable {
        RuleTable::from_rows(
            vec![TaxRate {
                jurisdiction_id: 2,
                rate: dec!(150),
                rate_code: RateCode::Percentage,
            }],
            vec![],
        )
    }

    fn record(record_id: i64, jurisdiction_id: i32, regime: TaxRegime, income: Decimal) -> PendingRecord {
        PendingRecord {
            record_id,
            jurisdiction_id,
            regime,
            gross_income: income,
        }
    }

    /// A mixed batch of `count` records cycling through every outcome.
    fn mixed_records(count: i64) -> Vec<PendingRecord> {
        (0..count)
            .map(|id| match id % 5 {
                0 => record(id, 1, TaxRegime::Progressive, Decimal::from(id * 7 % 6000)),
                1 => record(id, 2, TaxRegime::Percentage, Decimal::new(id * 101, 2)),
                2 => record(id, 3, TaxRegime::Flat, Decimal::from(id % 1000)),
                3 => record(id, 42, TaxRegime::Percentage, dec!(100)),
                _ => record(id, 2, TaxRegime::Unknown("LUMP".to_string()), dec!(100)),
            })
            .collect()
    }

    fn sorted(mut computation: Computation) -> Computation {
        computation.results.sort_by_key(|r| r.record_id);
        computation.skipped.sort_by_key(|s| s.record_id);
        computation
    }

    // =========================================================================
    // compute_record tests
    // =========================================================================

    #[test]
    fn progressive_record_at_upper_bound() {
        let outcome = compute_record(&test_table(), &record(1, 1, TaxRegime::Progressive, dec!(1000)));

        assert_eq!(
            outcome,
            RecordOutcome::Computed(ComputedResult {
                record_id: 1,
                tax: dec!(100),
                net_pay: dec!(900),
            })
        );
    }

    #[test]
    fn flat_record_just_above_threshold() {
        let outcome = compute_record(&test_table(), &record(7, 3, TaxRegime::Flat, dec!(500.01)));

        assert_eq!(
            outcome,
            RecordOutcome::Computed(ComputedResult {
                record_id: 7,
                tax: dec!(50),
                net_pay: dec!(450.01),
            })
        );
    }

    #[test]
    fn missing_jurisdiction_is_skipped() {
        let outcome = compute_record(&test_table(), &record(9, 42, TaxRegime::Percentage, dec!(100)));

        assert_eq!(
            outcome,
            RecordOutcome::Skipped(SkippedRecord {
                record_id: 9,
                jurisdiction_id: 42,
                reason: SkipReason::MissingJurisdiction,
            })
        );
    }

    #[test]
    fn missing_jurisdiction_takes_precedence_over_unknown_regime() {
        let outcome = compute_record(
            &test_table(),
            &record(9, 42, TaxRegime::Unknown("X".to_string()), dec!(100)),
        );

        assert!(matches!(
            outcome,
            RecordOutcome::Skipped(SkippedRecord {
                reason: SkipReason::MissingJurisdiction,
                ..
            })
        ));
    }

    #[test]
    fn unknown_regime_is_skipped_with_code() {
        let outcome = compute_record(
            &test_table(),
            &record(4, 2, TaxRegime::Unknown("LUMP".to_string()), dec!(100)),
        );

        assert_eq!(
            outcome,
            RecordOutcome::Skipped(SkippedRecord {
                record_id: 4,
                jurisdiction_id: 2,
                reason: SkipReason::UnknownRegime("LUMP".to_string()),
            })
        );
    }

    #[test]
    fn out_of_range_tax_is_skipped_as_overflow() {
        let outcome = compute_record(
            &high_rate_table(),
            &record(5, 2, TaxRegime::Percentage, Decimal::MAX),
        );

        assert_eq!(
            outcome,
            RecordOutcome::Skipped(SkippedRecord {
                record_id: 5,
                jurisdiction_id: 2,
                reason: SkipReason::Overflow,
            })
        );
    }

    #[test]
    fn out_of_range_net_pay_is_skipped_as_overflow() {
        // The flat charge fits, the income minus it does not.
        let table = RuleTable::from_rows(
            vec![
                TaxRate {
                    jurisdiction_id: 3,
                    rate: Decimal::MAX,
                    rate_code: RateCode::FlatRate,
                },
                TaxRate {
                    jurisdiction_id: 3,
                    rate: dec!(-10),
                    rate_code: RateCode::Threshold,
                },
            ],
            vec![],
        );

        let outcome = compute_record(&table, &record(6, 3, TaxRegime::Flat, dec!(-1)));

        assert!(matches!(
            outcome,
            RecordOutcome::Skipped(SkippedRecord {
                reason: SkipReason::Overflow,
                ..
            })
        ));
    }

    // =========================================================================
    // partition tests
    // =========================================================================

    #[test]
    fn partition_empty_input_gives_no_chunks() {
        assert!(partition(vec![], 4).is_empty());
    }

    #[test]
    fn partition_never_exceeds_worker_count() {
        let chunks = partition(mixed_records(10), 4);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 10);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn partition_with_more_workers_than_records() {
        let chunks = partition(mixed_records(3), 8);

        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn partition_keeps_every_record_once() {
        let chunks = partition(mixed_records(17), 5);

        let mut ids: Vec<i64> = chunks.into_iter().flatten().map(|r| r.record_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..17).collect::<Vec<_>>());
    }

    // =========================================================================
    // compute_batch tests
    // =========================================================================

    #[tokio::test]
    async fn compute_batch_empty_input() {
        let computation = compute_batch(
            Arc::new(test_table()),
            vec![],
            NonZeroUsize::new(4).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(computation, Computation::default());
    }

    #[tokio::test]
    async fn many_workers_match_single_worker() {
        let table = Arc::new(test_table());

        let single = compute_batch(Arc::clone(&table), mixed_records(1000), NonZeroUsize::MIN)
            .await
            .unwrap();
        let parallel = compute_batch(
            Arc::clone(&table),
            mixed_records(1000),
            NonZeroUsize::new(8).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(sorted(single), sorted(parallel));
    }

    #[tokio::test]
    async fn every_record_is_accounted_for_exactly_once() {
        let computation = compute_batch(
            Arc::new(test_table()),
            mixed_records(250),
            NonZeroUsize::new(6).unwrap(),
        )
        .await
        .unwrap();

        let mut ids: Vec<i64> = computation
            .results
            .iter()
            .map(|r| r.record_id)
            .chain(computation.skipped.iter().map(|s| s.record_id))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..250).collect::<Vec<_>>());

        assert_eq!(computation.results.len(), 150);
        assert_eq!(
            computation.count_skipped(|r| matches!(r, SkipReason::MissingJurisdiction)),
            50
        );
        assert_eq!(
            computation.count_skipped(|r| matches!(r, SkipReason::UnknownRegime(_))),
            50
        );
    }

    #[tokio::test]
    async fn overflowing_record_does_not_abort_the_batch() {
        let records = vec![
            record(1, 2, TaxRegime::Percentage, dec!(2000)),
            record(2, 2, TaxRegime::Percentage, Decimal::MAX),
            record(3, 2, TaxRegime::Percentage, dec!(10)),
        ];

        let computation = compute_batch(Arc::new(high_rate_table()), records, NonZeroUsize::new(3).unwrap())
            .await
            .expect("an out-of-range record is skipped, not fatal");

        let computation = sorted(computation);
        assert_eq!(
            computation.results,
            vec![
                ComputedResult {
                    record_id: 1,
                    tax: dec!(3000),
                    net_pay: dec!(-1000),
                },
                ComputedResult {
                    record_id: 3,
                    tax: dec!(15),
                    net_pay: dec!(-5),
                },
            ]
        );
        assert_eq!(
            computation.skipped,
            vec![SkippedRecord {
                record_id: 2,
                jurisdiction_id: 2,
                reason: SkipReason::Overflow,
            }]
        );
    }

    #[tokio::test]
    async fn net_pay_is_income_minus_tax() {
        let records = mixed_records(200);
        let incomes: std::collections::HashMap<i64, Decimal> =
            records.iter().map(|r| (r.record_id, r.gross_income)).collect();

        let computation = compute_batch(Arc::new(test_table()), records, NonZeroUsize::new(3).unwrap())
            .await
            .unwrap();

        for result in &computation.results {
            assert_eq!(result.net_pay, incomes[&result.record_id] - result.tax);
        }
    }
}
