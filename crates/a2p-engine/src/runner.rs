//! Batch runner
//!
//! Fans the records of a checkpoint out over a [`Limiter`], runs a
//! [`RowPass`] on each admitted record and returns every record, in source
//! order, once all of them have settled.
//!
//! Failure isolation is total. A pass returning an error, or its task
//! panicking, only sets the error slot of that one record.

use crate::error::RecordError;
use crate::limiter::Limiter;
use crate::record::RecordState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Whether a pass works on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Process,
    /// Left exactly as read, with the reason logged
    Skip(&'static str),
}

/// One batch entry point (register, resume, refresh...)
#[async_trait]
pub trait RowPass: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn admits(&self, record: &RecordState) -> Admission;

    /// Work on one admitted record
    ///
    /// Step failures are normally recorded on the record by the pipeline. An
    /// `Err` here is recorded the same way.
    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError>;
}

/// Called once per settled record
pub type Observer = Arc<dyn Fn(&RecordState) + Send + Sync>;

/// Counts for one run of a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub pass: &'static str,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Processed records that ended with an error
    pub failed: usize,
    /// Processed records still waiting on the remote side
    pub awaiting_rerun: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.processed - self.failed
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// Every input record, sorted by index
    pub records: Vec<RecordState>,
    pub report: BatchReport,
}

enum Settled {
    Processed(RecordState),
    Skipped(RecordState),
}

pub struct BatchRunner {
    limiter: Limiter,
    observer: Option<Observer>,
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            limiter: Limiter::new(concurrency),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn run<P: RowPass>(&self, pass: Arc<P>, records: Vec<RecordState>) -> BatchOutcome {
        let started_at = Utc::now();
        let total = records.len();
        info!(
            pass = pass.name(),
            rows = total,
            concurrency = self.limiter.capacity(),
            "Starting pass"
        );

        // submission blocks on the limiter; settle rows as they come back
        let (queued, mut settling) = mpsc::unbounded_channel();
        let limiter = self.limiter.clone();
        let submitter = {
            let pass = pass.clone();
            tokio::spawn(async move {
                for record in records {
                    // kept so a panicking task still yields its row
                    let snapshot = record.clone();
                    let handle = limiter.submit(run_one(pass.clone(), record)).await;
                    if queued.send((snapshot, handle)).is_err() {
                        break;
                    }
                }
            })
        };

        let mut settled = Vec::with_capacity(total);
        let (mut processed, mut skipped, mut failed, mut awaiting_rerun) = (0, 0, 0, 0);

        while let Some((snapshot, handle)) = settling.recv().await {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let mut record: RecordState = snapshot;
                    let reason = if join_error.is_panic() {
                        "task panicked"
                    } else {
                        "task cancelled"
                    };
                    error!(row = record.row_number(), pass = pass.name(), "Row {}", reason);
                    record.clear_carried_error();
                    record.fail(RecordError::aborted(record.row_number(), reason));
                    Settled::Processed(record)
                },
            };

            let record = match outcome {
                Settled::Processed(record) => {
                    processed += 1;
                    if record.has_error() {
                        failed += 1;
                    } else if record.is_settling() {
                        awaiting_rerun += 1;
                    }
                    record
                },
                Settled::Skipped(record) => {
                    skipped += 1;
                    record
                },
            };

            if let Some(observer) = &self.observer {
                observer(&record);
            }
            settled.push(record);
        }

        if let Err(err) = submitter.await {
            error!(pass = pass.name(), error = %err, "Row submission stopped early");
        }

        settled.sort_by_key(RecordState::index);

        let report = BatchReport {
            pass: pass.name(),
            total,
            processed,
            skipped,
            failed,
            awaiting_rerun,
            started_at,
            finished_at: Utc::now(),
        };

        if awaiting_rerun > 0 {
            warn!(
                pass = report.pass,
                rows = awaiting_rerun,
                "Rows still pending on the remote side; rerun resume or refresh later"
            );
        }
        info!(
            pass = report.pass,
            processed, skipped, failed, "Finished pass"
        );

        BatchOutcome {
            records: settled,
            report,
        }
    }
}

async fn run_one<P: RowPass>(pass: Arc<P>, mut record: RecordState) -> Settled {
    match pass.admits(&record) {
        Admission::Skip(reason) => {
            debug!(row = record.row_number(), pass = pass.name(), reason, "Skipping row");
            Settled::Skipped(record)
        },
        Admission::Process => {
            debug!(row = record.row_number(), pass = pass.name(), "Started row");
            record.clear_carried_error();
            if let Err(err) = pass.process(&mut record).await {
                record.fail(err);
            }
            match record.error() {
                Some(err) => warn!(row = record.row_number(), error = %err, "Row failed"),
                None => debug!(row = record.row_number(), "Finished row"),
            }
            Settled::Processed(record)
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Step;
    use crate::record::fixtures::applicant;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Tags each record; fails on one friendly id, panics on another
    struct Scripted;

    #[async_trait]
    impl RowPass for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn admits(&self, record: &RecordState) -> Admission {
            if record.applicant.friendly_id == "skip" {
                Admission::Skip("not for this pass")
            } else {
                Admission::Process
            }
        }

        async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
            // later rows finish first
            let delay = 20u64.saturating_sub(record.index() as u64 * 4);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            match record.applicant.friendly_id.as_str() {
                "fail" => Err(RecordError::step(Step::Brand, record.row_number(), "rejected")),
                "panic" => panic!("unexpected payload"),
                _ => {
                    record.ids.customer_profile = Some(format!("BU{}", record.index()));
                    Ok(())
                },
            }
        }
    }

    fn batch(ids: &[&str]) -> Vec<RecordState> {
        ids.iter().enumerate().map(|(i, id)| applicant(i, id)).collect()
    }

    #[tokio::test]
    async fn test_results_keep_source_order() {
        let outcome = BatchRunner::new(4)
            .run(Arc::new(Scripted), batch(&["a", "b", "c", "d", "e"]))
            .await;

        let indices: Vec<_> = outcome.records.iter().map(RecordState::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(outcome.report.total, 5);
        assert_eq!(outcome.report.processed, 5);
    }

    #[tokio::test]
    async fn test_failure_and_panic_are_isolated() {
        let outcome = BatchRunner::new(2)
            .run(Arc::new(Scripted), batch(&["a", "fail", "panic", "d"]))
            .await;
        let records = &outcome.records;

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].ids.customer_profile.as_deref(), Some("BU0"));
        assert_eq!(
            records[1].error().unwrap().to_string(),
            "brand error for row 3: rejected"
        );
        assert_eq!(
            records[2].error().unwrap().to_string(),
            "row 4 aborted: task panicked"
        );
        assert!(records[2].ids.customer_profile.is_none());
        assert_eq!(records[3].ids.customer_profile.as_deref(), Some("BU3"));
        assert_eq!(outcome.report.failed, 2);
    }

    #[tokio::test]
    async fn test_skipped_rows_are_untouched() {
        let mut records = batch(&["a", "skip"]);
        records[1].fail(RecordError::carried("left from last run"));
        let before = records[1].clone();

        let outcome = BatchRunner::new(1).run(Arc::new(Scripted), records).await;

        assert_eq!(outcome.records[1], before);
        assert_eq!(outcome.report.skipped, 1);
        assert_eq!(outcome.report.processed, 1);
    }

    #[tokio::test]
    async fn test_observer_sees_every_record() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let runner = BatchRunner::new(1).with_observer(Arc::new(move |_: &RecordState| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        runner.run(Arc::new(Scripted), batch(&["a", "skip", "c"])).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_processing_clears_carried_error() {
        let mut records = batch(&["a"]);
        records[0].fail(RecordError::carried("old"));

        let outcome = BatchRunner::new(1).run(Arc::new(Scripted), records).await;
        assert!(!outcome.records[0].has_error());
    }
}
