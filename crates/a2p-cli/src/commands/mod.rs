//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Batch commands
//! share [`run_batch`]: validate and load the checkpoint, run one pass over
//! every row, then write the checkpoint back atomically.

pub mod attach;
pub mod init;
pub mod refresh;
pub mod register;
pub mod resume;
pub mod update;

use crate::error::Result;
use crate::progress;
use a2p_engine::{checkpoint, BatchReport, BatchRunner, RecordState, RowPass};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Run `pass` over the checkpoint at `input` and write the result to `output`
///
/// A header mismatch aborts before any remote call and nothing is written.
pub async fn run_batch<P: RowPass>(
    pass: Arc<P>,
    input: &Path,
    output: &Path,
    concurrency: usize,
) -> Result<BatchReport> {
    let records = checkpoint::read_checkpoint(input)?;
    info!(
        pass = pass.name(),
        input = %input.display(),
        rows = records.len(),
        "Loaded checkpoint"
    );

    let bar = progress::create_row_progress(records.len() as u64, pass.name());
    let observer_bar = bar.clone();
    let runner = BatchRunner::new(concurrency).with_observer(Arc::new(move |record: &RecordState| {
        if let Some(line) = progress::row_line(record) {
            observer_bar.println(line);
        }
        observer_bar.inc(1);
    }));

    let outcome = runner.run(pass, records).await;
    bar.finish_and_clear();

    checkpoint::write_checkpoint(output, &outcome.records)?;
    progress::print_summary(&outcome.report, output);
    Ok(outcome.report)
}
