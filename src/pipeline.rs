use std::collections::VecDeque;

use tracing::{info, warn};

use crate::classify_client::ClassifyClient;
use crate::document_store::{BATCH_SIZE, DocumentStore, InputFile};
use crate::downloads::Downloader;

/// Terminal per-file result of one classification run. Never revised once
/// recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Completed { new_name: String },
    Failed { reason: String },
}

/// Aggregator entry: the file plus its outcome, None while the
/// classification call is still in flight.
#[derive(Debug, Clone)]
pub struct ResultEntry {
    pub file: InputFile,
    pub outcome: Option<ProcessingOutcome>,
}

impl ResultEntry {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Some(ProcessingOutcome::Completed { .. }))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Some(ProcessingOutcome::Failed { .. }))
    }
}

/// Counters over the current run's entries.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Scheduler status for the current run. `current_batch` counts settled
/// batches, so progress reads `current_batch/total_batches`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunState {
    pub current_batch: usize,
    pub total_batches: usize,
    pub is_processing: bool,
}

impl RunState {
    pub fn progress_percent(&self) -> f64 {
        if self.total_batches == 0 {
            0.0
        } else {
            self.current_batch as f64 / self.total_batches as f64 * 100.0
        }
    }
}

/// Entries for the current run, kept in batch-then-intra-batch order.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    entries: Vec<ResultEntry>,
}

impl ResultAggregator {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn push_pending(&mut self, file: InputFile) -> usize {
        self.entries.push(ResultEntry {
            file,
            outcome: None,
        });
        self.entries.len() - 1
    }

    /// Record the terminal outcome for an entry. Outcomes are write-once; a
    /// settled entry is left untouched.
    fn settle(&mut self, index: usize, outcome: ProcessingOutcome) {
        if let Some(entry) = self.entries.get_mut(index) {
            if entry.outcome.is_none() {
                entry.outcome = Some(outcome);
            }
        }
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match &entry.outcome {
                Some(ProcessingOutcome::Completed { .. }) => stats.completed += 1,
                Some(ProcessingOutcome::Failed { .. }) => stats.failed += 1,
                None => stats.pending += 1,
            }
        }
        stats
    }

    /// Save a renamed copy of every completed entry. Failed and pending
    /// entries are skipped; an individual save failure is logged and does
    /// not stop the rest. Returns the number of copies written.
    pub fn download_all(&self, downloader: &Downloader) -> usize {
        let mut written = 0;
        for entry in &self.entries {
            if let Some(ProcessingOutcome::Completed { new_name }) = &entry.outcome {
                match downloader.save(&entry.file, new_name) {
                    Ok(path) => {
                        info!(file = %entry.file.name, saved = %path.display(), "saved copy");
                        written += 1;
                    }
                    Err(e) => {
                        warn!(file = %entry.file.name, "failed to save copy: {e:#}");
                    }
                }
            }
        }
        written
    }
}

/// Events emitted as a run advances, one per externally observable state
/// change, so a front end can refresh without polling.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ItemStarted {
        index: usize,
        name: String,
    },
    ItemSettled {
        index: usize,
        outcome: ProcessingOutcome,
    },
    BatchCompleted {
        current_batch: usize,
        total_batches: usize,
    },
    RunFinished {
        stats: RunStats,
    },
}

/// Sink for pipeline events. The default method ignores everything, so a
/// front end only overrides what it renders.
pub trait ProgressSink {
    fn on_event(&mut self, _event: PipelineEvent) {}
}

/// Sink that discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {}

/// Flags owned by the front end, read-only here.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineConfig {
    pub auto_download: bool,
}

/// The batch pipeline: snapshots the store at run start, drains FIFO batches
/// of at most [`BATCH_SIZE`] files, and drives each file through the
/// classification service strictly one at a time. A failure settles that
/// item and the run moves on; nothing aborts the loop.
pub struct Pipeline {
    client: ClassifyClient,
    downloader: Downloader,
    config: PipelineConfig,
    run: RunState,
    results: ResultAggregator,
    sink: Box<dyn ProgressSink>,
}

impl Pipeline {
    pub fn new(client: ClassifyClient, downloader: Downloader, config: PipelineConfig) -> Self {
        Self::with_sink(client, downloader, config, Box::new(NullSink))
    }

    pub fn with_sink(
        client: ClassifyClient,
        downloader: Downloader,
        config: PipelineConfig,
        sink: Box<dyn ProgressSink>,
    ) -> Self {
        Self {
            client,
            downloader,
            config,
            run: RunState::default(),
            results: ResultAggregator::default(),
            sink,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_processing(&self) -> bool {
        self.run.is_processing
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    /// Run the full pipeline over a snapshot of the store. Mutating the
    /// store afterwards does not affect the run. A second call while a run
    /// is in flight is ignored; returns whether a run actually happened.
    pub async fn start(&mut self, store: &DocumentStore) -> bool {
        if self.run.is_processing {
            return false;
        }

        let mut queue: VecDeque<InputFile> = store.files().to_vec().into();
        self.run = RunState {
            current_batch: 0,
            total_batches: store.total_batches(),
            is_processing: true,
        };
        self.results.clear();

        info!(
            files = queue.len(),
            batches = self.run.total_batches,
            "starting run"
        );

        while !queue.is_empty() {
            let take = queue.len().min(BATCH_SIZE);
            let batch: Vec<InputFile> = queue.drain(..take).collect();
            self.process_batch(batch).await;
            self.run.current_batch += 1;
            self.sink.on_event(PipelineEvent::BatchCompleted {
                current_batch: self.run.current_batch,
                total_batches: self.run.total_batches,
            });
            info!(
                batch = self.run.current_batch,
                total = self.run.total_batches,
                "batch settled"
            );
        }

        self.run.is_processing = false;

        if self.config.auto_download {
            let written = self.results.download_all(&self.downloader);
            info!(written, "bulk download complete");
        }

        let stats = self.results.stats();
        info!(
            completed = stats.completed,
            failed = stats.failed,
            "run finished"
        );
        self.sink.on_event(PipelineEvent::RunFinished { stats });
        true
    }

    /// Items within a batch settle strictly in order; no two classification
    /// calls are ever in flight at once. This bounds load on the external
    /// service to one request at a time.
    async fn process_batch(&mut self, batch: Vec<InputFile>) {
        for file in batch {
            let index = self.results.push_pending(file.clone());
            self.sink.on_event(PipelineEvent::ItemStarted {
                index,
                name: file.name.clone(),
            });

            let outcome = self.process_item(&file).await;
            self.results.settle(index, outcome.clone());
            self.sink.on_event(PipelineEvent::ItemSettled { index, outcome });
        }
    }

    /// Drive one file to a terminal outcome. Any error from the
    /// classification layer is normalized into `Failed`; nothing escapes to
    /// abort the run loop.
    async fn process_item(&self, file: &InputFile) -> ProcessingOutcome {
        match self.client.analyze(file).await {
            Ok(new_name) => {
                if self.config.auto_download {
                    if let Err(e) = self.downloader.save(file, &new_name) {
                        warn!(file = %file.name, "auto-download failed: {e:#}");
                    }
                }
                ProcessingOutcome::Completed { new_name }
            }
            Err(e) => {
                warn!(file = %file.name, "classification failed: {e:#}");
                ProcessingOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pipeline() -> Pipeline {
        Pipeline::new(
            // Nothing listens here; the tests below never reach the network.
            ClassifyClient::new("http://127.0.0.1:9"),
            Downloader::new(std::env::temp_dir().join("doc_renamer_test_out")),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_start_ignored_while_processing() {
        let mut pipeline = test_pipeline();
        pipeline.run.is_processing = true;

        let mut store = DocumentStore::new();
        store.add(vec![InputFile::new(
            "a.pdf",
            Some("application/pdf"),
            b"payload".to_vec(),
        )]);

        let ran = pipeline.start(&store).await;
        assert!(!ran);
        assert!(pipeline.results().entries().is_empty());
        assert_eq!(pipeline.run_state().current_batch, 0);
    }

    #[tokio::test]
    async fn test_empty_store_completes_immediately() {
        let mut pipeline = test_pipeline();
        let store = DocumentStore::new();

        let ran = pipeline.start(&store).await;
        assert!(ran);
        assert!(!pipeline.is_processing());
        assert_eq!(pipeline.run_state().total_batches, 0);
        assert_eq!(pipeline.run_state().progress_percent(), 0.0);
        assert!(pipeline.results().entries().is_empty());
    }

    #[test]
    fn test_progress_percent() {
        let state = RunState {
            current_batch: 1,
            total_batches: 2,
            is_processing: true,
        };
        assert_eq!(state.progress_percent(), 50.0);
        assert_eq!(RunState::default().progress_percent(), 0.0);
    }

    #[test]
    fn test_settle_is_write_once() {
        let mut aggregator = ResultAggregator::default();
        let index = aggregator.push_pending(InputFile::new("a.pdf", None, Vec::new()));

        aggregator.settle(
            index,
            ProcessingOutcome::Completed {
                new_name: "first.pdf".to_string(),
            },
        );
        aggregator.settle(
            index,
            ProcessingOutcome::Failed {
                reason: "late".to_string(),
            },
        );

        assert_eq!(
            aggregator.entries()[0].outcome,
            Some(ProcessingOutcome::Completed {
                new_name: "first.pdf".to_string()
            })
        );
    }

    #[test]
    fn test_settle_out_of_range_is_noop() {
        let mut aggregator = ResultAggregator::default();
        aggregator.settle(
            3,
            ProcessingOutcome::Failed {
                reason: "stale".to_string(),
            },
        );
        assert!(aggregator.entries().is_empty());
    }
}
