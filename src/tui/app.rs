use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::document_store::DocumentStore;
use crate::pipeline::{Pipeline, ProcessingOutcome};
use crate::preview::PreviewController;

use super::models::{Panel, StatusMessage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Terminal front-end state. All pipeline semantics live in the library;
/// this struct only tracks what is on screen and forwards key actions.
pub struct App {
    pub store: DocumentStore,
    pub pipeline: Pipeline,
    pub preview: PreviewController,
    pub panel: Panel,
    pub list_state: ListState,
    pub show_help: bool,
    pub finished: bool,
    pub status_message: Option<StatusMessage>,
}

impl App {
    pub fn new(store: DocumentStore, pipeline: Pipeline) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            store,
            pipeline,
            preview: PreviewController::new(),
            panel: Panel::Files,
            list_state,
            show_help: false,
            finished: false,
            status_message: None,
        }
    }

    fn panel_len(&self) -> usize {
        match self.panel {
            Panel::Files => self.store.len(),
            Panel::Results => self.pipeline.results().entries().len(),
        }
    }

    pub fn next(&mut self) {
        let len = self.panel_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.panel_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_status_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            shown_at: Instant::now(),
        });
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let Some(message) = &self.status_message {
            if message.shown_at.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
            }
        }
    }

    /// Kick off a run over the current store contents. The pipeline ignores
    /// the request when a run is already in flight.
    pub async fn start_processing(&mut self) {
        if self.store.is_empty() {
            self.set_status_message("No files to process".to_string());
            return;
        }

        self.panel = Panel::Results;
        self.list_state.select(Some(0));

        let ran = self.pipeline.start(&self.store).await;
        if ran {
            self.finished = true;
            let stats = self.pipeline.results().stats();
            self.set_status_message(format!(
                "Run complete: {} renamed, {} failed",
                stats.completed, stats.failed
            ));
        }
    }

    /// Bulk-save every completed entry of the last run.
    pub fn download_all(&mut self) {
        let written = self
            .pipeline
            .results()
            .download_all(self.pipeline.downloader());
        self.set_status_message(format!(
            "Saved {} file(s) to {}",
            written,
            self.pipeline.downloader().output_dir().display()
        ));
    }

    /// Remove the selected file from the store. An in-flight run keeps its
    /// snapshot either way.
    pub fn remove_selected(&mut self) {
        if self.panel != Panel::Files {
            return;
        }
        if let Some(index) = self.list_state.selected() {
            self.store.remove(index);
            if self.store.is_empty() {
                self.list_state.select(Some(0));
            } else if index >= self.store.len() {
                self.list_state.select(Some(self.store.len() - 1));
            }
        }
    }

    /// Open a preview for the selected completed result.
    pub fn open_preview(&mut self) {
        if self.panel != Panel::Results {
            self.set_status_message("Run the pipeline first, then preview results".to_string());
            return;
        }

        let Some(index) = self.list_state.selected() else {
            return;
        };
        let Some((file, outcome)) = self
            .pipeline
            .results()
            .entries()
            .get(index)
            .map(|entry| (entry.file.clone(), entry.outcome.clone()))
        else {
            return;
        };

        match outcome {
            Some(ProcessingOutcome::Completed { new_name }) => {
                if let Err(e) = self.preview.open(file, new_name) {
                    self.set_status_message(format!("Preview failed: {e:#}"));
                }
            }
            Some(ProcessingOutcome::Failed { .. }) => {
                self.set_status_message("Cannot preview a failed item".to_string());
            }
            None => {
                self.set_status_message("Item is still processing".to_string());
            }
        }
    }

    /// Save the previewed file under its proposed name and close the
    /// preview.
    pub fn confirm_preview_download(&mut self) {
        let downloader = self.pipeline.downloader().clone();
        match self.preview.confirm_download(&downloader) {
            Ok(Some(path)) => self.set_status_message(format!("Saved {}", path.display())),
            Ok(None) => {}
            Err(e) => self.set_status_message(format!("Save failed: {e:#}")),
        }
    }
}
