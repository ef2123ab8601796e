use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::document_store::InputFile;
use crate::downloads::{Downloader, sanitize_proposed_name};

pub const ZOOM_MIN: u16 = 50;
pub const ZOOM_MAX: u16 = 200;
pub const ZOOM_STEP: u16 = 25;
pub const ZOOM_DEFAULT: u16 = 100;

/// Staging copy backing an open preview, written under the system temp
/// directory so an external viewer can read it. Treated as a scarce
/// resource: released exactly once, on close or replacement. Drop is only a
/// backstop for abnormal exits.
#[derive(Debug)]
pub struct DisplayHandle {
    path: PathBuf,
    released: bool,
}

impl DisplayHandle {
    /// Stage the file's bytes for display.
    pub fn create(file: &InputFile) -> Result<Self> {
        let staging_dir = std::env::temp_dir().join("doc_renamer_preview");
        fs::create_dir_all(&staging_dir).with_context(|| {
            format!("Failed to create staging directory {}", staging_dir.display())
        })?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = staging_dir.join(format!(
            "{}_{}_{}",
            stamp,
            std::process::id(),
            sanitize_proposed_name(&file.name)
        ));

        fs::write(&path, &file.bytes)
            .with_context(|| format!("Failed to stage preview at {}", path.display()))?;

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Remove the staged copy. Calling again is a no-op.
    pub fn release(&mut self) {
        if !self.released {
            let _ = fs::remove_file(&self.path);
            self.released = true;
        }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// State of the single open preview: the file, the name the service
/// proposed for it, and the display zoom.
#[derive(Debug)]
pub struct PreviewState {
    pub file: InputFile,
    pub proposed_name: String,
    pub zoom: u16,
    handle: DisplayHandle,
}

impl PreviewState {
    /// Where the staged copy lives while the preview is open.
    pub fn staged_path(&self) -> &Path {
        self.handle.path()
    }
}

/// At most one preview is alive at a time; opening a new one destroys the
/// previous state and releases its handle first.
#[derive(Debug, Default)]
pub struct PreviewController {
    state: Option<PreviewState>,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, file: InputFile, proposed_name: String) -> Result<()> {
        self.close();
        let handle = DisplayHandle::create(&file)?;
        self.state = Some(PreviewState {
            file,
            proposed_name,
            zoom: ZOOM_DEFAULT,
            handle,
        });
        Ok(())
    }

    /// Release the display handle and clear the state. Safe when nothing is
    /// open; external cancellation (Esc) routes here.
    pub fn close(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.handle.release();
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(state) = &mut self.state {
            state.zoom = (state.zoom + ZOOM_STEP).min(ZOOM_MAX);
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(state) = &mut self.state {
            state.zoom = state.zoom.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
        }
    }

    pub fn current(&self) -> Option<&PreviewState> {
        self.state.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn zoom(&self) -> Option<u16> {
        self.state.as_ref().map(|state| state.zoom)
    }

    /// Download the previewed file under its proposed name, then close the
    /// preview. Returns the written path, or None when nothing is open.
    pub fn confirm_download(&mut self, downloader: &Downloader) -> Result<Option<PathBuf>> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        let saved = downloader.save(&state.file, &state.proposed_name)?;
        self.close();
        Ok(Some(saved))
    }
}
