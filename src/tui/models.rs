use std::time::Instant;

/// Which list the main panel shows: the accepted files before a run, the
/// run's result entries afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel {
    Files,
    Results,
}

/// Transient status line, cleared a few seconds after it was set.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub shown_at: Instant,
}
