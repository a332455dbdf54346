use thiserror::Error;

/// Errors that abort a run. Probe failures are deliberately absent: a dead
/// channel is a classification, not an error.
#[derive(Debug, Error)]
pub enum ReviveError {
    /// Every download attempt failed at the transport level.
    #[error("playlist download failed after {attempts} attempts: {last_error}")]
    FetchExhausted { attempts: u32, last_error: String },

    /// The server answered, but not with the playlist.
    #[error("playlist server returned HTTP {0}")]
    FetchStatus(u16),

    /// The playlist downloaded but contained no usable entries.
    #[error("no channels found in playlist from {0}")]
    EmptyPlaylist(String),

    /// Could not write the final playlist to disk.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run phases, in order. Mirrors the tool's console banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Verifying,
    Repairing,
    Extending,
    Organizing,
    Saving,
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Verifying => "Phase 1: Verification",
            Phase::Repairing => "Phase 2: Interactive Repair",
            Phase::Extending => "Phase 3: Add Channels",
            Phase::Organizing => "Phase 4: Organize List",
            Phase::Saving => "Phase 5: Save",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Per-entry progress line during verification.
#[derive(Debug, Clone)]
pub struct VerifyProgress {
    pub current: usize,
    pub total: usize,
    pub name: String,
}

impl VerifyProgress {
    pub fn new(current: usize, total: usize, name: impl Into<String>) -> Self {
        Self {
            current,
            total,
            name: name.into(),
        }
    }

    pub fn to_message(&self) -> String {
        format!("[{:03}/{:03}] Checking '{}'...", self.current, self.total, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Verifying.to_string(), "Phase 1: Verification");
    }

    #[test]
    fn test_progress_message_padding() {
        let p = VerifyProgress::new(7, 120, "CNN");
        assert_eq!(p.to_message(), "[007/120] Checking 'CNN'...");
    }
}
