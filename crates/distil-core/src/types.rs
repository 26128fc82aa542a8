use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type SessionId = Uuid;

/// Hard cap on simplification passes within one session. Past this point the
/// text has reached semantic bedrock and further passes only strip meaning.
pub const MAX_SIMPLIFY_PASSES: u8 = 5;

/// Minimum number of simplification passes before a comic may be generated.
pub const COMIC_MIN_PASSES: u8 = 3;

/// Lifecycle states of a refinement session.
///
/// `Ready` and `Visualized` are the only states that accept new operations;
/// the remaining non-`Idle` states mark an outbound call in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Extracting,
    Reasoning,
    Ready,
    Simplifying,
    Visualizing,
    Visualized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Extracting => "extracting",
            SessionState::Reasoning => "reasoning",
            SessionState::Ready => "ready",
            SessionState::Simplifying => "simplifying",
            SessionState::Visualizing => "visualizing",
            SessionState::Visualized => "visualized",
        };
        write!(f, "{}", s)
    }
}

/// Decoded comic image produced by the visualization stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicArtifact {
    pub image: Vec<u8>,
    pub media_type: String,
}

/// A single refinement session: one source URL, its progressively refined
/// text, and the optional comic artifact. Plain value, owned by the caller,
/// never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    pub source_url: Option<String>,
    pub current_text: Option<String>,
    pub simplify_passes: u8,
    pub comic: Option<ComicArtifact>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            source_url: None,
            current_text: None,
            simplify_passes: 0,
            comic: None,
        }
    }

    /// Returns the session to `Idle`, dropping all derived content. Valid
    /// from any state, including mid-flight ones.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.source_url = None;
        self.current_text = None;
        self.simplify_passes = 0;
        self.comic = None;
    }

    pub fn comic_generated(&self) -> bool {
        self.comic.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
