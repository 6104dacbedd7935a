//! Resolution state exposed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::probe::ProbeKind;

/// Where a playable embed URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedOrigin {
    /// Built from an identifier and the configured embed template.
    Reconstructed,
    /// Returned verbatim by the extraction backend, provider parameters intact.
    Exact,
}

/// The single current classification of the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ResolutionState {
    /// Session created, nothing evaluated yet.
    #[default]
    Idle,

    /// A backend probe is outstanding.
    Probing { probe: ProbeKind },

    /// A manifest the player can consume.
    PlayableStream {
        /// URL handed to the player (proxied when a proxy is configured).
        playback_url: String,
        /// The manifest URL as discovered.
        source_url: String,
    },

    /// A third-party hosted player.
    PlayableEmbed { embed_url: String, origin: EmbedOrigin },

    /// The marker page embedded through the frame proxy.
    ProxiedFrame { frame_url: String, page_url: String },

    /// A page embedded without proxying.
    DirectFrame { frame_url: String },

    /// Every strategy was exhausted.
    Unresolved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_failure: Option<String>,
    },
}

impl ResolutionState {
    /// Terminal states do not transition further without a new selection.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Probing { .. })
    }

    /// Frame states carry the advisory load signal.
    pub fn is_frame(&self) -> bool {
        matches!(self, Self::ProxiedFrame { .. } | Self::DirectFrame { .. })
    }

    pub fn is_playable(&self) -> bool {
        matches!(self, Self::PlayableStream { .. } | Self::PlayableEmbed { .. })
    }

    /// Short tag used in logs and responses.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Probing { .. } => "probing",
            Self::PlayableStream { .. } => "playable-stream",
            Self::PlayableEmbed { .. } => "playable-embed",
            Self::ProxiedFrame { .. } => "proxied-frame",
            Self::DirectFrame { .. } => "direct-frame",
            Self::Unresolved { .. } => "unresolved",
        }
    }
}

/// Advisory load signal for frame states.
///
/// Browsers rarely report an embedding refusal as an error; a frame that
/// never fires its load event within the grace period is the only hint.
/// This is best effort and never changes the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameLoad {
    /// The current state is not a frame.
    #[default]
    NotApplicable,
    /// Waiting for the frame to report a load.
    Pending,
    /// The frame reported a load within the grace period.
    Loaded,
    /// No load was reported in time; offer to open the page externally.
    Stalled,
}
