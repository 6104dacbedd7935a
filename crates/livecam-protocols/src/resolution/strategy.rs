//! Strategies of the fallback chain.

use serde::{Deserialize, Serialize};

use crate::probe::ProbeKind;

/// One option in the fixed resolution priority chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Marker carries a playable manifest URL.
    StaticStream,
    /// Marker carries a hosted-video embed identifier.
    StaticEmbed,
    /// Backend extraction of an embed from the marker page.
    EmbedProbe,
    /// Backend extraction of a manifest from the marker page.
    ManifestProbe,
    /// Embed the marker page itself through the frame proxy.
    ProxiedPage,
    /// Embed the marker's fallback frame URL directly.
    FallbackFrame,
}

impl Strategy {
    /// Priority order. Earlier entries are always tried first.
    pub const ORDER: [Strategy; 6] = [
        Strategy::StaticStream,
        Strategy::StaticEmbed,
        Strategy::EmbedProbe,
        Strategy::ManifestProbe,
        Strategy::ProxiedPage,
        Strategy::FallbackFrame,
    ];

    /// Position in [`Strategy::ORDER`].
    pub fn rank(self) -> usize {
        self as usize
    }

    /// The backend probe this strategy needs, if any.
    pub fn probe(self) -> Option<ProbeKind> {
        match self {
            Self::EmbedProbe => Some(ProbeKind::Embed),
            Self::ManifestProbe => Some(ProbeKind::Manifest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StaticStream => "static-stream",
            Self::StaticEmbed => "static-embed",
            Self::EmbedProbe => "embed-probe",
            Self::ManifestProbe => "manifest-probe",
            Self::ProxiedPage => "proxied-page",
            Self::FallbackFrame => "fallback-frame",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProbeKind> for Strategy {
    fn from(kind: ProbeKind) -> Self {
        match kind {
            ProbeKind::Embed => Self::EmbedProbe,
            ProbeKind::Manifest => Self::ManifestProbe,
        }
    }
}
