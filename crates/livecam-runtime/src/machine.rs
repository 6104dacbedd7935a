//! The fallback chain as a pure, stepwise transition function.
//!
//! A [`Resolution`] walks [`Strategy::ORDER`] once. Static strategies settle
//! immediately, probe strategies hand a [`Step::Probe`] back to the caller and
//! wait for [`Resolution::apply`]. Nothing here performs I/O.

use livecam_protocols::{
    AttemptResult, EmbedOrigin, EmbedPayload, ManifestPayload, Marker, ProbeKind, ProbeOutcome,
    ResolutionAttempt, ResolutionState, Strategy,
};
use livecam_proxy::PlaybackLinks;
use tracing::debug;

/// What the caller has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run this probe and feed the result to [`Resolution::apply`].
    Probe { kind: ProbeKind, page_url: String },
    /// A terminal state was reached.
    Settled(ResolutionState),
}

/// Outcome of one backend probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Embed(ProbeOutcome<EmbedPayload>),
    Manifest(ProbeOutcome<ManifestPayload>),
}

impl ProbeResult {
    pub fn kind(&self) -> ProbeKind {
        match self {
            Self::Embed(_) => ProbeKind::Embed,
            Self::Manifest(_) => ProbeKind::Manifest,
        }
    }

    /// A transport failure for `kind`, e.g. a timeout enforced by the caller.
    pub fn transport_error(kind: ProbeKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match kind {
            ProbeKind::Embed => Self::Embed(ProbeOutcome::TransportError(detail)),
            ProbeKind::Manifest => Self::Manifest(ProbeOutcome::TransportError(detail)),
        }
    }
}

enum Evaluation {
    Settle(ResolutionState, String),
    Probe(ProbeKind, String),
    Skip,
}

/// One selection's walk through the fallback chain.
#[derive(Debug, Clone)]
pub struct Resolution {
    marker: Marker,
    links: PlaybackLinks,
    backend: bool,
    cursor: usize,
    awaiting: Option<ProbeKind>,
    state: ResolutionState,
    attempts: Vec<ResolutionAttempt>,
}

impl Resolution {
    /// Start in `idle`. `backend` says whether extraction probes can run.
    pub fn new(marker: Marker, links: PlaybackLinks, backend: bool) -> Self {
        Self {
            marker,
            links,
            backend,
            cursor: 0,
            awaiting: None,
            state: ResolutionState::Idle,
            attempts: Vec::new(),
        }
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub fn attempts(&self) -> &[ResolutionAttempt] {
        &self.attempts
    }

    pub fn into_parts(self) -> (ResolutionState, Vec<ResolutionAttempt>) {
        (self.state, self.attempts)
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_terminal()
    }

    /// Evaluate strategies until one settles or needs a probe.
    ///
    /// Calling again while a probe is outstanding repeats the same request;
    /// calling after settling returns the terminal state unchanged.
    pub fn advance(&mut self) -> Step {
        if self.state.is_terminal() {
            return Step::Settled(self.state.clone());
        }
        if let Some(kind) = self.awaiting {
            return self.probe_step(kind);
        }

        while let Some(strategy) = Strategy::ORDER.get(self.cursor).copied() {
            self.cursor += 1;
            match self.evaluate(strategy) {
                Evaluation::Settle(state, payload) => {
                    self.record(strategy, AttemptResult::resolved(payload));
                    return self.settle(state);
                }
                Evaluation::Probe(kind, page_url) => {
                    debug!(marker_id = %self.marker.id, %strategy, "Probing");
                    self.awaiting = Some(kind);
                    self.state = ResolutionState::Probing { probe: kind };
                    return Step::Probe { kind, page_url };
                }
                Evaluation::Skip => self.record(strategy, AttemptResult::skipped()),
            }
        }

        let last_failure = self.last_failure().map(str::to_string);
        self.settle(ResolutionState::Unresolved { last_failure })
    }

    /// Feed the result of the outstanding probe. Returns `false` and changes
    /// nothing when no probe of that kind is outstanding.
    pub fn apply(&mut self, result: ProbeResult) -> bool {
        if self.awaiting != Some(result.kind()) {
            return false;
        }
        self.awaiting = None;

        let strategy = Strategy::from(result.kind());
        match result {
            ProbeResult::Embed(ProbeOutcome::Found(payload)) => {
                let (embed_url, origin) = match (payload.full_url(), payload.id()) {
                    (Some(full), _) => (full.to_string(), EmbedOrigin::Exact),
                    (None, Some(id)) => (self.links.embed_url(id), EmbedOrigin::Reconstructed),
                    (None, None) => {
                        self.record(strategy, AttemptResult::not_found("empty embed payload"));
                        return true;
                    }
                };
                self.record(strategy, AttemptResult::resolved(embed_url.clone()));
                self.settle(ResolutionState::PlayableEmbed { embed_url, origin });
            }
            ProbeResult::Manifest(ProbeOutcome::Found(payload)) => match payload.url() {
                Some(source) => {
                    let playback_url = self.links.stream_url(source);
                    self.record(strategy, AttemptResult::resolved(playback_url.clone()));
                    self.settle(ResolutionState::PlayableStream {
                        playback_url,
                        source_url: source.to_string(),
                    });
                }
                None => self.record(strategy, AttemptResult::not_found("empty manifest url")),
            },
            ProbeResult::Embed(ProbeOutcome::NotFound(reason))
            | ProbeResult::Manifest(ProbeOutcome::NotFound(reason)) => {
                self.record(strategy, AttemptResult::not_found(reason));
            }
            ProbeResult::Embed(ProbeOutcome::TransportError(detail))
            | ProbeResult::Manifest(ProbeOutcome::TransportError(detail)) => {
                self.record(strategy, AttemptResult::transport(detail));
            }
        }
        true
    }

    fn evaluate(&self, strategy: Strategy) -> Evaluation {
        let marker = &self.marker;
        match strategy {
            Strategy::StaticStream => match marker.direct_stream() {
                Some(source) => {
                    let playback_url = self.links.stream_url(source);
                    Evaluation::Settle(
                        ResolutionState::PlayableStream {
                            playback_url: playback_url.clone(),
                            source_url: source.to_string(),
                        },
                        playback_url,
                    )
                }
                None => Evaluation::Skip,
            },
            Strategy::StaticEmbed => match marker.embed() {
                Some(id) => {
                    let embed_url = self.links.embed_url(id);
                    Evaluation::Settle(
                        ResolutionState::PlayableEmbed {
                            embed_url: embed_url.clone(),
                            origin: EmbedOrigin::Reconstructed,
                        },
                        embed_url,
                    )
                }
                None => Evaluation::Skip,
            },
            Strategy::EmbedProbe | Strategy::ManifestProbe => match marker.page() {
                Some(page) if self.backend => match strategy.probe() {
                    Some(kind) => Evaluation::Probe(kind, page.to_string()),
                    None => Evaluation::Skip,
                },
                _ => Evaluation::Skip,
            },
            Strategy::ProxiedPage => {
                match marker.page().and_then(|page| self.links.frame_url(page).map(|f| (page, f))) {
                    Some((page, frame_url)) => Evaluation::Settle(
                        ResolutionState::ProxiedFrame {
                            frame_url: frame_url.clone(),
                            page_url: page.to_string(),
                        },
                        frame_url,
                    ),
                    None => Evaluation::Skip,
                }
            }
            Strategy::FallbackFrame => match marker.fallback_frame() {
                Some(frame) => Evaluation::Settle(
                    ResolutionState::DirectFrame {
                        frame_url: frame.to_string(),
                    },
                    frame.to_string(),
                ),
                None => Evaluation::Skip,
            },
        }
    }

    fn probe_step(&self, kind: ProbeKind) -> Step {
        Step::Probe {
            kind,
            page_url: self.marker.page().unwrap_or_default().to_string(),
        }
    }

    fn record(&mut self, strategy: Strategy, result: AttemptResult) {
        self.attempts.push(ResolutionAttempt::new(strategy, result));
    }

    fn settle(&mut self, state: ResolutionState) -> Step {
        debug!(marker_id = %self.marker.id, state = state.label(), "Settled");
        self.state = state;
        Step::Settled(self.state.clone())
    }

    fn last_failure(&self) -> Option<&str> {
        self.attempts
            .iter()
            .rev()
            .find_map(|attempt| attempt.result.failure_detail())
    }
}

/// Run a whole resolution synchronously, asking `probe` for each backend
/// result.
pub fn resolve_with<F>(marker: Marker, links: PlaybackLinks, backend: bool, mut probe: F) -> Resolution
where
    F: FnMut(ProbeKind, &str) -> ProbeResult,
{
    let mut resolution = Resolution::new(marker, links, backend);
    while let Step::Probe { kind, page_url } = resolution.advance() {
        let result = probe(kind, &page_url);
        if !resolution.apply(result) {
            let mismatch = ProbeResult::transport_error(kind, "probe answered for another kind");
            resolution.apply(mismatch);
        }
    }
    resolution
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
