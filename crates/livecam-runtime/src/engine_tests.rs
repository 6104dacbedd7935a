use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use livecam_config::{EndpointsConfig, ResolverConfig};
use livecam_protocols::{EmbedPayload, ManifestPayload, ProbeOutcome};

const PAGE: &str = "https://example.test/cam";

struct ScriptedResolver {
    embed: ProbeOutcome<EmbedPayload>,
    manifest: ProbeOutcome<ManifestPayload>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    fn new(embed: ProbeOutcome<EmbedPayload>, manifest: ProbeOutcome<ManifestPayload>) -> Self {
        Self {
            embed,
            manifest,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PageResolver for ScriptedResolver {
    async fn probe_embed(&self, _page_url: &str) -> ProbeOutcome<EmbedPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.embed.clone()
    }

    async fn probe_manifest(&self, _page_url: &str) -> ProbeOutcome<ManifestPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.manifest.clone()
    }
}

fn links() -> PlaybackLinks {
    let endpoints = EndpointsConfig {
        base_url: Some("https://relay.example".to_string()),
        ..Default::default()
    };
    PlaybackLinks::from_config(&endpoints, &ResolverConfig::default())
}

fn engine(resolver: Arc<ScriptedResolver>) -> ResolutionEngine {
    ResolutionEngine::new(links(), Some(resolver), Duration::from_secs(5))
}

#[test]
fn test_from_config_without_base_has_no_backend() {
    let engine = ResolutionEngine::from_config(&Config::default()).unwrap();
    assert!(!engine.has_backend());
    assert!(!engine.links().is_proxied());
}

#[test]
fn test_from_config_with_base() {
    let mut config = Config::default();
    config.endpoints.base_url = Some("https://relay.example".to_string());
    let engine = ResolutionEngine::from_config(&config).unwrap();
    assert!(engine.has_backend());
    assert!(engine.links().is_proxied());
}

#[tokio::test]
async fn test_run_publishes_probing_then_terminal() {
    let resolver = Arc::new(ScriptedResolver::new(
        ProbeOutcome::NotFound("none".to_string()),
        ProbeOutcome::Found(ManifestPayload::new("https://cdn.test/live/master.m3u8")),
    ));
    let engine = engine(resolver.clone());

    let mut seen = Vec::new();
    let resolution = engine
        .run(
            Marker::new("cam", "Cam").with_page(PAGE),
            &CancellationToken::new(),
            |state| seen.push(state.label()),
        )
        .await
        .unwrap();

    assert_eq!(seen, vec!["probing", "probing", "playable-stream"]);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        resolution.state(),
        &ResolutionState::PlayableStream {
            playback_url: "https://relay.example/proxy/https://cdn.test/live/master.m3u8"
                .to_string(),
            source_url: "https://cdn.test/live/master.m3u8".to_string(),
        }
    );
}

#[tokio::test]
async fn test_static_hints_skip_resolver() {
    let resolver = Arc::new(ScriptedResolver::new(
        ProbeOutcome::NotFound("none".to_string()),
        ProbeOutcome::NotFound("none".to_string()),
    ));
    let engine = engine(resolver.clone());

    let resolution = engine
        .resolve(Marker::new("bay", "Bay").with_embed_id("abc123"))
        .await
        .unwrap();
    assert!(matches!(
        resolution.state(),
        ResolutionState::PlayableEmbed { .. }
    ));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_probe_timeout_is_transport_error() {
    let resolver = Arc::new(
        ScriptedResolver::new(
            ProbeOutcome::NotFound("none".to_string()),
            ProbeOutcome::NotFound("none".to_string()),
        )
        .with_delay(Duration::from_secs(60)),
    );
    let engine = ResolutionEngine::new(
        PlaybackLinks::direct(ResolverConfig::default().embed_template),
        Some(resolver),
        Duration::from_millis(500),
    );

    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(PAGE))
        .await
        .unwrap();
    match resolution.state() {
        ResolutionState::Unresolved {
            last_failure: Some(detail),
        } => assert!(detail.contains("timed out after 500ms"), "{}", detail),
        other => panic!("expected unresolved, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_probe() {
    let resolver = Arc::new(
        ScriptedResolver::new(
            ProbeOutcome::NotFound("none".to_string()),
            ProbeOutcome::NotFound("none".to_string()),
        )
        .with_delay(Duration::from_secs(3)),
    );
    let engine = engine(resolver);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let result = engine
        .run(Marker::new("cam", "Cam").with_page(PAGE), &token, |_| {})
        .await;
    assert!(matches!(result, Err(ResolveError::Cancelled)));
}

#[tokio::test]
async fn test_no_resolver_skips_probes() {
    let engine = ResolutionEngine::new(links(), None, Duration::from_secs(1));
    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(PAGE))
        .await
        .unwrap();

    // The frame proxy is still available without a backend.
    assert!(matches!(
        resolution.state(),
        ResolutionState::ProxiedFrame { .. }
    ));
    assert!(resolution.attempts().iter().all(|a| a.strategy.probe().is_none()
        || a.result == livecam_protocols::AttemptResult::skipped()));
}
