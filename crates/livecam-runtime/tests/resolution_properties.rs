//! End-to-end resolution behaviour against a faked extraction backend.

use std::sync::Arc;
use std::time::Duration;

use livecam_config::Config;
use livecam_protocols::{EmbedOrigin, Marker, PageResolver, ResolutionState, Strategy};
use livecam_proxy::PlaybackLinks;
use livecam_resolver::HttpPageResolver;
use livecam_runtime::{ResolutionEngine, SessionController};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "https://example.test/cam";

fn config_for(base: Option<String>) -> Config {
    let mut config = Config::default();
    config.endpoints.base_url = base;
    config.resolver.probe_timeout_secs = 2;
    config
}

async fn backend() -> MockServer {
    MockServer::start().await
}

async fn mount_embed(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/extract/embed"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_manifest(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/extract/manifest"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn backend_calls(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn direct_stream_makes_no_backend_calls() {
    let server = backend().await;
    let engine = ResolutionEngine::from_config(&config_for(Some(server.uri()))).unwrap();

    let marker = Marker::new("tower", "Tokyo Tower")
        .with_direct_stream("https://cdn.test/live/tower.m3u8")
        .with_page(PAGE);
    let resolution = engine.resolve(marker).await.unwrap();

    assert_eq!(
        resolution.state(),
        &ResolutionState::PlayableStream {
            playback_url: format!("{}/proxy/https://cdn.test/live/tower.m3u8", server.uri()),
            source_url: "https://cdn.test/live/tower.m3u8".to_string(),
        }
    );
    assert_eq!(backend_calls(&server).await, 0);
}

#[tokio::test]
async fn static_embed_never_probes() {
    let server = backend().await;
    let controller = SessionController::from_config(&config_for(Some(server.uri()))).unwrap();

    let mut rx = controller.subscribe();
    controller.select(Marker::new("bay", "Tokyo Bay").with_embed_id("abc123"));
    let snapshot = rx.wait_for(|s| s.state.is_terminal()).await.unwrap().clone();

    let strategies: Vec<Strategy> = snapshot.attempts.iter().map(|a| a.strategy).collect();
    assert_eq!(strategies, vec![Strategy::StaticStream, Strategy::StaticEmbed]);
    assert_eq!(
        controller.snapshot().state,
        ResolutionState::PlayableEmbed {
            embed_url: "https://www.youtube.com/embed/abc123?autoplay=1&mute=1".to_string(),
            origin: EmbedOrigin::Reconstructed,
        }
    );
    assert_eq!(backend_calls(&server).await, 0);
}

#[tokio::test]
async fn manifest_fallback_is_routed_through_proxy() {
    let server = backend().await;
    mount_embed(
        &server,
        ResponseTemplate::new(404).set_body_string("no embed found on page"),
    )
    .await;
    mount_manifest(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "url": "https://cdn.test/live/master.m3u8" })),
    )
    .await;

    let engine = ResolutionEngine::from_config(&config_for(Some(server.uri()))).unwrap();
    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(PAGE))
        .await
        .unwrap();

    assert_eq!(
        resolution.state(),
        &ResolutionState::PlayableStream {
            playback_url: format!(
                "{}/proxy/https://cdn.test/live/master.m3u8",
                server.uri()
            ),
            source_url: "https://cdn.test/live/master.m3u8".to_string(),
        }
    );

    let embed = resolution
        .attempts()
        .iter()
        .find(|a| a.strategy == Strategy::EmbedProbe)
        .unwrap();
    assert_eq!(embed.result.failure_detail(), Some("no embed found on page"));
    assert_eq!(backend_calls(&server).await, 2);
}

#[tokio::test]
async fn page_only_not_found_uses_proxied_frame() {
    let server = backend().await;
    mount_embed(&server, ResponseTemplate::new(404)).await;
    mount_manifest(&server, ResponseTemplate::new(404)).await;

    let engine = ResolutionEngine::from_config(&config_for(Some(server.uri()))).unwrap();
    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(PAGE))
        .await
        .unwrap();

    assert_eq!(
        resolution.state(),
        &ResolutionState::ProxiedFrame {
            frame_url: format!("{}/frame?url=https%3A%2F%2Fexample.test%2Fcam", server.uri()),
            page_url: PAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn page_only_without_base_falls_back_or_gives_up() {
    let engine = ResolutionEngine::from_config(&config_for(None)).unwrap();

    let with_fallback = Marker::new("cam", "Cam")
        .with_page(PAGE)
        .with_fallback_frame("https://embed.test/cam");
    let resolution = engine.resolve(with_fallback).await.unwrap();
    assert_eq!(
        resolution.state(),
        &ResolutionState::DirectFrame {
            frame_url: "https://embed.test/cam".to_string()
        }
    );

    let without = Marker::new("cam", "Cam").with_page(PAGE);
    let resolution = engine.resolve(without).await.unwrap();
    assert!(matches!(
        resolution.state(),
        ResolutionState::Unresolved { .. }
    ));
}

#[tokio::test]
async fn backend_failures_end_unresolved_with_last_detail() {
    let server = backend().await;
    mount_embed(&server, ResponseTemplate::new(404).set_body_string("no player")).await;
    mount_manifest(&server, ResponseTemplate::new(503).set_body_string("busy")).await;

    let config = config_for(Some(server.uri()));
    let resolver = HttpPageResolver::from_config(&config)
        .unwrap()
        .map(|r| Arc::new(r) as Arc<dyn PageResolver>);
    // Direct links leave no frame strategy to fall back on.
    let links = PlaybackLinks::direct(config.resolver.embed_template.clone());
    let engine = ResolutionEngine::new(links, resolver, Duration::from_secs(2));

    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(PAGE))
        .await
        .unwrap();
    match resolution.state() {
        ResolutionState::Unresolved {
            last_failure: Some(detail),
        } => {
            assert!(detail.contains("503"), "{}", detail);
        }
        other => panic!("expected unresolved, got {:?}", other),
    }
}

#[tokio::test]
async fn no_hints_is_unresolved_without_backend_calls() {
    let server = backend().await;
    let engine = ResolutionEngine::from_config(&config_for(Some(server.uri()))).unwrap();

    let resolution = engine.resolve(Marker::new("void", "Nothing")).await.unwrap();
    assert_eq!(
        resolution.state(),
        &ResolutionState::Unresolved { last_failure: None }
    );
    assert_eq!(backend_calls(&server).await, 0);
}

#[tokio::test]
async fn resolving_twice_gives_same_terminal_state() {
    let server = backend().await;
    mount_embed(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "live42" })),
    )
    .await;

    let engine = ResolutionEngine::from_config(&config_for(Some(server.uri()))).unwrap();
    let marker = Marker::new("cam", "Cam").with_page(PAGE);

    let first = engine.resolve(marker.clone()).await.unwrap();
    let second = engine.resolve(marker).await.unwrap();
    assert_eq!(first.state(), second.state());
    assert!(matches!(
        first.state(),
        ResolutionState::PlayableEmbed {
            origin: EmbedOrigin::Reconstructed,
            ..
        }
    ));
}

#[tokio::test]
async fn late_probe_result_never_reaches_new_selection() {
    let server = backend().await;
    mount_embed(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "fullUrl": "https://www.youtube.com/embed/late" }))
            .set_delay(Duration::from_millis(500)),
    )
    .await;

    let controller = SessionController::from_config(&config_for(Some(server.uri()))).unwrap();
    let mut rx = controller.subscribe();

    let first = controller.select(Marker::new("a", "A").with_page(PAGE));
    rx.wait_for(|s| matches!(s.state, ResolutionState::Probing { .. }))
        .await
        .unwrap();

    let second = controller.select(
        Marker::new("b", "B").with_fallback_frame("https://embed.test/b"),
    );
    assert!(first.release.is_cancelled());

    tokio::time::sleep(Duration::from_millis(900)).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.session_id, second.session_id);
    assert_eq!(snapshot.marker_id.as_deref(), Some("b"));
    assert_eq!(
        snapshot.state,
        ResolutionState::DirectFrame {
            frame_url: "https://embed.test/b".to_string()
        }
    );
}
