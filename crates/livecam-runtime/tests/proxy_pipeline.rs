//! Full pipeline: page extraction, resolution and proxied playback against a
//! locally served proxy.

use std::sync::Arc;

use axum::Router;
use livecam_config::Config;
use livecam_extract::Extractor;
use livecam_protocols::{Marker, ResolutionState};
use livecam_proxy::ProxyState;
use livecam_runtime::ResolutionEngine;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANIFEST: &str = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1280000\nlow/index.m3u8\n";

/// Serve the proxy and extraction endpoints on an ephemeral port and return
/// the config pointing at them.
async fn serve() -> Config {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = Config::default();
    config.endpoints.base_url = Some(format!("http://{}", addr));

    let proxy = Arc::new(ProxyState::from_config(&config).unwrap());
    let extractor = Arc::new(Extractor::from_config(&config).unwrap());
    let app = Router::new()
        .merge(livecam_proxy::routes(proxy))
        .merge(livecam_extract::routes(
            extractor,
            &config.endpoints.embed_path,
            &config.endpoints.manifest_path,
        ));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    config
}

#[tokio::test]
async fn proxied_manifest_matches_direct_fetch() {
    let origin = MockServer::start().await;
    let manifest_url = format!("{}/live/master.m3u8", origin.uri());

    Mock::given(method("GET"))
        .and(path("/cam.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<html><head></head><body><video src="{}"></video></body></html>"#,
                manifest_url
            ),
            "text/html",
        ))
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/live/master.m3u8"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(MANIFEST, "application/vnd.apple.mpegurl"),
        )
        .mount(&origin)
        .await;

    let config = serve().await;
    let engine = ResolutionEngine::from_config(&config).unwrap();

    let page = format!("{}/cam.html", origin.uri());
    let resolution = engine
        .resolve(Marker::new("cam", "Cam").with_page(page))
        .await
        .unwrap();

    let playback_url = match resolution.state() {
        ResolutionState::PlayableStream {
            playback_url,
            source_url,
        } => {
            assert_eq!(source_url, &manifest_url);
            playback_url.clone()
        }
        other => panic!("expected playable stream, got {:?}", other),
    };
    assert_eq!(
        playback_url,
        format!("{}/{}", config.endpoints.proxy_prefix_url().unwrap(), manifest_url)
    );

    let direct = reqwest::get(&manifest_url).await.unwrap().bytes().await.unwrap();
    let proxied = reqwest::get(&playback_url).await.unwrap();
    assert!(proxied.status().is_success());
    assert_eq!(
        proxied.headers().get("content-type").unwrap(),
        "application/vnd.apple.mpegurl"
    );
    assert_eq!(proxied.bytes().await.unwrap(), direct);
}

#[tokio::test]
async fn page_without_sources_ends_in_proxied_frame() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/still.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head></head><img src=\"now.jpg\"></html>", "text/html"),
        )
        .mount(&origin)
        .await;

    let config = serve().await;
    let engine = ResolutionEngine::from_config(&config).unwrap();

    let page = format!("{}/still.html", origin.uri());
    let resolution = engine
        .resolve(Marker::new("still", "Still").with_page(page.clone()))
        .await
        .unwrap();

    let frame_url = match resolution.state() {
        ResolutionState::ProxiedFrame {
            frame_url,
            page_url,
        } => {
            assert_eq!(page_url, &page);
            frame_url.clone()
        }
        other => panic!("expected proxied frame, got {:?}", other),
    };

    let html = reqwest::get(&frame_url).await.unwrap().text().await.unwrap();
    assert!(html.contains(&format!("<base href=\"{}\">", page)));
}
