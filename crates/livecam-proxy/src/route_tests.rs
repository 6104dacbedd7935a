use super::*;

fn rules() -> RouteRules {
    RouteRules::new("/proxy")
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn target(path: &str, query: Option<&str>, rules: &RouteRules) -> String {
    ProxyRoute::parse(path, query, rules)
        .unwrap()
        .target()
        .to_string()
}

#[test]
fn test_path_mode_absolute() {
    let route = ProxyRoute::parse("/proxy/https://cdn.test/live/master.m3u8", None, &rules()).unwrap();
    assert_eq!(route.mode(), AddressingMode::Path);
    assert_eq!(route.prefix(), "/proxy");
    assert_eq!(route.target().as_str(), "https://cdn.test/live/master.m3u8");
    assert_eq!(route.incoming_path(), "/proxy/https://cdn.test/live/master.m3u8");
}

#[test]
fn test_path_mode_keeps_query() {
    let route = ProxyRoute::parse(
        "/proxy/https://cdn.test/live/seg-01.ts",
        Some("token=abc&exp=10"),
        &rules(),
    )
    .unwrap();
    assert_eq!(
        route.target().as_str(),
        "https://cdn.test/live/seg-01.ts?token=abc&exp=10"
    );
    assert_eq!(
        route.incoming_path(),
        "/proxy/https://cdn.test/live/seg-01.ts?token=abc&exp=10"
    );
}

#[test]
fn test_path_mode_plain_http() {
    assert_eq!(
        target("/proxy/http://cam.test:8080/a.m3u8", None, &rules()),
        "http://cam.test:8080/a.m3u8"
    );
}

#[test]
fn test_path_mode_collapsed_slash() {
    assert_eq!(
        target("/proxy/https:/cdn.test/live/master.m3u8", None, &rules()),
        "https://cdn.test/live/master.m3u8"
    );
    assert_eq!(
        target("/proxy/http:/cdn.test/a", None, &rules()),
        "http://cdn.test/a"
    );
}

#[test]
fn test_path_mode_scheme_case_insensitive() {
    assert_eq!(
        target("/proxy/HTTPS://cdn.test/a", None, &rules()),
        "https://cdn.test/a"
    );
}

#[test]
fn test_path_mode_scheme_relative() {
    assert_eq!(
        target("/proxy//cdn.test/a.ts", None, &rules()),
        "https://cdn.test/a.ts"
    );

    let rules = rules().with_upstream_origin(Url::parse("http://origin.test").unwrap());
    assert_eq!(
        target("/proxy//cdn.test/a.ts", None, &rules),
        "http://cdn.test/a.ts"
    );
}

#[test]
fn test_path_mode_host_first_segment() {
    assert_eq!(
        target(
            "/proxy/www.skylinewebcams.com/en/webcam/japan/kanto/tokyo/tokyo-tower.html",
            None,
            &rules()
        ),
        "https://www.skylinewebcams.com/en/webcam/japan/kanto/tokyo/tokyo-tower.html"
    );
    assert_eq!(
        target("/proxy/cam.test:8443/live", None, &rules()),
        "https://cam.test:8443/live"
    );
}

#[test]
fn test_path_mode_relative_to_origin() {
    let rules = rules().with_upstream_origin(Url::parse("https://cdn.test/hls").unwrap());
    assert_eq!(
        target("/proxy/live/seg-7.ts", Some("v=2"), &rules),
        "https://cdn.test/hls/live/seg-7.ts?v=2"
    );
}

#[test]
fn test_query_mode() {
    let query = format!("url={}", encode("https://cdn.test/live/master.m3u8?token=a&b=c"));
    let route = ProxyRoute::parse("/proxy", Some(&query), &rules()).unwrap();
    assert_eq!(route.mode(), AddressingMode::Query);
    assert_eq!(
        route.target().as_str(),
        "https://cdn.test/live/master.m3u8?token=a&b=c"
    );
}

#[test]
fn test_query_mode_trailing_slash() {
    let query = format!("url={}", encode("https://cdn.test/a.m3u8"));
    let route = ProxyRoute::parse("/proxy/", Some(&query), &rules()).unwrap();
    assert_eq!(route.mode(), AddressingMode::Query);
    assert_eq!(route.target().as_str(), "https://cdn.test/a.m3u8");
}

#[test]
fn test_query_mode_requires_absolute_url() {
    let query = format!("url={}", encode("cdn.test/a.m3u8"));
    assert!(matches!(
        ProxyRoute::parse("/proxy", Some(&query), &rules()),
        Err(ProxyError::InvalidTarget(_))
    ));

    let query = format!("url={}", encode("ftp://cdn.test/a"));
    assert!(ProxyRoute::parse("/proxy", Some(&query), &rules()).is_err());
}

#[test]
fn test_invalid_targets() {
    let cases: &[(&str, Option<&str>)] = &[
        ("/proxy", None),
        ("/proxy/", None),
        ("/proxy", Some("other=1")),
        ("/proxy", Some("url=")),
        ("/elsewhere/https://cdn.test/a", None),
        ("/proxyx/https://cdn.test/a", None),
        ("/proxy/ftp://cdn.test/a", None),
        ("/proxy/file:///etc/passwd", None),
        ("/proxy/https://", None),
        ("/proxy/https:/", None),
    ];
    for (path, query) in cases {
        let result = ProxyRoute::parse(path, *query, &rules());
        assert!(
            matches!(result, Err(ProxyError::InvalidTarget(_))),
            "{} {:?} should be rejected, got {:?}",
            path,
            query,
            result
        );
    }
}

#[test]
fn test_allowed_hosts() {
    let rules = rules().with_allowed_hosts(["cdn.test", " Example.Test "]);

    assert!(ProxyRoute::parse("/proxy/https://cdn.test/a", None, &rules).is_ok());
    assert!(ProxyRoute::parse("/proxy/https://edge.cdn.test/a", None, &rules).is_ok());
    assert!(ProxyRoute::parse("/proxy/https://example.test/a", None, &rules).is_ok());

    for path in [
        "/proxy/https://evil.test/a",
        "/proxy/https://notcdn.test/a",
        "/proxy/https://cdn.test.evil/a",
    ] {
        assert!(
            matches!(
                ProxyRoute::parse(path, None, &rules),
                Err(ProxyError::InvalidTarget(_))
            ),
            "{} should be rejected",
            path
        );
    }

    let query = format!("url={}", encode("https://evil.test/a"));
    assert!(ProxyRoute::parse("/proxy", Some(&query), &rules).is_err());
}

#[test]
fn test_both_modes_agree() {
    let targets = [
        "https://cdn.test/live/master.m3u8",
        "https://cdn.test/live/seg-001.ts?token=x%2Fy&n=1",
        "http://cam.test:8080/mjpg/video.mjpg",
        "https://www.skylinewebcams.com/en/webcam/japan/kanto/tokyo/tokyo-tower.html",
        "https://video.test/a/b/c/index.m3u8?a=1&b=2&c=3",
    ];

    for raw in targets {
        let (path_part, query_part) = match raw.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (raw, None),
        };
        let path = format!("/proxy/{}", path_part);
        let by_path = ProxyRoute::parse(&path, query_part, &rules()).unwrap();

        let query = format!("url={}", encode(raw));
        let by_query = ProxyRoute::parse("/proxy", Some(&query), &rules()).unwrap();

        assert_eq!(by_path.target(), by_query.target(), "{}", raw);
        assert_eq!(by_path.target().as_str(), raw);
    }
}

#[test]
fn test_prefix_trailing_slash_normalized() {
    let rules = RouteRules::new("/relay/");
    assert_eq!(rules.prefix(), "/relay");
    assert_eq!(
        target("/relay/https://cdn.test/a", None, &rules),
        "https://cdn.test/a"
    );
}

#[test]
fn test_from_config() {
    let config = ProxyConfig {
        upstream_origin: Some("https://cdn.test/hls/".to_string()),
        allowed_hosts: vec!["cdn.test".to_string()],
        ..Default::default()
    };
    let rules = RouteRules::from_config("/proxy", &config).unwrap();
    assert_eq!(
        target("/proxy/live/a.ts", None, &rules),
        "https://cdn.test/hls/live/a.ts"
    );

    let config = ProxyConfig {
        upstream_origin: Some("not a url".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        RouteRules::from_config("/proxy", &config),
        Err(ProxyError::Setup(_))
    ));
}
