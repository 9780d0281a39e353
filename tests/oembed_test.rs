//! oEmbed resolver tests
//!
//! Tests locator handling, title lookup and error mapping against a mock
//! oEmbed endpoint.

use mockito::{Matcher, Server};
use guildplay::api::{MediaResolver, OEmbedResolver, ResolveError};

const CANONICAL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn oembed_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("url".into(), CANONICAL.into()),
        Matcher::UrlEncoded("format".into(), "json".into()),
    ])
}

#[tokio::test]
async fn test_resolve_returns_title_and_canonical_url() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/oembed")
        .match_query(oembed_query())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "title": "Rick Astley - Never Gonna Give You Up",
                "author_name": "Rick Astley",
                "type": "video",
                "provider_name": "YouTube"
            }"#,
        )
        .create_async()
        .await;

    let resolver = OEmbedResolver::with_base_url(server.url());
    let media = resolver
        .resolve("https://youtu.be/dQw4w9WgXcQ?si=abc")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(media.title, "Rick Astley - Never Gonna Give You Up");
    assert_eq!(media.canonical_url, CANONICAL);
}

#[tokio::test]
async fn test_resolve_bare_id() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/oembed")
        .match_query(oembed_query())
        .with_status(200)
        .with_body(r#"{"title": "Bare"}"#)
        .create_async()
        .await;

    let resolver = OEmbedResolver::with_base_url(format!("{}/", server.url()));
    let media = resolver.resolve("dQw4w9WgXcQ").await.unwrap();

    mock.assert_async().await;
    assert_eq!(media.title, "Bare");
}

#[tokio::test]
async fn test_unrecognized_locator_is_not_found_without_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let resolver = OEmbedResolver::with_base_url(server.url());
    let err = resolver.resolve("some song name").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ResolveError::NotFound(ref l) if l == "some song name"));
}

#[tokio::test]
async fn test_missing_video_is_not_found() {
    for status in [400, 401, 403, 404] {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/oembed")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body("Not Found")
            .create_async()
            .await;

        let resolver = OEmbedResolver::with_base_url(server.url());
        let err = resolver.resolve(CANONICAL).await.unwrap_err();
        assert!(
            matches!(err, ResolveError::NotFound(_)),
            "status {} should map to NotFound, got {:?}",
            status,
            err
        );
    }
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/oembed")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let resolver = OEmbedResolver::with_base_url(server.url());
    let err = resolver.resolve(CANONICAL).await.unwrap_err();

    assert!(matches!(err, ResolveError::InvalidResponse(ref m) if m.contains("503")));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/oembed")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let resolver = OEmbedResolver::with_base_url(server.url());
    let err = resolver.resolve(CANONICAL).await.unwrap_err();

    assert!(matches!(err, ResolveError::InvalidResponse(_)));
}
