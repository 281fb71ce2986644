//! Integration test: drive the uploader router end to end.
//!
//! Media redirects and downloads are served by a local axum server; photos land
//! in an in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::form_urlencoded;

use photogallery::media::{HttpMediaFetcher, HttpMediaLocator};
use photogallery::storage::MemoryStore;
use photogallery::web::uploader_router;
use photogallery::{AppState, IngestionPipeline, RebuildTrigger, SenderAuthorizer};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00";

#[derive(Default)]
struct CountingTrigger {
    fired: AtomicUsize,
}

impl RebuildTrigger for CountingTrigger {
    fn fire(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provider media host: `/Media/*` redirects into a bucket path served below.
async fn media_server() -> String {
    let app = Router::new()
        .route(
            "/Media/ME1",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/bucketX/p/q/img.png")]) }),
        )
        .route(
            "/Media/ME2",
            get(|| async {
                (
                    StatusCode::TEMPORARY_REDIRECT,
                    [(header::LOCATION, "/bucketX/p/q/second.jpg")],
                )
            }),
        )
        .route("/bucketX/p/q/img.png", get(|| async { PNG.to_vec() }))
        .route("/bucketX/p/q/second.jpg", get(|| async { JPEG.to_vec() }));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind media server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("media server");
    });
    format!("http://{}", addr)
}

struct Uploader {
    app: Router,
    store: Arc<MemoryStore>,
    trigger: Arc<CountingTrigger>,
}

fn uploader() -> Uploader {
    let store = Arc::new(MemoryStore::new());
    let trigger = Arc::new(CountingTrigger::default());
    let pipeline = IngestionPipeline::new(
        SenderAuthorizer::new(["+1555"]),
        Arc::new(HttpMediaLocator::new(None).unwrap()),
        Arc::new(HttpMediaFetcher::new(None).unwrap()),
        store.clone(),
        trigger.clone(),
    );
    Uploader {
        app: uploader_router(AppState::new(pipeline)),
        store,
        trigger,
    }
}

fn form(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

async fn post_sms(app: Router, body: String) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/sms")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn single_photo_is_stored_and_rebuild_fired() {
    let media = media_server().await;
    let uploader = uploader();
    let media_url = format!("{media}/Media/ME1");

    let (status, content_type, body) = post_sms(
        uploader.app.clone(),
        form(&[
            ("NumMedia", "1"),
            ("Body", "Hello"),
            ("From", "+1555"),
            ("MediaUrl0", &media_url),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert!(body.contains("<Message>Photo uploaded successfully!</Message>"));

    assert_eq!(uploader.store.keys(), vec!["photos/p/q/img.png"]);
    let stored = uploader.store.get("photos/p/q/img.png").unwrap();
    assert_eq!(stored.caption.as_deref(), Some("Hello"));
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.body, PNG.to_vec());
    assert_eq!(uploader.trigger.fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn two_photos_get_numbered_captions() {
    let media = media_server().await;
    let uploader = uploader();
    let first = format!("{media}/Media/ME1");
    let second = format!("{media}/Media/ME2");

    let (status, _, body) = post_sms(
        uploader.app.clone(),
        form(&[
            ("NumMedia", "2"),
            ("Body", "Park"),
            ("From", "+1555"),
            ("MediaUrl0", &first),
            ("MediaUrl1", &second),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Message>2 photos uploaded successfully!</Message>"));
    let second_photo = uploader.store.get("photos/p/q/second.jpg").unwrap();
    assert_eq!(second_photo.caption.as_deref(), Some("Park (2/2)"));
    assert_eq!(second_photo.content_type, "image/jpeg");
    assert_eq!(
        uploader.store.get("photos/p/q/img.png").unwrap().caption.as_deref(),
        Some("Park (1/2)")
    );
    assert_eq!(uploader.trigger.fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_sender_is_acknowledged_but_rejected() {
    let media = media_server().await;
    let uploader = uploader();
    let media_url = format!("{media}/Media/ME1");

    let (status, _, body) = post_sms(
        uploader.app.clone(),
        form(&[
            ("NumMedia", "1"),
            ("Body", "Hello"),
            ("From", "+1999"),
            ("MediaUrl0", &media_url),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Message>Sorry, not allowed!</Message>"));
    assert_eq!(uploader.store.write_count(), 0);
    assert_eq!(uploader.trigger.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn message_without_media_is_acknowledged() {
    let uploader = uploader();

    let (status, _, body) = post_sms(
        uploader.app.clone(),
        form(&[("NumMedia", "0"), ("Body", "hi"), ("From", "+1555")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Message>No media found in message.</Message>"));
    assert_eq!(uploader.store.write_count(), 0);
    assert_eq!(uploader.trigger.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_payload_is_a_server_error() {
    let uploader = uploader();

    let (status, _, body) = post_sms(
        uploader.app.clone(),
        form(&[("NumMedia", "many"), ("From", "+1555")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("NumMedia"));
}

#[tokio::test]
async fn failure_mid_batch_keeps_earlier_photos() {
    let media = media_server().await;
    let uploader = uploader();
    let first = format!("{media}/Media/ME1");
    let missing = format!("{media}/Media/gone");

    let (status, _, body) = post_sms(
        uploader.app.clone(),
        form(&[
            ("NumMedia", "2"),
            ("Body", "Park"),
            ("From", "+1555"),
            ("MediaUrl0", &first),
            ("MediaUrl1", &missing),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("attachment 2 of 2"));
    assert_eq!(uploader.store.keys(), vec!["photos/p/q/img.png"]);
    assert_eq!(uploader.trigger.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_endpoint() {
    let uploader = uploader();

    let response = uploader
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
}
