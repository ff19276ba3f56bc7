//! Integration tests for the request pipeline and sink fan-out.
//!
//! Drives the assembled router directly with `tower::ServiceExt::oneshot`
//! so no sockets are involved.

use std::io::Write;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use signet_gateway::{build_router, Config, GatewayError, RouteConfig};
use signet_registry::{ConfigMap, OptionValue, RegistryError};
use signet_signer::{register_builtin_providers, SignerRegistry};
use signet_webhook::{register_builtin_handlers, HandlerRegistry};

const SECRET: &str = "topsecret";

struct Fixture {
    secret_file: tempfile::NamedTempFile,
    key_file: tempfile::NamedTempFile,
    attestation_dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let mut secret_file = tempfile::NamedTempFile::new().unwrap();
        secret_file.write_all(SECRET.as_bytes()).unwrap();

        let mut key_file = tempfile::NamedTempFile::new().unwrap();
        key_file.write_all("22".repeat(32).as_bytes()).unwrap();

        Self {
            secret_file,
            key_file,
            attestation_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self, archive_url: Option<String>) -> Config {
        let mut options = ConfigMap::new();
        options.insert(
            "secret-file-path".to_string(),
            OptionValue::from(self.secret_file.path().display().to_string()),
        );

        let mut signer_options = ConfigMap::new();
        signer_options.insert(
            "key-path".to_string(),
            OptionValue::from(self.key_file.path().display().to_string()),
        );

        let mut config = Config {
            archive_url,
            attestation_dir: Some(self.attestation_dir.path().to_path_buf()),
            ..Config::default()
        };
        config.webhooks.insert("github".to_string(), RouteConfig {
            handler_type: "github".to_string(),
            options,
            signer: "file".to_string(),
            signer_options,
        });
        config
    }

    fn stored_files(&self) -> Vec<String> {
        std::fs::read_dir(self.attestation_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

fn registries() -> (HandlerRegistry, SignerRegistry) {
    let mut handlers = HandlerRegistry::new();
    register_builtin_handlers(&mut handlers).unwrap();
    let mut signers = SignerRegistry::new();
    register_builtin_providers(&mut signers).unwrap();
    (handlers, signers)
}

async fn router_for(config: &Config) -> axum::Router {
    let (handlers, signers) = registries();
    build_router(config, &handlers, &signers).await.unwrap()
}

fn github_signature(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

fn webhook_request(signature: &str, event: &str, body: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/github")
        .header("X-GitHub-Event", event)
        .header("X-Hub-Signature-256", signature)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn valid_webhook_writes_content_addressed_attestation() {
    let fixture = Fixture::new();
    let router = router_for(&fixture.config(None)).await;

    let body = br#"{"zen":"ok"}"#;
    let response = router
        .oneshot(webhook_request(&github_signature(body), "push", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let files = fixture.stored_files();
    assert_eq!(files.len(), 1);
    // 64 hex chars + ".json"
    assert_eq!(files[0].len(), 69);
    assert!(files[0].ends_with(".json"));
}

#[tokio::test]
async fn invalid_signature_answers_400_and_writes_nothing() {
    let fixture = Fixture::new();
    let router = router_for(&fixture.config(None)).await;

    let body = br#"{"zen":"ok"}"#;
    let bad_signature = format!("sha256={}", "0".repeat(64));
    let response = router
        .oneshot(webhook_request(&bad_signature, "push", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(fixture.stored_files().is_empty());
}

#[tokio::test]
async fn ping_event_is_a_successful_noop() {
    let fixture = Fixture::new();
    let router = router_for(&fixture.config(None)).await;

    let response = router
        .oneshot(webhook_request("sha256=garbage", "ping", br#"{"zen":"ok"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(fixture.stored_files().is_empty());
}

#[tokio::test]
async fn failing_archive_dominates_status_but_local_sink_still_writes() {
    let archive = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&archive)
        .await;

    let fixture = Fixture::new();
    let router = router_for(&fixture.config(Some(archive.uri()))).await;

    let body = br#"{"zen":"ok"}"#;
    let response = router
        .oneshot(webhook_request(&github_signature(body), "push", body))
        .await
        .unwrap();

    // Remote failure wins even though the local write succeeded.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fixture.stored_files().len(), 1);
}

#[tokio::test]
async fn healthy_archive_and_disk_both_store() {
    let archive = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "gitoid": "gitoid:blob:sha256:abc123"
        })))
        .expect(1)
        .mount(&archive)
        .await;

    let fixture = Fixture::new();
    let router = router_for(&fixture.config(Some(archive.uri()))).await;

    let body = br#"{"zen":"ok"}"#;
    let response = router
        .oneshot(webhook_request(&github_signature(body), "push", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fixture.stored_files().len(), 1);
}

#[tokio::test]
async fn repeated_event_is_idempotent_on_disk() {
    let fixture = Fixture::new();
    let config = fixture.config(None);

    let body = br#"{"zen":"ok"}"#;
    for _ in 0..2 {
        let response = router_for(&config)
            .await
            .oneshot(webhook_request(&github_signature(body), "push", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Same signer key and payload, so the envelope digest is identical.
    assert_eq!(fixture.stored_files().len(), 1);
}

#[tokio::test]
async fn ready_endpoint_answers_200() {
    let fixture = Fixture::new();
    let router = router_for(&fixture.config(None)).await;

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-Request-Id"));
}

#[tokio::test]
async fn unknown_handler_type_fails_startup() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.webhooks.get_mut("github").unwrap().handler_type = "gitlab".to_string();

    let (handlers, signers) = registries();
    let err = build_router(&config, &handlers, &signers).await.unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Configuration {
            source: RegistryError::UnknownType { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_handler_option_fails_startup() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config
        .webhooks
        .get_mut("github")
        .unwrap()
        .options
        .insert("secret-file".to_string(), OptionValue::from("/typo"));

    let (handlers, signers) = registries();
    let err = build_router(&config, &handlers, &signers).await.unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Configuration {
            source: RegistryError::UnknownOption { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn route_name_with_router_syntax_fails_startup() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    let route = config.webhooks.remove("github").unwrap();
    config.webhooks.insert("gh{hook".to_string(), route);

    let (handlers, signers) = registries();
    let err = build_router(&config, &handlers, &signers).await.unwrap_err();

    assert!(matches!(err, GatewayError::InvalidRouteName { name } if name == "gh{hook"));
}

#[tokio::test]
async fn route_with_unreadable_secret_is_skipped_not_fatal() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config
        .webhooks
        .get_mut("github")
        .unwrap()
        .options
        .insert(
            "secret-file-path".to_string(),
            OptionValue::from("/nonexistent/secret"),
        );

    let router = router_for(&config).await;

    // The route was skipped, so its path does not exist.
    let body = br#"{"zen":"ok"}"#;
    let response = router
        .oneshot(webhook_request(&github_signature(body), "push", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_attestation_dir_fails_startup_probe() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.attestation_dir = Some(Path::new("/nonexistent/attestations").to_path_buf());

    let (handlers, signers) = registries();
    let err = build_router(&config, &handlers, &signers).await.unwrap_err();

    assert!(matches!(err, GatewayError::UnwritableDirectory { .. }));
}
