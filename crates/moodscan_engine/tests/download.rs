use std::fs;

use moodscan_engine::{ArtifactDownloader, DownloadError, DownloadSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn saves_artifact_under_suggested_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/result.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("t,emotion\n0,joy\n", "text/csv"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ArtifactDownloader::new(DownloadSettings::default()).unwrap();
    let link = format!("{}/files/result.csv", server.uri());

    let saved = downloader
        .download(&link, Some("emotions.csv"), temp.path())
        .await
        .expect("download ok");
    assert_eq!(saved, temp.path().join("emotions.csv"));
    assert_eq!(fs::read_to_string(saved).unwrap(), "t,emotion\n0,joy\n");

    let saved = downloader
        .download(&link, None, temp.path())
        .await
        .expect("download ok");
    assert_eq!(saved.file_name().unwrap(), "result.csv");
}

#[tokio::test]
async fn http_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ArtifactDownloader::new(DownloadSettings::default()).unwrap();
    let err = downloader
        .download(&format!("{}/gone.csv", server.uri()), None, temp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::HttpStatus(404)));
    assert!(!temp.path().join("gone.csv").exists());
}

#[tokio::test]
async fn oversized_artifact_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789A"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ArtifactDownloader::new(DownloadSettings {
        max_bytes: 10,
        ..DownloadSettings::default()
    })
    .unwrap();
    let err = downloader
        .download(&format!("{}/big.csv", server.uri()), None, temp.path())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DownloadError::TooLarge {
            max_bytes: 10,
            actual: 11
        }
    ));
}

#[tokio::test]
async fn non_http_links_are_rejected() {
    let temp = TempDir::new().unwrap();
    let downloader = ArtifactDownloader::new(DownloadSettings::default()).unwrap();
    let err = downloader
        .download("file:///etc/passwd", None, temp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::InvalidLink(_)));
}
