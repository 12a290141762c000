// tests/client_retry_test.rs

use ilias_dl::client::RobustClient;
use ilias_dl::config::AppConfig;
use mockito::Server;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn test_client_retries_transient_server_errors() {
    let mut server = Server::new_async().await;
    let server_url = server.url();

    let mock_503 = server
        .mock("GET", "/page")
        .with_status(503)
        .with_body("Maintenance")
        .expect(1)
        .create_async()
        .await;
    let mock_200 = server
        .mock("GET", "/page")
        .with_status(200)
        .with_body("Success!")
        .expect(1)
        .create_async()
        .await;

    let config = Arc::new(AppConfig {
        max_retries: 2,
        ..Default::default()
    });
    let client = RobustClient::new(config).expect("Failed to create client");

    let body = client
        .get_page(format!("{}/page", server_url))
        .await
        .expect("Request should eventually succeed");

    assert_eq!(body, "Success!");
    mock_503.assert_async().await;
    mock_200.assert_async().await;
}

#[tokio::test]
async fn test_client_error_statuses_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock_404 = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let config = Arc::new(AppConfig {
        max_retries: 2,
        ..Default::default()
    });
    let client = RobustClient::new(config).unwrap();

    assert!(client.get(format!("{}/missing", server.url())).await.is_err());
    mock_404.assert_async().await;
}

#[tokio::test]
async fn test_content_length_comes_from_head_request() {
    let mut server = Server::new_async().await;
    server
        .mock("HEAD", "/video.mp4")
        .with_header("content-length", "1234")
        .create_async()
        .await;

    let client = RobustClient::new(Arc::new(AppConfig::default())).unwrap();
    let length = client
        .content_length(format!("{}/video.mp4", server.url()))
        .await
        .unwrap();
    assert_eq!(length, Some(1234));
}
