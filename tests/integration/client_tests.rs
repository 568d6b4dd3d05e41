//! Retrying HTTP client tests against wiremock servers

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use pixelpuritan::client::{DetectTransport, RetryPolicy, RetryingHttpClient, SendError};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(timeout: Duration, max_attempts: u32) -> RetryingHttpClient {
        RetryingHttpClient::new(timeout, RetryPolicy::new(max_attempts, 0.01)).unwrap()
    }

    fn detection_body() -> serde_json::Value {
        serde_json::json!({
            "file_name": "cat.png",
            "is_nsfw": false,
            "confidence_percentage": 97.5
        })
    }

    fn image() -> Bytes {
        Bytes::from_static(b"fake image bytes")
    }

    // ==================== Success ====================

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/detect"))
            .and(body_string_contains("filename=\"cat.png\""))
            .and(body_string_contains("name=\"file\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(detection_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(Duration::from_secs(5), 3)
            .send(&format!("{}/v1/detect", server.uri()), image(), "cat.png")
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("97.5"));
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detection_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(Duration::from_secs(5), 1)
            .with_api_key("s3cret")
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
    }

    // ==================== Permanent Failures ====================

    #[tokio::test]
    async fn test_not_found_is_attempted_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(Duration::from_secs(5), 3)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(Duration::from_secs(5), 3)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    // ==================== Transient Failures ====================

    #[tokio::test]
    async fn test_service_unavailable_exhausts_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(Duration::from_secs(5), 3)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Status { status: 503, .. }));
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_recovers_after_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detection_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(Duration::from_secs(5), 3)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
    }

    #[tokio::test]
    async fn test_rate_limited_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detection_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(Duration::from_secs(5), 3)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(detection_body())
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let err = client(Duration::from_millis(100), 2)
            .send(&server.uri(), image(), "cat.png")
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Network(_)));
        assert!(err.to_string().starts_with("network/timeout:"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(Duration::from_secs(2), 2)
            .send(&format!("http://{}/v1/detect", addr), image(), "cat.png")
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, SendError::Network(_)));
    }

    // ==================== Probe ====================

    #[tokio::test]
    async fn test_probe_accepts_any_http_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(Duration::from_secs(2), 1).probe(&server.uri()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_fails_when_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(Duration::from_secs(2), 1)
            .probe(&format!("http://{}/v1/detect", addr))
            .await;
        assert!(matches!(result, Err(SendError::Network(_))));
    }
}
