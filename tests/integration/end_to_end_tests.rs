//! Client and server over a real socket

#[cfg(test)]
mod tests {
    use crate::common::{ImageTree, TestServer};
    use pixelpuritan::client::{
        BatchSummary, BoundedScanner, DetectTransport, Outcome, Placement, RetryPolicy,
        RetryingHttpClient, discover, organize, write_error_report,
    };
    use pixelpuritan::config::{Config, LimiterConfig};
    use std::sync::Arc;
    use std::time::Duration;

    fn server_config(rate: f64, burst: u32) -> Config {
        Config {
            limiter: LimiterConfig::new(rate, burst),
            ..Config::default()
        }
    }

    fn client(max_attempts: u32) -> RetryingHttpClient {
        RetryingHttpClient::new(Duration::from_secs(10), RetryPolicy::new(max_attempts, 0.01))
            .unwrap()
    }

    #[actix_web::test]
    async fn test_scan_tree_end_to_end() {
        let server = TestServer::start(server_config(1000.0, 1000));

        let tree = ImageTree::new();
        tree.add_unsafe("hot_1.png");
        tree.add_unsafe("nested/hot_2.png");
        tree.add_safe("calm_1.png");
        tree.add_safe("nested/calm_2.png");
        tree.add_corrupt("broken.png");

        let scanner = BoundedScanner::new(Arc::new(client(3)), server.url.clone(), 2);
        let results = scanner.scan(discover(tree.path()).unwrap()).await;

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.nsfw_count, 2);
        assert_eq!(summary.safe_count, 2);
        assert_eq!(summary.error_count, 1);

        let broken = results
            .iter()
            .find(|r| r.outcome() == Outcome::Error)
            .unwrap();
        assert_eq!(broken.error.as_deref(), Some("HTTP 500"));

        let confident = results
            .iter()
            .filter(|r| r.outcome() != Outcome::Error)
            .all(|r| r.confidence == Some(100.0));
        assert!(confident);

        // The corrupt file was retried; the classifier only saw valid images
        assert_eq!(server.classifier.calls(), 4);
        assert_eq!(server.state.metrics.status_count(200), 4);
        assert_eq!(server.state.metrics.status_count(500), 3);

        let report = write_error_report(tree.path(), &results).unwrap().unwrap();
        let text = std::fs::read_to_string(report).unwrap();
        assert_eq!(text.lines().count(), 2);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_move_sorts_files() {
        let server = TestServer::start(server_config(1000.0, 1000));

        let tree = ImageTree::new();
        let hot = tree.add_unsafe("hot.png");
        let calm = tree.add_safe("calm.png");
        let broken = tree.add_corrupt("broken.png");

        let scanner = BoundedScanner::new(Arc::new(client(1)), server.url.clone(), 4);
        let results = scanner.scan(discover(tree.path()).unwrap()).await;
        let placements = organize(tree.path(), &results);

        assert_eq!(
            placements[&hot],
            Placement::Moved(tree.path().join("nsfw/hot.png"))
        );
        assert_eq!(
            placements[&calm],
            Placement::Moved(tree.path().join("safe/calm.png"))
        );
        assert!(!placements.contains_key(&broken));
        assert!(broken.exists());

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_rate_limited_files_become_errors() {
        let server = TestServer::start(server_config(0.001, 1));

        let tree = ImageTree::new();
        tree.add_safe("first.png");
        tree.add_safe("second.png");

        let scanner = BoundedScanner::new(Arc::new(client(3)), server.url.clone(), 1);
        let results = scanner.scan(discover(tree.path()).unwrap()).await;

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.safe_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(server.state.metrics.status_count(429), 3);
        assert_eq!(server.classifier.calls(), 1);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_api_key_round_trip() {
        let mut config = server_config(1000.0, 1000);
        config.limiter = config.limiter.with_api_key("k-123");
        let server = TestServer::start(config);
        let image = bytes::Bytes::from(crate::common::red_png(200));

        let denied = client(3)
            .send(&server.url, image.clone(), "a.png")
            .await
            .unwrap_err();
        assert_eq!(denied.status(), Some(401));
        assert_eq!(server.state.metrics.status_count(401), 1);

        let reply = client(3)
            .with_api_key("k-123")
            .send(&server.url, image, "a.png")
            .await
            .unwrap();
        assert_eq!(reply.status, 200);

        let detection: pixelpuritan::Detection = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(detection.file_name, "a.png");
        assert!(detection.is_nsfw);
        assert_eq!(detection.confidence_percentage, 78.43);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_probe_against_live_server() {
        let server = TestServer::start(server_config(10.0, 10));
        assert!(client(1).probe(&server.url).await.is_ok());
        server.stop().await;
    }
}
