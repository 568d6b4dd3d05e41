//! Bounded scanner tests

#[cfg(test)]
mod tests {
    use crate::common::ImageTree;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pixelpuritan::client::{
        BatchSummary, BoundedScanner, DetectTransport, HttpReply, RetryPolicy, RetryingHttpClient,
        ScanProgress, SendError, discover,
    };
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records how many sends overlap
    #[derive(Default)]
    struct TrackingTransport {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl DetectTransport for TrackingTransport {
        async fn send(
            &self,
            _endpoint: &str,
            _file_bytes: Bytes,
            file_name: &str,
        ) -> Result<HttpReply, SendError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.sends.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(25)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(HttpReply {
                status: 200,
                body: format!(
                    r#"{{"file_name":"{}","is_nsfw":false,"confidence_percentage":75.0}}"#,
                    file_name
                ),
            })
        }
    }

    fn five_files(tree: &ImageTree) -> Vec<PathBuf> {
        (0..5)
            .map(|i| tree.add(&format!("img_{}.png", i), b"pixels"))
            .collect()
    }

    // ==================== Concurrency ====================

    #[tokio::test]
    async fn test_never_exceeds_concurrency_cap() {
        let tree = ImageTree::new();
        let files = five_files(&tree);
        let transport = Arc::new(TrackingTransport::default());

        let scanner = BoundedScanner::new(Arc::clone(&transport), "http://unused", 2);
        let results = scanner.scan(files.clone()).await;

        assert!(transport.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(transport.peak.load(Ordering::SeqCst), 2);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 5);

        assert_eq!(results.len(), 5);
        let seen: HashSet<_> = results.iter().map(|r| r.source_path.clone()).collect();
        let expected: HashSet<_> = files.into_iter().collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_single_slot_serializes_sends() {
        let tree = ImageTree::new();
        let files = five_files(&tree);
        let transport = Arc::new(TrackingTransport::default());

        let scanner = BoundedScanner::new(Arc::clone(&transport), "http://unused", 1);
        let results = scanner.scan(files).await;

        assert_eq!(transport.peak.load(Ordering::SeqCst), 1);
        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_progress_counts_every_file_once() {
        let tree = ImageTree::new();
        let mut files = five_files(&tree);
        files.push(tree.path().join("vanished.png"));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = ScanProgress::with_callback(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let scanner = BoundedScanner::new(Arc::new(TrackingTransport::default()), "http://unused", 3)
            .with_progress(progress);
        let results = scanner.scan(files).await;

        assert_eq!(results.len(), 6);
        assert_eq!(scanner.progress().completed(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(BatchSummary::from_results(&results).error_count, 1);
    }

    // ==================== Over HTTP ====================

    #[tokio::test]
    async fn test_scan_directory_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("filename=\"bad.png\""))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("filename=\"flaky.png\""))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("filename=\"nsfw.png\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file_name": "nsfw.png", "is_nsfw": true, "confidence_percentage": 99.1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file_name": "x", "is_nsfw": false, "confidence_percentage": 88.0
            })))
            .mount(&server)
            .await;

        let tree = ImageTree::new();
        for name in ["bad.png", "flaky.png", "nsfw.png", "a/safe.jpg", "notes.txt"] {
            tree.add(name, b"pixels");
        }

        let client = RetryingHttpClient::new(Duration::from_secs(5), RetryPolicy::new(3, 0.01))
            .unwrap();
        let scanner = BoundedScanner::new(Arc::new(client), server.uri(), 4);
        let mut results = scanner.scan(discover(tree.path()).unwrap()).await;
        results.sort_by(|a, b| a.source_path.cmp(&b.source_path));

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.nsfw_count, 1);
        assert_eq!(summary.safe_count, 1);
        assert_eq!(summary.error_count, 2);

        let errors: Vec<_> = results.iter().filter_map(|r| r.error.as_deref()).collect();
        assert_eq!(errors, vec!["HTTP 404", "HTTP 502"]);
    }
}
