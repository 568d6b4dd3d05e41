//! In-process detect server

use actix_web::web;
use async_trait::async_trait;
use image::RgbImage;
use pixelpuritan::Result;
use pixelpuritan::config::{Config, ConfigProvider};
use pixelpuritan::core::classifier::{Classifier, Prediction};
use pixelpuritan::server::{AppState, HttpServer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scores an image by the red channel of its top-left pixel
#[derive(Default)]
pub struct PixelClassifier {
    calls: AtomicUsize,
}

impl PixelClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for PixelClassifier {
    async fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let score = f64::from(image.get_pixel(0, 0)[0]) / 255.0;
        Ok(vec![
            Prediction::new("nsfw", score),
            Prediction::new("normal", 1.0 - score),
        ])
    }

    fn name(&self) -> &str {
        "pixel"
    }
}

/// A detect server listening on 127.0.0.1 with an ephemeral port
pub struct TestServer {
    pub url: String,
    pub state: AppState,
    pub classifier: Arc<PixelClassifier>,
    handle: actix_web::dev::ServerHandle,
}

impl TestServer {
    /// Start a server; must be called from within an actix runtime
    pub fn start(config: Config) -> Self {
        let classifier = Arc::new(PixelClassifier::default());
        let provider = Arc::new(ConfigProvider::fixed(config));
        let state = AppState::new(provider, classifier.clone()).unwrap();

        let data = web::Data::new(state.clone());
        let server = actix_web::HttpServer::new(move || HttpServer::create_app(data.clone()))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            url: format!("http://{}/v1/detect", addr),
            state,
            classifier,
            handle,
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
