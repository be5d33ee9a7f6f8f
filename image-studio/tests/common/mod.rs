use image_studio::config::StudioConfig;
use image_studio::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the app on a random port, pointed at `upstream_base` (usually
    /// a wiremock fake of the Gemini API) with the given process-wide
    /// default credential (empty = unconfigured).
    pub async fn spawn(upstream_base: &str, default_api_key: &str) -> Self {
        let mut config = StudioConfig::load().expect("Failed to load configuration");
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0; // Random port for testing
        config.google.api_key = default_api_key.to_string();
        config.gemini.api_base = upstream_base.to_string();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }

    pub async fn post_generate(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/generate", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
