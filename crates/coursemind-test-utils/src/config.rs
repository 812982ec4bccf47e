//! Configuration builders for tests.

use coursemind_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// Starts from the defaults with a placeholder API key, so building a
/// provider from it never reads the environment.
///
/// ```ignore
/// let config = TestConfigBuilder::new().model("claude-test").max_results(3).build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.llm.api_key = "test-key".to_string();
        Self { config }
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.config.llm.api_key = key.to_string();
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.llm.model = model.to_string();
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.llm.base_url = url.to_string();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.llm.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.llm.temperature = t;
        self
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.config.search.max_results = n;
        self
    }

    pub fn max_history(mut self, n: usize) -> Self {
        self.config.session.max_history = n;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
