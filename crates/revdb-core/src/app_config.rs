use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which external sentiment classifier the `label` command talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Five-way multilingual text classifier returning class probabilities.
    Multilingual,
    /// Classical model served over HTTP, fed text plus numeric features.
    Features,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::Multilingual => write!(f, "multilingual"),
            ClassifierKind::Features => write!(f, "features"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub webdriver_url: String,
    pub maps_base_url: String,
    pub driver_timeout_secs: u64,
    pub driver_max_retries: u32,
    pub driver_retry_backoff_base_secs: u64,
    pub scroll_pause_ms: u64,
    pub scroll_idle_limit: u32,
    pub inter_business_delay_ms: u64,
    pub headless: bool,
    pub classifier_url: Option<String>,
    pub classifier_kind: ClassifierKind,
}

impl AppConfig {
    /// ANSI colors in log output. Off in production, where logs go to files
    /// or a collector.
    #[must_use]
    pub fn ansi_logs(&self) -> bool {
        self.env != Environment::Production
    }

    /// Ingestion settings derived from this config, before CLI overrides.
    #[must_use]
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            headless: self.headless,
            scroll_idle_limit: self.scroll_idle_limit,
            inter_business_delay: Duration::from_millis(self.inter_business_delay_ms),
            batch_limit: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("webdriver_url", &self.webdriver_url)
            .field("maps_base_url", &self.maps_base_url)
            .field("driver_timeout_secs", &self.driver_timeout_secs)
            .field("driver_max_retries", &self.driver_max_retries)
            .field(
                "driver_retry_backoff_base_secs",
                &self.driver_retry_backoff_base_secs,
            )
            .field("scroll_pause_ms", &self.scroll_pause_ms)
            .field("scroll_idle_limit", &self.scroll_idle_limit)
            .field("inter_business_delay_ms", &self.inter_business_delay_ms)
            .field("headless", &self.headless)
            .field("classifier_url", &self.classifier_url)
            .field("classifier_kind", &self.classifier_kind)
            .finish()
    }
}

/// Settings passed explicitly to the discovery and collection entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Consecutive scroll attempts without new content before a list is
    /// considered fully loaded.
    pub scroll_idle_limit: u32,
    /// Pause between two businesses during collection.
    pub inter_business_delay: Duration,
    /// Maximum number of queue entries drained per collection run.
    pub batch_limit: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            headless: false,
            scroll_idle_limit: 5,
            inter_business_delay: Duration::from_secs(3),
            batch_limit: None,
        }
    }
}

impl IngestConfig {
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = self.headless || headless;
        self
    }

    #[must_use]
    pub fn with_batch_limit(mut self, limit: Option<usize>) -> Self {
        self.batch_limit = limit;
        self
    }
}
