use serde::Deserialize;

/// Institutional sites crawled when the configuration names no seeds
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://anmcs.gov.ro/web/",
    "https://ina.gov.ro/",
    "https://mfe.gov.ro/",
    "https://portal.rna.ro",
];

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Absolute site URLs each crawl run starts from, in order
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub visited: VisitedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            visited: VisitedConfig::default(),
        }
    }
}

fn default_seeds() -> Vec<String> {
    DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of visit tasks running at the same time
    #[serde(rename = "max-concurrent-visits")]
    pub max_concurrent_visits: u32,

    /// Maximum number of navigation hops away from a seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of visit tasks the work queue accepts per run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Total time allowed for one fetch (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// How long a claimed URL stays in the visited set (hours)
    #[serde(rename = "visited-retention-hours")]
    pub visited_retention_hours: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_visits: 4,
            max_depth: 8,
            max_pages: 2000,
            request_timeout_secs: 20,
            connect_timeout_secs: 10,
            visited_retention_hours: 24,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PaapCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloaded documents are written to
    #[serde(rename = "download-dir")]
    pub download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "./storage/public".to_string(),
        }
    }
}

/// Which visited-set backend a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisitedBackend {
    /// Process-local map, for single-process crawls
    #[default]
    Memory,
    /// SQLite table, shareable between processes
    Sqlite,
}

/// Visited-set configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VisitedConfig {
    pub backend: VisitedBackend,

    /// Path to the SQLite database file (sqlite backend only)
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
