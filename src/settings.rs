use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

pub const DEFAULT_FROM_EMAIL: &str = "BY THE WAVE <web@rezervacie.btw.sk>";
pub const DEFAULT_TO_EMAIL: &str = "marketing@btw.sk";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub trust_proxy_headers: bool,

    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    #[serde(default = "default_from_email")]
    pub contact_from_email: String,

    #[serde(default = "default_to_email")]
    pub contact_to_email: String,

    #[serde(default = "default_graphql_endpoint")]
    pub graphql_endpoint: String,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_rate_limit_sweep")]
    pub rate_limit_sweep_secs: u64,

    #[serde(default = "default_spam_max_links")]
    pub spam_max_links: usize,

    #[serde(default = "default_spam_max_message_chars")]
    pub spam_max_message_chars: usize,

    #[serde(default = "default_spam_max_subject_chars")]
    pub spam_max_subject_chars: usize,

    #[serde(default = "default_spam_min_fill_ms")]
    pub spam_min_fill_ms: i64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "BTW-Web-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_max_payload_bytes() -> usize {
    64 * 1024
}
fn default_resend_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}
fn default_provider_timeout() -> u64 {
    15
}
fn default_from_email() -> String {
    DEFAULT_FROM_EMAIL.to_string()
}
fn default_to_email() -> String {
    DEFAULT_TO_EMAIL.to_string()
}
fn default_graphql_endpoint() -> String {
    "https://wp.btw.sk/graphql".to_string()
}
fn default_rate_limit_max() -> u32 {
    8
}
fn default_rate_limit_window() -> u64 {
    10 * 60
}
fn default_rate_limit_sweep() -> u64 {
    5 * 60
}
fn default_spam_max_links() -> usize {
    2
}
fn default_spam_max_message_chars() -> usize {
    4000
}
fn default_spam_max_subject_chars() -> usize {
    200
}
fn default_spam_min_fill_ms() -> i64 {
    1500
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name.to_string().to_lowercase())).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // The mail provider keys keep their conventional unprefixed names
        if config.resend_api_key.is_none() {
            config.resend_api_key = non_empty_env("RESEND_API_KEY");
        }
        if let Some(from) = non_empty_env("CONTACT_FROM_EMAIL") {
            config.contact_from_email = from;
        }
        if let Some(to) = non_empty_env("CONTACT_TO_EMAIL") {
            config.contact_to_email = to;
        }

        if config.redis_url.is_none() {
            config.redis_url = non_empty_env("APP_REDIS_URL");
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration used by the test suites: no files, no environment.
    pub fn for_testing() -> Self {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "BTW-Web-API-Test".to_string(),
            port: 0,
            host: default_host(),
            worker_count: 1,
            redis_url: None,
            cors_allowed_origins: default_cors_origins(),
            trust_proxy_headers: true,
            max_payload_bytes: default_max_payload_bytes(),
            resend_api_key: None,
            resend_api_url: default_resend_api_url(),
            provider_timeout_secs: 5,
            contact_from_email: default_from_email(),
            contact_to_email: default_to_email(),
            graphql_endpoint: default_graphql_endpoint(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
            rate_limit_sweep_secs: 0,
            spam_max_links: default_spam_max_links(),
            spam_max_message_chars: default_spam_max_message_chars(),
            spam_max_subject_chars: default_spam_max_subject_chars(),
            spam_min_fill_ms: default_spam_min_fill_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.port == 0 && self.env != AppEnvironment::Testing {
            errors.push("PORT cannot be 0".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }
        if self.rate_limit_max == 0 {
            errors.push("RATE_LIMIT_MAX must be greater than 0".to_string());
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be greater than 0".to_string());
        }
        if self.max_payload_bytes == 0 {
            errors.push("MAX_PAYLOAD_BYTES must be greater than 0".to_string());
        }
        for (key, value) in [
            ("RESEND_API_URL", &self.resend_api_url),
            ("GRAPHQL_ENDPOINT", &self.graphql_endpoint),
        ] {
            if let Err(e) = Url::parse(value) {
                errors.push(format!("{key} is not a valid URL: {e}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[MISSING]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("redis_url", &self.redis_url.redact())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("contact_from_email", &self.contact_from_email)
            .field("contact_to_email", &self.contact_to_email)
            .field("graphql_endpoint", &self.graphql_endpoint)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_sweep_secs", &self.rate_limit_sweep_secs)
            .field("spam_max_links", &self.spam_max_links)
            .field("spam_max_message_chars", &self.spam_max_message_chars)
            .field("spam_max_subject_chars", &self.spam_max_subject_chars)
            .field("spam_min_fill_ms", &self.spam_min_fill_ms)
            .finish()
    }
}
