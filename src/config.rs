//! Configuration Module
//!
//! Server configuration from command-line flags, each falling back to an
//! environment variable and then to a default.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cache::CachePolicy;
use crate::error::BadgeError;

const DEFAULT_PORT: u16 = 34000;
const DEFAULT_CACHE_VALIDITY_SECS: u64 = 600;
const DEFAULT_MAX_CACHED_RESULTS: i64 = 100;
const DEFAULT_UPSTREAM_API_URL: &str = "https://api.bitbucket.org/2.0";
const DEFAULT_BADGE_SERVICE_URL: &str = "https://img.shields.io";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Server configuration parameters.
///
/// Every value can be given as a flag or through the environment variable
/// named next to it.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bitbadger",
    version,
    about = "A badge generator for Bitbucket pull requests"
)]
pub struct Config {
    /// Bitbucket account used to query the upstream API
    #[arg(env = "BITBUCKET_USERNAME", default_value = "")]
    pub username: String,

    /// Password or app password for the account
    #[arg(
        env = "BITBUCKET_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Port the server listens on
    #[arg(short = 'p', long = "port", env = "SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub server_port: u16,

    /// How long a rendered badge stays valid (0 disables caching)
    #[arg(
        long,
        env = "CACHE_VALIDITY_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_CACHE_VALIDITY_SECS
    )]
    pub cache_validity: u64,

    /// Maximum number of cached badges (<= 0 keeps nothing)
    #[arg(
        long,
        env = "MAX_CACHED_RESULTS",
        default_value_t = DEFAULT_MAX_CACHED_RESULTS,
        allow_negative_numbers = true
    )]
    pub max_cached_results: i64,

    /// Base URL of the pull-request API
    #[arg(long = "upstream-url", env = "UPSTREAM_API_URL", default_value = DEFAULT_UPSTREAM_API_URL)]
    pub upstream_api_url: String,

    /// Base URL of the badge rendering service
    #[arg(long, env = "BADGE_SERVICE_URL", default_value = DEFAULT_BADGE_SERVICE_URL)]
    pub badge_service_url: String,

    /// Timeout for outgoing HTTP requests
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    pub http_timeout: u64,

    /// Enable debug logging
    #[arg(short, long, env = "DEBUG")]
    pub debug: bool,

    /// Serve plain HTTP even when a certificate is configured
    #[arg(short, long, env = "INSECURE")]
    pub insecure: bool,

    /// Path to the PEM TLS certificate
    #[arg(short, long, env = "TLS_CERT", value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// Path to the PEM TLS private key
    #[arg(short, long, env = "TLS_KEY", value_name = "PATH")]
    pub key: Option<PathBuf>,
}

/// How the server accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenMode {
    Http,
    Https { cert: PathBuf, key: PathBuf },
}

impl Config {
    /// Loads the configuration from environment variables alone.
    ///
    /// # Environment Variables
    /// - `BITBUCKET_USERNAME` / `BITBUCKET_PASSWORD` - Upstream credentials (default: empty)
    /// - `SERVER_PORT` - HTTP server port (default: 34000)
    /// - `CACHE_VALIDITY_SECS` - Badge validity in seconds (default: 600)
    /// - `MAX_CACHED_RESULTS` - Maximum cached badges (default: 100)
    /// - `UPSTREAM_API_URL` - Pull-request API (default: https://api.bitbucket.org/2.0)
    /// - `BADGE_SERVICE_URL` - Badge renderer (default: https://img.shields.io)
    /// - `HTTP_TIMEOUT_SECS` - Outgoing request timeout (default: 10)
    /// - `DEBUG` - Enable debug logging (default: false)
    /// - `INSECURE`, `TLS_CERT`, `TLS_KEY` - Listener mode, see [`Config::listen_mode`]
    ///
    /// A variable that is set but does not parse is an error rather than
    /// falling back to its default.
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from([env!("CARGO_PKG_NAME")])
    }

    /// Cache policy described by this configuration.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(
            Duration::from_secs(self.cache_validity),
            self.max_cached_results,
        )
    }

    /// Timeout applied to upstream and renderer requests.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    /// HTTPS when both a certificate and a key are given, unless `insecure`
    /// is set. Giving only one of the two is an error.
    pub fn listen_mode(&self) -> Result<ListenMode, BadgeError> {
        if self.insecure {
            return Ok(ListenMode::Http);
        }

        match (&self.cert, &self.key) {
            (Some(cert), Some(key)) => Ok(ListenMode::Https {
                cert: cert.clone(),
                key: key.clone(),
            }),
            (None, None) => Ok(ListenMode::Http),
            (Some(_), None) => Err(BadgeError::Config(
                "a TLS certificate was provided without a private key".to_string(),
            )),
            (None, Some(_)) => Err(BadgeError::Config(
                "a TLS private key was provided without a certificate".to_string(),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            server_port: DEFAULT_PORT,
            cache_validity: DEFAULT_CACHE_VALIDITY_SECS,
            max_cached_results: DEFAULT_MAX_CACHED_RESULTS,
            upstream_api_url: DEFAULT_UPSTREAM_API_URL.to_string(),
            badge_service_url: DEFAULT_BADGE_SERVICE_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
            debug: false,
            insecure: false,
            cert: None,
            key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    // Parsing reads the process environment, so these tests run one at a time
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    const VARS: [&str; 12] = [
        "BITBUCKET_USERNAME",
        "BITBUCKET_PASSWORD",
        "SERVER_PORT",
        "CACHE_VALIDITY_SECS",
        "MAX_CACHED_RESULTS",
        "UPSTREAM_API_URL",
        "BADGE_SERVICE_URL",
        "HTTP_TIMEOUT_SECS",
        "DEBUG",
        "INSECURE",
        "TLS_CERT",
        "TLS_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn parse(args: &[&str]) -> Config {
        let _guard = env_lock();
        clear_env();
        Config::try_parse_from(std::iter::once("bitbadger").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 34000);
        assert_eq!(config.cache_validity, 600);
        assert_eq!(config.max_cached_results, 100);
        assert_eq!(config.http_timeout, 10);
        assert!(!config.debug);
        assert!(config.username.is_empty());
        assert_eq!(config.listen_mode().unwrap(), ListenMode::Http);
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _guard = env_lock();
        clear_env();

        let config = Config::from_env().unwrap();
        let defaults = Config::default();
        assert_eq!(config.server_port, defaults.server_port);
        assert_eq!(config.cache_validity, defaults.cache_validity);
        assert_eq!(config.max_cached_results, defaults.max_cached_results);
        assert_eq!(config.upstream_api_url, defaults.upstream_api_url);
        assert_eq!(config.badge_service_url, defaults.badge_service_url);
        assert_eq!(config.http_timeout, defaults.http_timeout);
        assert!(!config.debug);
        assert!(config.cert.is_none());
    }

    #[test]
    fn test_config_from_env_values() {
        let _guard = env_lock();
        clear_env();
        env::set_var("BITBUCKET_USERNAME", "bot");
        env::set_var("SERVER_PORT", "8443");
        env::set_var("MAX_CACHED_RESULTS", "-1");
        env::set_var("DEBUG", "1");

        let config = Config::from_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.username, "bot");
        assert_eq!(config.server_port, 8443);
        assert_eq!(config.max_cached_results, -1);
        assert!(config.debug);
    }

    #[test]
    fn test_config_from_env_rejects_bad_values() {
        let _guard = env_lock();
        clear_env();
        env::set_var("CACHE_VALIDITY_SECS", "abc");

        let result = Config::from_env();
        clear_env();

        let message = result.unwrap_err().to_string();
        assert!(message.contains("abc"), "{}", message);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "alice",
            "s3cret",
            "-p",
            "8080",
            "--cache-validity",
            "0",
            "--max-cached-results",
            "-5",
            "--upstream-url",
            "http://localhost:9000",
            "-d",
        ]);

        assert_eq!(config.username, "alice");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.max_cached_results, -5);
        assert_eq!(config.upstream_api_url, "http://localhost:9000");
        assert!(config.debug);
        assert!(config.cache_policy().is_disabled());
    }

    #[test]
    fn test_flags_reject_bad_values() {
        let _guard = env_lock();
        let result = Config::try_parse_from(["bitbadger", "--port", "not-a-port"]);
        assert!(result.is_err());
        let result = Config::try_parse_from(["bitbadger", "--cache-validity", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_listen_mode_https() {
        let config = parse(&["-c", "/etc/tls/cert.pem", "-k", "/etc/tls/key.pem"]);

        assert_eq!(
            config.listen_mode().unwrap(),
            ListenMode::Https {
                cert: PathBuf::from("/etc/tls/cert.pem"),
                key: PathBuf::from("/etc/tls/key.pem"),
            }
        );
    }

    #[test]
    fn test_listen_mode_insecure_overrides_tls() {
        let config = parse(&["--insecure", "--cert", "cert.pem", "--key", "key.pem"]);
        assert_eq!(config.listen_mode().unwrap(), ListenMode::Http);
    }

    #[test]
    fn test_listen_mode_requires_both_files() {
        let config = parse(&["--cert", "cert.pem"]);
        assert!(matches!(config.listen_mode(), Err(BadgeError::Config(_))));

        let config = parse(&["--key", "key.pem"]);
        assert!(matches!(config.listen_mode(), Err(BadgeError::Config(_))));
    }

    #[test]
    fn test_cache_policy_from_config() {
        let config = Config {
            cache_validity: 0,
            max_cached_results: -1,
            ..Config::default()
        };

        let policy = config.cache_policy();
        assert!(policy.is_disabled());
        assert_eq!(policy.max_entries, -1);
    }
}
