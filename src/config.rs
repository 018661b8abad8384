use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;

/// Fitness Session - command-line client for the fitness tracker backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(short = 'u', long, env = "FITNESS_API_URL", default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Path to the SQLite token store
    #[arg(short = 's', long, env = "TOKEN_STORE_FILE")]
    pub store_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// HTTP request timeout in seconds (also bounds the refresh exchange)
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(short = 'e', long)]
        username: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and store the session
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short = 'e', long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Decide which screen the app should open on
    Bootstrap,
    /// Show the current user's profile
    Me,
    /// Search the food catalogue
    Search { query: String },
    /// Show the calorie summary for a day (defaults to today)
    Overview {
        #[arg(short, long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Print the generated report for a day (defaults to today)
    Report {
        #[arg(short, long)]
        date: Option<chrono::NaiveDate>,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    // Backend
    pub base_url: String,
    pub login_path: String,
    pub register_path: String,
    pub refresh_path: String,

    // Session persistence
    pub token_store_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Build configuration with priority: CLI > ENV > defaults
    ///
    /// `.env` must already be loaded for its values to be visible to clap.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let token_store_file = args
            .store_file
            .as_deref()
            .map(expand_tilde)
            .or_else(default_store_file)
            .context("TOKEN_STORE_FILE is required when no data directory is available (use -s)")?;

        Ok(Config {
            base_url: args.base_url.clone(),

            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/users/login".to_string()),
            register_path: std::env::var("REGISTER_PATH").unwrap_or_else(|_| "/users/".to_string()),
            refresh_path: std::env::var("REFRESH_PATH")
                .unwrap_or_else(|_| "/users/refresh-token".to_string()),

            token_store_file,

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            http_request_timeout: args.http_timeout,

            log_level: args.log_level.clone(),
            log_json: args.log_json,
        })
    }

    /// Defaults pointing at `base_url`, for embedding and tests
    pub fn for_base_url(base_url: &str) -> Self {
        Config {
            base_url: base_url.to_string(),
            login_path: "/users/login".to_string(),
            register_path: "/users/".to_string(),
            refresh_path: "/users/refresh-token".to_string(),
            token_store_file: PathBuf::from("session.db"),
            http_connect_timeout: 10,
            http_request_timeout: 30,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("FITNESS_API_URL is not a valid URL: {}", self.base_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("FITNESS_API_URL cannot be used as a base URL: {}", self.base_url);
        }

        for (name, path) in [
            ("LOGIN_PATH", &self.login_path),
            ("REGISTER_PATH", &self.register_path),
            ("REFRESH_PATH", &self.refresh_path),
        ] {
            if !path.starts_with('/') {
                anyhow::bail!("{} must start with '/': {}", name, path);
            }
        }

        if self.http_connect_timeout == 0 || self.http_request_timeout == 0 {
            anyhow::bail!("HTTP timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Absolute URL for an endpoint path, keeping any path prefix of the base URL
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        join_url(&self.base_url, path)
    }
}

/// Append `path` to `base` without dropping the base's own path segments
pub(crate) fn join_url(base: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).with_context(|| format!("Invalid endpoint URL: {}", joined))
}

/// Default token store under the user's data directory
fn default_store_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("fitness-session").join("session.db"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/session.db");
        assert!(path.to_string_lossy().contains("test/session.db"));
        assert!(!path.to_string_lossy().starts_with("~"));

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_tilde_just_tilde() {
        // Just "~" without slash should not expand
        let path = expand_tilde("~");
        assert_eq!(path, PathBuf::from("~"));
    }

    #[test]
    fn test_for_base_url_is_valid() {
        let config = Config::for_base_url("http://localhost:8000");
        assert!(config.validate().is_ok());
        assert_eq!(config.login_path, "/users/login");
        assert_eq!(config.refresh_path, "/users/refresh-token");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config::for_base_url("not a url");
        assert!(config.validate().is_err());

        let config = Config::for_base_url("mailto:someone@example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let mut config = Config::for_base_url("http://localhost:8000");
        config.refresh_path = "users/refresh-token".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("REFRESH_PATH"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::for_base_url("http://localhost:8000");
        config.http_request_timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_url_keeps_base_prefix() {
        let config = Config::for_base_url("http://localhost:8000/api/");
        assert_eq!(
            config.endpoint_url("/users/login").unwrap().as_str(),
            "http://localhost:8000/api/users/login"
        );

        let config = Config::for_base_url("http://localhost:8000");
        assert_eq!(
            config.endpoint_url("/users/").unwrap().as_str(),
            "http://localhost:8000/users/"
        );
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::try_parse_from([
            "fitness-session",
            "--base-url",
            "http://10.0.0.2:8000",
            "--store-file",
            "/tmp/session.db",
            "login",
            "-e",
            "ana@example.com",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Login {
                username: "ana@example.com".to_string(),
                password: None,
            }
        );

        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.token_store_file, PathBuf::from("/tmp/session.db"));
    }

    #[test]
    fn test_cli_overview_date() {
        let args = CliArgs::try_parse_from([
            "fitness-session",
            "overview",
            "--date",
            "2024-05-01",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Overview {
                date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
            }
        );
    }
}
