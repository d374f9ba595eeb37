//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::render::DEFAULT_PREVIEW_LENGTH;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "bridgeus";
pub const DEFAULT_API_BASE_URL: &str = "https://api.bridge-us.org/api";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
const DEFAULT_SESSION_FILE: &str = "bridgeus-session.json";

/// Command-line arguments for the BridgeUs binary.
#[derive(Debug, Parser)]
#[command(
    name = "bridgeus",
    version,
    about = "BridgeUs content renderer and API client"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "BRIDGEUS_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render content and print the display tree as JSON.
    Render(RenderArgs),
    /// Print a plain-text preview of content.
    Preview(PreviewArgs),
    /// Sign in and persist the session.
    Login(LoginArgs),
    /// Sign out and remove the persisted session.
    Logout,
    /// Print the signed-in identity.
    Whoami,
    /// Send an API request with the stored session.
    Request(RequestArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Override the session file location.
    #[arg(
        long = "session-file",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub session_file: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Content file; stdin when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    /// Content file; stdin when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Maximum preview length in characters.
    #[arg(long = "max-length", value_name = "CHARS", default_value_t = DEFAULT_PREVIEW_LENGTH)]
    pub max_length: usize,
}

#[derive(Debug, Args, Clone)]
pub struct LoginArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// File whose first line is the password.
    #[arg(long = "password-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub password_file: Option<PathBuf>,

    #[arg(long, env = "BRIDGEUS_PASSWORD", hide = true, hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RequestArgs {
    /// HTTP method, e.g. GET or POST.
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Path relative to the API base URL, e.g. /posts.
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Inline JSON request body.
    #[arg(long, value_name = "JSON", conflicts_with = "body_file")]
    pub body: Option<String>,

    /// File containing the JSON request body.
    #[arg(long = "body-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub body_file: Option<PathBuf>,

    /// Send without the bearer token and skip refresh handling.
    #[arg(long = "no-auth", action = clap::ArgAction::SetTrue)]
    pub no_auth: bool,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL without trailing slashes; request paths are appended verbatim.
    pub base_url: String,
    pub refresh_path: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: None,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("BRIDGEUS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    api: RawApiSettings,
    session: RawSessionSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(path) = overrides.session_file.as_ref() {
            self.session.path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            api,
            session,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let api = build_api_settings(api)?;
        let session = build_session_settings(session)?;

        Ok(Self {
            logging,
            api,
            session,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = api
        .base_url
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let parsed = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("api.base_url", format!("failed to parse: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "api.base_url",
            format!("unsupported scheme `{}`", parsed.scheme()),
        ));
    }

    let refresh_path = api
        .refresh_path
        .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string());
    if !refresh_path.starts_with('/') {
        return Err(LoadError::invalid(
            "api.refresh_path",
            "must start with `/`",
        ));
    }

    let timeout = match api.timeout_seconds {
        Some(0) => {
            return Err(LoadError::invalid(
                "api.timeout_seconds",
                "must be greater than zero",
            ));
        }
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };

    Ok(ApiSettings {
        base_url,
        refresh_path,
        timeout,
    })
}

fn build_session_settings(session: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let path = session
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid("session.path", "must not be empty"));
    }
    Ok(SessionSettings { path })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    refresh_path: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    path: Option<PathBuf>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
