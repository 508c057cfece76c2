use std::{env, fmt, fs, path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {} does not exist", .0.display())]
    NotFound(path::PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    ReadFailed { path: path::PathBuf, source: std::io::Error },

    #[error("Failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub monitor: MonitorSettings,
    pub retention: RetentionSettings,
    pub telegram: TelegramSettings,
    pub email: EmailSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Endpoint probed before each tick to tell our own outage from the sites'
    pub network_check_url: String,
    pub network_check_timeout_secs: u64,
    pub site_timeout_secs: u64,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    pub history_days: i64,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub address: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { path: "sitewatch.db".into() }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            network_check_url: "https://www.google.com".into(),
            network_check_timeout_secs: 5,
            site_timeout_secs: 10,
            interval_secs: 600,
        }
    }
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self { history_days: 30, interval_secs: 3600 }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self { bot_token: None, chat_id: None, api_base: "https://api.telegram.org".into() }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            recipient: None,
            smtp_host: "smtp.gmail.com".into(),
            smtp_port: 465,
        }
    }
}

impl MonitorSettings {
    pub fn site_timeout(&self) -> Duration {
        Duration::from_secs(self.site_timeout_secs)
    }

    pub fn network_check_timeout(&self) -> Duration {
        Duration::from_secs(self.network_check_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

fn or_unset(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<unset>")
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration:")?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Network Check URL", &self.monitor.network_check_url)?;
        write_1(f, "Network Check Timeout (s)", &self.monitor.network_check_timeout_secs)?;
        write_1(f, "Site Timeout (s)", &self.monitor.site_timeout_secs)?;
        write_1(f, "Interval (s)", &self.monitor.interval_secs)?;
        write_title_1(f, "Retention")?;
        write_1(f, "History Days", &self.retention.history_days)?;
        write_1(f, "Interval (s)", &self.retention.interval_secs)?;
        write_title_1(f, "Telegram")?;
        write_1(f, "Bot Token", &redact(&self.telegram.bot_token))?;
        write_1(f, "Chat ID", &or_unset(&self.telegram.chat_id))?;
        write_title_1(f, "Email")?;
        write_1(f, "Address", &or_unset(&self.email.address))?;
        write_1(f, "Password", &redact(&self.email.password))?;
        write_1(f, "Recipient", &or_unset(&self.email.recipient))?;
        write_1(f, "SMTP", &format!("{}:{}", self.email.smtp_host, self.email.smtp_port))?;

        Ok(())
    }
}

impl Config {
    /// Build the process configuration: defaults, then the optional TOML file,
    /// then environment variables (after loading `.env`).
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match optional_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read an explicitly requested config file, which must exist.
    pub fn from_file(path: impl AsRef<path::Path>) -> Result<Self, ConfigError> {
        let config_path = normalize_toml_path(path.as_ref());
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }

        let raw_string = fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
        Ok(toml::from_str(&raw_string)?)
    }

    /// Override fields from environment-style variables provided by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = text("DATABASE_PATH") {
            self.database.path = v;
        }
        if let Some(v) = text("NETWORK_CHECK_URL") {
            self.monitor.network_check_url = v;
        }
        parse_into(&lookup, "NETWORK_CHECK_TIMEOUT", &mut self.monitor.network_check_timeout_secs)?;
        parse_into(&lookup, "SITE_TIMEOUT", &mut self.monitor.site_timeout_secs)?;
        parse_into(&lookup, "CHECK_INTERVAL", &mut self.monitor.interval_secs)?;
        parse_into(&lookup, "HISTORY_RETENTION_DAYS", &mut self.retention.history_days)?;
        parse_into(&lookup, "RETENTION_INTERVAL", &mut self.retention.interval_secs)?;

        if let Some(v) = text("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(v);
        }
        if let Some(v) = text("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(v);
        }
        if let Some(v) = text("TELEGRAM_API_URL") {
            self.telegram.api_base = v;
        }

        if let Some(v) = text("EMAIL_ADDRESS") {
            self.email.address = Some(v);
        }
        if let Some(v) = text("EMAIL_PASSWORD") {
            self.email.password = Some(v);
        }
        if let Some(v) = text("RECIPIENT_EMAIL") {
            self.email.recipient = Some(v);
        }
        if let Some(v) = text("SMTP_HOST") {
            self.email.smtp_host = v;
        }
        parse_into(&lookup, "SMTP_PORT", &mut self.email.smtp_port)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.monitor.network_check_url).map_err(|e| {
            ConfigError::Invalid(format!("network check url is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "network check url must be http or https, got {}",
                url.scheme()
            )));
        }

        check_range("network check timeout", self.monitor.network_check_timeout_secs, 1, 300)?;
        check_range("site timeout", self.monitor.site_timeout_secs, 1, 300)?;
        check_range("check interval", self.monitor.interval_secs, 10, 86_400)?;
        check_range("retention interval", self.retention.interval_secs, 60, 86_400 * 7)?;

        if !(1..=MAX_HISTORY_DAYS).contains(&self.retention.history_days) {
            return Err(ConfigError::Invalid(format!(
                "history retention must be between 1 and {MAX_HISTORY_DAYS} days, got {}",
                self.retention.history_days
            )));
        }

        Ok(())
    }
}

/// Roughly a century
const MAX_HISTORY_DAYS: i64 = 36_500;

fn parse_into<F, T>(lookup: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(var) else { return Ok(()) };
    if raw.trim().is_empty() {
        return Ok(());
    }
    *slot = raw.trim().parse().map_err(|_| ConfigError::InvalidValue { var, value: raw })?;
    Ok(())
}

fn check_range(label: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{label} must be between {min} and {max} seconds, got {value}"
        )));
    }
    Ok(())
}
