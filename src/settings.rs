use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::utils::logging::LoggingHelper;

/// Directory holding an overriding `Settings.toml`
pub const CONFIG_DIR_ENV: &str = "KNUGGET_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KnuggetSettings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub frontend: FrontendSettings,
    pub cookies: CookieSettings,
    pub extension: ExtensionSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

/// External identity/summary server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub server_url: String,
    pub request_timeout_secs: u64,
}

/// Rendering layer that serves the pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendSettings {
    pub renderer_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    /// Mark cookies `Secure` even when the request scheme is plain HTTP
    /// (for deployments behind a TLS-terminating proxy that hides the scheme)
    pub force_secure: bool,
    pub http_only: bool,
    pub refresh_token_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    /// Native-messaging bridge; without one there is no messaging capability
    pub bridge_url: Option<String>,
    /// Acknowledgment deadline in milliseconds, 0 waits indefinitely
    pub ack_timeout_ms: u64,
}

/// Timings and destinations handed to the page after a flow completes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub redirect_delay_ms: u64,
    pub close_delay_ms: u64,
    pub landing_path: String,
    pub login_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            renderer_url: "http://localhost:3001".to_string(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            force_secure: false,
            http_only: true,
            refresh_token_days: 30,
        }
    }
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            bridge_url: None,
            ack_timeout_ms: 5000,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 1500,
            close_delay_ms: 1500,
            landing_path: "/dashboard".to_string(),
            login_path: "/auth/login".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ExtensionSettings {
    /// Acknowledgment deadline, `None` when disabled
    #[must_use]
    pub fn ack_timeout(&self) -> Option<Duration> {
        (self.ack_timeout_ms > 0).then(|| Duration::from_millis(self.ack_timeout_ms))
    }
}

impl KnuggetSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - A settings file cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_file(Path::new(".env"));

        let config_dir = std::env::var(CONFIG_DIR_ENV).ok();
        let mut settings = Self::load_base_settings(Path::new("."), config_dir.as_deref().map(Path::new))?;
        settings.apply_env_overrides();

        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
        )
        .try_init()?;
        LoggingHelper::log_settings_loaded(&settings);
        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately)
    /// 2. `Settings.toml` in `config_dir` (if given and present)
    /// 3. `Settings.toml` in `base_dir` (if present)
    /// 4. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed.
    pub fn load_base_settings(base_dir: &Path, config_dir: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = Self::default();

        let base_path = base_dir.join("Settings.toml");
        if base_path.exists() {
            settings = basic_toml::from_str(&fs::read_to_string(&base_path)?)?;
            println!("✓ Loaded base settings from {}", base_path.display());
        }

        if let Some(dir) = config_dir {
            let override_path = dir.join("Settings.toml");
            if override_path.exists() {
                settings = basic_toml::from_str(&fs::read_to_string(&override_path)?)?;
                println!("✓ Overriding settings from {}", override_path.display());
            } else {
                println!(
                    "ℹ {CONFIG_DIR_ENV} set but no Settings.toml found at: {}",
                    override_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.application.host = host;
        }
        apply_parsed_env("PORT", &mut self.application.port);
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            self.application.cors_origins = cors_origins;
        }

        // SERVER_URL wins over the older SERVER_API_URL name
        if let Some(server_url) = ["SERVER_URL", "SERVER_API_URL"]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        {
            self.backend.server_url = server_url;
        }
        apply_parsed_env("BACKEND_TIMEOUT_SECS", &mut self.backend.request_timeout_secs);

        if let Ok(renderer_url) = std::env::var("RENDERER_URL") {
            self.frontend.renderer_url = renderer_url;
        }

        apply_parsed_env("COOKIE_FORCE_SECURE", &mut self.cookies.force_secure);
        apply_parsed_env("COOKIE_HTTP_ONLY", &mut self.cookies.http_only);

        if let Ok(bridge_url) = std::env::var("EXTENSION_BRIDGE_URL") {
            self.extension.bridge_url = Some(bridge_url).filter(|url| !url.is_empty());
        }
        apply_parsed_env("EXTENSION_ACK_TIMEOUT_MS", &mut self.extension.ack_timeout_ms);

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Load `KEY=VALUE` lines from an env file without overriding the process environment
    fn load_env_file(path: &Path) {
        let Ok(contents) = fs::read_to_string(path) else {
            return;
        };
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if std::env::var_os(key).is_none() {
                    std::env::set_var(key, value.trim().trim_matches('"'));
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn apply_parsed_env<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => log::warn!("Ignoring unparsable value for {name}: {raw}"),
        }
    }
}
