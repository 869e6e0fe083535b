use std::{fs, time::Duration};

use list_view::{IdStrategy, LoadOrder};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    pub clients: usize,
    pub products: usize,
    pub orders: usize,
    pub invoices: usize,
    pub users: usize,
    pub storefront: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            clients: 10,
            products: 10,
            orders: 8,
            invoices: 8,
            users: 10,
            storefront: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub api_base_url: String,
    pub remote_enabled: bool,
    pub request_timeout_secs: u64,
    /// Each CLI run is a fresh session, so the store is read before the remote api.
    pub load_order: LoadOrder,
    pub id_strategy: IdStrategy,
    pub page_sizes: PageSizes,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/admin.db".into(),
            api_base_url: remote::DEFAULT_BASE_URL.into(),
            remote_enabled: true,
            request_timeout_secs: 10,
            load_order: LoadOrder::LocalFirst,
            id_strategy: IdStrategy::Sequence,
            page_sizes: PageSizes::default(),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Shape of `admin.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    database_url: Option<String>,
    api_base_url: Option<String>,
    remote_enabled: Option<bool>,
    request_timeout_secs: Option<u64>,
    load_order: Option<String>,
    id_strategy: Option<String>,
    page_sizes: Option<PageSizes>,
    log_level: Option<String>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment variables.
fn settings_from(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REMOTE_ENABLED") {
        match parse_flag(&v) {
            Some(enabled) => settings.remote_enabled = enabled,
            None => warn!(value = %v, "APP__REMOTE_ENABLED is not a boolean"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__LOAD_ORDER") {
        set_load_order(&mut settings, &v);
    }

    if let Some(v) = env("APP__ID_STRATEGY") {
        set_id_strategy(&mut settings, &v);
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.remote_enabled {
        settings.remote_enabled = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.load_order {
        set_load_order(settings, &v);
    }
    if let Some(v) = file_cfg.id_strategy {
        set_id_strategy(settings, &v);
    }
    if let Some(v) = file_cfg.page_sizes {
        settings.page_sizes = v;
    }
    if let Some(v) = file_cfg.log_level {
        settings.log_level = v;
    }
}

fn set_load_order(settings: &mut Settings, raw: &str) {
    match raw.parse::<LoadOrder>() {
        Ok(order) => settings.load_order = order,
        Err(error) => warn!(%error, "keeping load order {:?}", settings.load_order),
    }
}

fn set_id_strategy(settings: &mut Settings, raw: &str) {
    match raw.parse::<IdStrategy>() {
        Ok(strategy) => settings.id_strategy = strategy,
        Err(error) => warn!(%error, "keeping id strategy {:?}", settings.id_strategy),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Turns a bare file path into a `sqlite://` URL. Other URLs pass through.
pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
