use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub raffle: RaffleConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound on waiting for a connection to open (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaffleConfig {
    pub lucky_number_min: i32,
    pub lucky_number_max: i32,
    /// Attempts at finding an unused lucky number before giving up
    pub max_number_attempts: u32,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            lucky_number_min: 1000,
            lucky_number_max: 9999,
            max_number_attempts: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub status_ttl_secs: u64,
    pub winners_ttl_secs: u64,
    pub participants_ttl_secs: u64,
    /// Entries older than this are swept even if never read again
    pub max_age_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            status_ttl_secs: 30,
            winners_ttl_secs: 60,
            participants_ttl_secs: 60,
            max_age_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub register_ms: u64,
    pub session_ms: u64,
    pub draw_ms: u64,
    pub purge_after_secs: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            register_ms: 2000,
            session_ms: 1000,
            draw_ms: 1000,
            purge_after_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub ttl_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub token: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token: "change-me-in-production".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no config file: build from environment and defaults
                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: 8080,
                    },
                    database: DatabaseConfig::new(
                        env::var("DATABASE_URL")
                            .unwrap_or_else(|_| "sqlite://raffle.db?mode=rwc".to_string()),
                    ),
                    raffle: RaffleConfig::default(),
                    cache: CacheConfig::default(),
                    debounce: DebounceConfig::default(),
                    display: DisplayConfig::default(),
                    admin: AdminConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        // environment overrides apply even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("DB_CONNECT_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.database.connect_timeout_secs = n;
        }
        if let Ok(v) = env::var("CACHE_STATUS_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.cache.status_ttl_secs = n;
        }
        if let Ok(v) = env::var("CACHE_WINNERS_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.cache.winners_ttl_secs = n;
        }
        if let Ok(v) = env::var("DEBOUNCE_REGISTER_MS")
            && let Ok(n) = v.parse()
        {
            config.debounce.register_ms = n;
        }
        if let Ok(v) = env::var("DISPLAY_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.display.ttl_secs = n;
        }
        if let Ok(v) = env::var("ADMIN_TOKEN") {
            config.admin.token = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.raffle.lucky_number_min > self.raffle.lucky_number_max {
            return Err("raffle.lucky_number_min must not exceed raffle.lucky_number_max".into());
        }
        if self.database.max_connections == 0 {
            return Err("database.max_connections must be at least 1".into());
        }
        Ok(())
    }
}
