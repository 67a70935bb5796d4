use crate::core::app::Settings;
use crate::core::geofence::{DEFAULT_EXIT_BUFFER_METERS, GeofencePolicy, MAX_DISTANCE_METERS};
use crate::core::timer::TimerSettings;
use crate::core::tracker::TrackerSettings;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub geofence: GeofenceConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub timers: TimersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceConfig {
    #[serde(default = "default_radius")]
    pub radius_m: f64,
    /// Extra meters tolerated before a checked-in employee is checked out.
    #[serde(default = "default_exit_buffer")]
    pub exit_buffer_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_high_timeout")]
    pub high_accuracy_timeout_secs: u64,
    #[serde(default = "default_low_timeout")]
    pub low_accuracy_timeout_secs: u64,
    /// Oldest fix accepted to gate an employee login.
    #[serde(default = "default_fix_max_age")]
    pub login_fix_max_age_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimersConfig {
    #[serde(default = "default_history_interval")]
    pub history_interval_secs: u64,
    #[serde(default = "default_ui_clock_interval")]
    pub ui_clock_interval_secs: u64,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_radius() -> f64 {
    MAX_DISTANCE_METERS
}
fn default_exit_buffer() -> f64 {
    DEFAULT_EXIT_BUFFER_METERS
}
fn default_high_timeout() -> u64 {
    8
}
fn default_low_timeout() -> u64 {
    60
}
fn default_fix_max_age() -> u64 {
    300
}
fn default_history_interval() -> u64 {
    300
}
fn default_ui_clock_interval() -> u64 {
    1
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius(),
            exit_buffer_m: default_exit_buffer(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            high_accuracy_timeout_secs: default_high_timeout(),
            low_accuracy_timeout_secs: default_low_timeout(),
            login_fix_max_age_secs: default_fix_max_age(),
        }
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            history_interval_secs: default_history_interval(),
            ui_clock_interval_secs: default_ui_clock_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            geofence: GeofenceConfig::default(),
            tracker: TrackerConfig::default(),
            timers: TimersConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rattend")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rattend")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattend.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattend.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database path is empty".into()));
        }
        if !(self.geofence.radius_m.is_finite() && self.geofence.radius_m > 0.0) {
            return Err(AppError::Config(format!(
                "geofence.radius_m must be positive, got {}",
                self.geofence.radius_m
            )));
        }
        if !(self.geofence.exit_buffer_m.is_finite() && self.geofence.exit_buffer_m >= 0.0) {
            return Err(AppError::Config(format!(
                "geofence.exit_buffer_m must not be negative, got {}",
                self.geofence.exit_buffer_m
            )));
        }
        let secs = [
            ("tracker.high_accuracy_timeout_secs", self.tracker.high_accuracy_timeout_secs),
            ("tracker.low_accuracy_timeout_secs", self.tracker.low_accuracy_timeout_secs),
            ("timers.history_interval_secs", self.timers.history_interval_secs),
            ("timers.ui_clock_interval_secs", self.timers.ui_clock_interval_secs),
        ];
        if let Some((name, _)) = secs.iter().find(|(_, v)| *v == 0) {
            return Err(AppError::Config(format!("{name} must be at least 1")));
        }
        Ok(())
    }

    /// Runtime settings handed to the core.
    pub fn settings(&self) -> Settings {
        Settings {
            geofence: GeofencePolicy {
                radius_m: self.geofence.radius_m,
                exit_buffer_m: self.geofence.exit_buffer_m,
            },
            tracker: TrackerSettings {
                high_accuracy_timeout: Duration::from_secs(self.tracker.high_accuracy_timeout_secs),
                low_accuracy_timeout: Duration::from_secs(self.tracker.low_accuracy_timeout_secs),
                login_fix_max_age: Duration::from_secs(self.tracker.login_fix_max_age_secs),
            },
            timers: TimerSettings {
                history_interval: Duration::from_secs(self.timers.history_interval_secs),
                ui_clock_interval: Duration::from_secs(self.timers.ui_clock_interval_secs),
            },
        }
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}
