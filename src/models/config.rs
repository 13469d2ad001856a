//! Configuration types.
//!
//! Configuration is layered: `/etc/qtop/config.toml`, then the user config
//! (respecting `XDG_CONFIG_HOME`), then environment variables. Invalid values
//! are corrected to defaults with a warning unless `QTOP_STRICT_CONFIG=1`
//! makes them fatal.

use serde::{Deserialize, Serialize};

/// Minimum allowed input poll interval in milliseconds (prevents busy loops)
const MIN_POLL_MS: u64 = 10;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TopConfig {
    pub system: SystemConfig,

    pub display: DisplayConfig,

    pub input: InputConfig,
}

/// System configuration for paths and environment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Path to directory containing Slurm binaries (squeue, scontrol).
    /// If empty or not set, auto-detected via PATH
    pub slurm_bin_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme name ("dark" or "light")
    pub theme: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Bounded input poll interval in milliseconds
    pub poll_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { poll_ms: 100 }
    }
}

impl InputConfig {
    /// Validate the poll interval.
    /// Returns warnings for corrected values, or an error in strict mode.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        if self.poll_ms < MIN_POLL_MS {
            let msg = format!(
                "input.poll_ms must be at least {} ms, got {}",
                MIN_POLL_MS, self.poll_ms
            );
            if strict {
                return Err(msg);
            }
            let default = Self::default().poll_ms;
            warnings.push(format!("{msg} - using default ({default})"));
            self.poll_ms = default;
        }
        Ok(warnings)
    }
}

impl TopConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/qtop/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/qtop/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/qtop/config.toml (fallback using dirs crate)
    /// 4. None if no config directory can be determined
    #[must_use]
    pub fn user_config_path() -> Option<std::path::PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(std::path::PathBuf::from(xdg_config).join("qtop/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(std::path::PathBuf::from(home).join(".config/qtop/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("qtop/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        Self::load_config_file(&mut config, "/etc/qtop/config.toml", &mut warnings);

        if let Some(user_path) = Self::user_config_path() {
            Self::load_config_file(&mut config, &user_path.to_string_lossy(), &mut warnings);
        }

        config.apply_env_overrides();

        match config.input.validate(strict) {
            Ok(validation_warnings) => warnings.extend(validation_warnings),
            Err(err) => {
                eprintln!("Error: {}", err);
                eprintln!("(QTOP_STRICT_CONFIG is set - config errors are fatal)");
                std::process::exit(1);
            }
        }

        (config, warnings)
    }

    /// Check if strict config mode is enabled via QTOP_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("QTOP_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file, collecting warnings on parse errors but not on
    /// missing files. In strict mode parse errors cause immediate exit.
    fn load_config_file(config: &mut Self, path: &str, warnings: &mut Vec<String>) {
        let strict = Self::is_strict_mode();

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<TopConfig>(&content) {
                Ok(parsed) => config.merge(parsed),
                Err(e) => {
                    if strict {
                        eprintln!("Error: Failed to parse config file '{}': {}", path, e);
                        eprintln!("(QTOP_STRICT_CONFIG is set - config errors are fatal)");
                        std::process::exit(1);
                    } else {
                        warnings.push(format!("Config parse error in '{}': {}", path, e));
                    }
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File not found is expected and not an error
            }
            Err(e) => {
                if strict {
                    eprintln!("Error: Could not read config file '{}': {}", path, e);
                    eprintln!("(QTOP_STRICT_CONFIG is set - config errors are fatal)");
                    std::process::exit(1);
                } else {
                    warnings.push(format!("Could not read config '{}': {}", path, e));
                }
            }
        }
    }

    fn merge(&mut self, other: TopConfig) {
        // Prefer other's slurm_bin_path if set, otherwise keep current
        self.system.slurm_bin_path = other
            .system
            .slurm_bin_path
            .or(self.system.slurm_bin_path.take());
        self.display = other.display;
        self.input = other.input;
    }

    fn apply_env_overrides(&mut self) {
        let strict = Self::is_strict_mode();

        if let Ok(val) = std::env::var("QTOP_SLURM_PATH")
            && !val.is_empty()
        {
            let path = std::path::PathBuf::from(&val);
            if path.is_dir() {
                self.system.slurm_bin_path = Some(path);
            } else {
                Self::report_env_error(strict, "QTOP_SLURM_PATH", &val, "not a valid directory");
            }
        }

        if let Ok(val) = std::env::var("QTOP_THEME") {
            self.display.theme = val;
        }

        if let Ok(val) = std::env::var("QTOP_POLL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms >= MIN_POLL_MS => {
                    self.input.poll_ms = ms;
                }
                Ok(_) => Self::report_env_error(
                    strict,
                    "QTOP_POLL_MS",
                    &val,
                    &format!("must be at least {} ms", MIN_POLL_MS),
                ),
                Err(_) => Self::report_env_error(
                    strict,
                    "QTOP_POLL_MS",
                    &val,
                    "expected a positive integer (milliseconds)",
                ),
            }
        }
    }

    /// Report an environment variable error, exiting if strict mode is enabled
    fn report_env_error(strict: bool, var_name: &str, value: &str, reason: &str) {
        if strict {
            eprintln!("Error: Invalid value '{}' for {}: {}", value, var_name, reason);
            eprintln!("(QTOP_STRICT_CONFIG is set - config errors are fatal)");
            std::process::exit(1);
        } else {
            eprintln!(
                "Warning: Invalid value '{}' for {}, {} - using default",
                value, var_name, reason
            );
        }
    }
}
