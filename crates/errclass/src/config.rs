//! Library configuration
//!
//! # Environment Variables
//!
//! - `ERRCLASS_STACK_LOG_LENGTH=<bytes>` - Max stack dump length written by
//!   `log_with_stack` (default 4096)
//! - `ERRCLASS_MAX_STACK_FRAMES=<n>` - Max frames captured into an error's
//!   backtrace (default 256)
//!
//! Read once on first use. `set_config` replaces the process-wide value.

use std::str::FromStr;
use std::sync::RwLock;

use once_cell::sync::Lazy;

pub const DEFAULT_STACK_LOG_LENGTH: usize = 4096;
pub const DEFAULT_MAX_STACK_FRAMES: usize = 256;

pub const ENV_STACK_LOG_LENGTH: &str = "ERRCLASS_STACK_LOG_LENGTH";
pub const ENV_MAX_STACK_FRAMES: &str = "ERRCLASS_MAX_STACK_FRAMES";

/// Get environment variable parsed as type T, or return default
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration for stack capture and stack logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Byte cap on the stack dump handed to the log sink
    pub stack_log_length: usize,

    /// Frame cap on backtraces stored in an error
    pub max_stack_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_log_length: DEFAULT_STACK_LOG_LENGTH,
            max_stack_frames: DEFAULT_MAX_STACK_FRAMES,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `ERRCLASS_*` variables that parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            stack_log_length: env_get(ENV_STACK_LOG_LENGTH, defaults.stack_log_length),
            max_stack_frames: env_get(ENV_MAX_STACK_FRAMES, defaults.max_stack_frames),
        }
    }

    pub fn stack_log_length(mut self, bytes: usize) -> Self {
        self.stack_log_length = bytes;
        self
    }

    pub fn max_stack_frames(mut self, n: usize) -> Self {
        self.max_stack_frames = n;
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_stack_frames == 0 {
            return Err("max_stack_frames must be at least 1");
        }
        Ok(())
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| {
    let cfg = Config::from_env();
    RwLock::new(if cfg.validate().is_ok() { cfg } else { Config::default() })
});

/// Current process-wide configuration.
pub fn config() -> Config {
    match CONFIG.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Replace the process-wide configuration.
pub fn set_config(cfg: Config) -> Result<(), &'static str> {
    cfg.validate()?;
    match CONFIG.write() {
        Ok(mut guard) => *guard = cfg,
        Err(poisoned) => *poisoned.into_inner() = cfg,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_get_default() {
        let val: usize = env_get("__ERRCLASS_UNSET_VAR_12345__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn env_get_parses() {
        std::env::set_var("__ERRCLASS_TEST_PARSE__", " 17 ");
        let val: usize = env_get("__ERRCLASS_TEST_PARSE__", 0);
        assert_eq!(val, 17);
        std::env::remove_var("__ERRCLASS_TEST_PARSE__");
    }

    #[test]
    fn env_get_bad_value_falls_back() {
        std::env::set_var("__ERRCLASS_TEST_BAD__", "many");
        let val: usize = env_get("__ERRCLASS_TEST_BAD__", 9);
        assert_eq!(val, 9);
        std::env::remove_var("__ERRCLASS_TEST_BAD__");
    }

    #[test]
    fn builder_and_validate() {
        let cfg = Config::new().stack_log_length(128).max_stack_frames(8);
        assert_eq!(cfg.stack_log_length, 128);
        assert_eq!(cfg.max_stack_frames, 8);
        assert!(cfg.validate().is_ok());
        assert!(Config::new().max_stack_frames(0).validate().is_err());
    }

    #[test]
    fn set_config_rejects_invalid() {
        let before = config();
        assert!(set_config(Config::new().max_stack_frames(0)).is_err());
        assert_eq!(config(), before);
    }
}
