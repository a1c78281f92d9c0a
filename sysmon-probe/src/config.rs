use mallab_filter_enum::DEFAULT_INITIAL_BUFFER;

use crate::error::ProbeError;

// Altitude Microsoft assigned to the Sysmon minifilter.
pub const SYSMON_ALTITUDE: i32 = 385201;
pub const SYSMON_DEFAULT_NAME: &str = "SysmonDrv";
pub const SYSMON_LABEL: &str = "Sysmon";

pub const ENV_TARGET_ALTITUDE: &str = "PROBE_TARGET_ALTITUDE";
pub const ENV_DEFAULT_NAME: &str = "PROBE_DEFAULT_NAME";
pub const ENV_INITIAL_BUFFER: &str = "PROBE_INITIAL_BUFFER";
pub const ENV_DRIVER_LABEL: &str = "PROBE_DRIVER_LABEL";

/// Which driver counts as the one under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub target_altitude: i32,
    pub default_name: String,
    /// Human name used in the verdict line.
    pub label: String,
    pub initial_buffer: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            target_altitude: SYSMON_ALTITUDE,
            default_name: SYSMON_DEFAULT_NAME.to_string(),
            label: SYSMON_LABEL.to_string(),
            initial_buffer: DEFAULT_INITIAL_BUFFER,
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, ProbeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// defaults for keys that are missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = ProbeConfig::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = value(ENV_TARGET_ALTITUDE) {
            cfg.target_altitude = parse_altitude(ENV_TARGET_ALTITUDE, &raw)?;
        }
        if let Some(raw) = value(ENV_DEFAULT_NAME) {
            cfg.default_name = raw.trim().to_string();
        }
        if let Some(raw) = value(ENV_DRIVER_LABEL) {
            cfg.label = raw.trim().to_string();
        }
        if let Some(raw) = value(ENV_INITIAL_BUFFER) {
            cfg.initial_buffer = raw.trim().parse().map_err(|e| ProbeError::Config {
                key: ENV_INITIAL_BUFFER.to_string(),
                message: format!("{raw:?}: {e}"),
            })?;
            if cfg.initial_buffer == 0 {
                return Err(ProbeError::Config {
                    key: ENV_INITIAL_BUFFER.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(cfg)
    }
}

pub fn parse_altitude(key: &str, raw: &str) -> Result<i32, ProbeError> {
    raw.trim().parse().map_err(|e| ProbeError::Config {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
