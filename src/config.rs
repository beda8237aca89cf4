use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How the four integers in an edge-key string map onto (row, col).
/// Some feed versions emit (x, y) instead of (row, col); the convention is
/// picked once here, never guessed per key.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AxisConvention {
    #[default]
    RowMajor,
    Swapped,
}

impl FromStr for AxisConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row-major" | "row_major" | "rowmajor" => Ok(AxisConvention::RowMajor),
            "swapped" => Ok(AxisConvention::Swapped),
            other => Err(format!("unknown axis convention: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub url: Option<String>,
    pub batch_file: Option<PathBuf>,
    pub retry_limit: u32,
    pub retry_backoff: Duration,
    pub axis: AxisConvention,
    pub max_steps: Option<u32>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            batch_file: None,
            retry_limit: 3,
            retry_backoff: Duration::from_secs(1),
            axis: AxisConvention::RowMajor,
            max_steps: None,
            log_level: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnvOverrides {
    pub url: Option<String>,
    pub retry_limit: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub axis: Option<AxisConvention>,
    pub max_steps: Option<u32>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn load() -> Self {
        let url = env::var("SCENE_SYNC_URL").ok();
        let retry_limit = env::var("SCENE_SYNC_RETRY_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok());
        let backoff_ms = env::var("SCENE_SYNC_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());
        let axis = env::var("SCENE_SYNC_AXIS")
            .ok()
            .and_then(|s| s.parse::<AxisConvention>().ok());
        let max_steps = env::var("SCENE_SYNC_MAX_STEPS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok());
        let log_level = env::var("SCENE_SYNC_LOG_LEVEL").ok();
        Self { url, retry_limit, backoff_ms, axis, max_steps, log_level }
    }
}

impl Config {
    /// Overlay env on top of CLI values (env > CLI precedence).
    pub fn overlay(&mut self, env: EnvOverrides) {
        if env.url.is_some() {
            self.url = env.url;
        }
        if let Some(n) = env.retry_limit {
            self.retry_limit = n;
        }
        if let Some(ms) = env.backoff_ms {
            self.retry_backoff = Duration::from_millis(ms);
        }
        if let Some(a) = env.axis {
            self.axis = a;
        }
        if env.max_steps.is_some() {
            self.max_steps = env.max_steps;
        }
        if env.log_level.is_some() {
            self.log_level = env.log_level;
        }
    }
}
