use crate::config::AppConfig;
use std::fmt;
use std::fs;

const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightIssue {
    pub setting: &'static str,
    pub message: String,
}

impl fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.setting, self.message)
    }
}

fn issue(setting: &'static str, message: impl Into<String>) -> PreflightIssue {
    PreflightIssue {
        setting,
        message: message.into(),
    }
}

/// Startup checks run once before any pipeline run. Returns every problem
/// found; an empty list means the environment is usable. May create the
/// output directory.
pub fn check(cfg: &AppConfig) -> Vec<PreflightIssue> {
    let mut issues = Vec::new();

    for (setting, value) in [
        ("region", &cfg.region),
        ("language", &cfg.language),
        ("timeframe", &cfg.timeframe),
    ] {
        if value.trim().is_empty() {
            issues.push(issue(setting, "must not be empty"));
        }
    }
    if cfg.connect_timeout_secs == 0 {
        issues.push(issue("connect_timeout_secs", "must be > 0"));
    }
    if cfg.read_timeout_secs == 0 {
        issues.push(issue("read_timeout_secs", "must be > 0"));
    }
    if cfg.retries > MAX_RETRIES {
        issues.push(issue("retries", format!("must be <= {}", MAX_RETRIES)));
    }
    if !cfg.backoff_factor.is_finite() || cfg.backoff_factor < 0.0 {
        issues.push(issue("backoff_factor", "must be a finite number >= 0"));
    }
    if cfg.cache_ttl_secs == 0 {
        issues.push(issue("cache_ttl_secs", "must be > 0"));
    }

    let dir = &cfg.output_dir;
    if dir.exists() {
        if !dir.is_dir() {
            issues.push(issue("output_dir", format!("{} is not a directory", dir.display())));
        }
    } else if let Err(e) = fs::create_dir_all(dir) {
        issues.push(issue("output_dir", format!("cannot create {}: {}", dir.display(), e)));
    }

    issues
}
