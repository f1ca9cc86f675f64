// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered settings: config file, then environment, then command-line flags.

use crate::env;
use anyhow::{Context, Result};
use rw_adapters::HttpBackendConfig;
use rw_engine::MonitorConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub monitor: MonitorSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSection {
    pub retry_base_ms: Option<u64>,
    pub retry_max_ms: Option<u64>,
    pub resubscribe_attempts: Option<u32>,
    pub log_capacity: Option<usize>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `RW_CONFIG` if set, otherwise the default location when it exists.
    pub fn discover() -> Result<Self> {
        if let Some(path) = env::config_override() {
            return Self::read(&path);
        }
        match env::default_config_path() {
            Some(path) if path.exists() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Values taken from `RW_*` environment variables.
#[derive(Debug, Default)]
pub struct EnvSettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout: Option<Duration>,
    pub retry_base: Option<Duration>,
    pub retry_max: Option<Duration>,
}

impl EnvSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: env::base_url(),
            token: env::token(),
            request_timeout: env::request_timeout(),
            retry_base: env::retry_base(),
            retry_max: env::retry_max(),
        }
    }
}

/// Global flags.
#[derive(Debug, Default)]
pub struct Flags {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: HttpBackendConfig,
    pub monitor: MonitorConfig,
}

impl Settings {
    pub fn load(flags: Flags) -> Result<Self> {
        Self::resolve(FileConfig::discover()?, EnvSettings::from_env(), flags)
    }

    pub fn resolve(file: FileConfig, env: EnvSettings, flags: Flags) -> Result<Self> {
        let Some(base_url) = flags.base_url.or(env.base_url).or(file.base_url) else {
            anyhow::bail!("no backend URL: pass --base-url, set RW_BASE_URL or add base_url to the config file");
        };

        let mut backend = HttpBackendConfig::new(base_url);
        if let Some(timeout) =
            env.request_timeout.or(file.request_timeout_ms.map(Duration::from_millis))
        {
            backend = backend.request_timeout(timeout);
        }
        if let Some(token) = flags.token.or(env.token).or(file.token) {
            backend = backend.token(token);
        }

        let section = file.monitor;
        let mut monitor = MonitorConfig::default();
        if let Some(base) = env.retry_base.or(section.retry_base_ms.map(Duration::from_millis)) {
            monitor = monitor.retry_base(base);
        }
        if let Some(max) = env.retry_max.or(section.retry_max_ms.map(Duration::from_millis)) {
            monitor = monitor.retry_max(max);
        }
        if let Some(attempts) = section.resubscribe_attempts {
            monitor = monitor.resubscribe_attempts(attempts);
        }
        if let Some(capacity) = section.log_capacity {
            monitor = monitor.log_capacity(capacity);
        }

        Ok(Self { backend, monitor })
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
