// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::bvh::DEFAULT_PARALLEL_THRESHOLD;

/// File picked up by [`KernelConfig::load`] from the working directory
pub const CONFIG_FILE: &str = "polycut.toml";

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Primitive count from which Morton codes are computed in parallel
    pub parallel_morton_threshold: usize,
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`, `off`)
    pub log_level: String,
    /// Verbose output
    pub verbose: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            parallel_morton_threshold: DEFAULT_PARALLEL_THRESHOLD,
            log_level: "warn".to_string(),
            verbose: false,
        }
    }
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        Self::resolve(None, false, |key| std::env::var(key).ok())
    }

    /// Merge every configuration source, lowest priority first: `path` (or
    /// [`CONFIG_FILE`] when present), `POLYCUT_*` overrides looked up through
    /// `var`, then the `--verbose` flag, which can only switch verbosity on.
    pub fn resolve(
        path: Option<&Path>,
        verbose: bool,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_overrides(var);
        config.verbose |= verbose;
        Ok(config)
    }

    /// Apply `POLYCUT_*` overrides looked up through `var`.
    ///
    /// Values that fail to parse leave the setting unchanged.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(threshold) = var("POLYCUT_PARALLEL_THRESHOLD") {
            match threshold.parse() {
                Ok(value) => self.parallel_morton_threshold = value,
                Err(_) => log::warn!("ignoring POLYCUT_PARALLEL_THRESHOLD={:?}", threshold),
            }
        }

        if let Some(level) = var("POLYCUT_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(verbose) = var("POLYCUT_VERBOSE") {
            self.verbose = verbose.parse().unwrap_or(self.verbose);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Effective log filter; `verbose` raises it to at least `debug`
    pub fn level_filter(&self) -> LevelFilter {
        let level = self.log_level.parse().unwrap_or(LevelFilter::Warn);
        if self.verbose {
            level.max(LevelFilter::Debug)
        } else {
            level
        }
    }
}
