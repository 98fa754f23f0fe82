// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::controller;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of ingresses reconciled in parallel
    pub concurrent_workers: u16,
    /// Interval after which an enabled ingress is reconciled again
    pub resync_interval: Duration,
    /// Attempts for a retryable failure before waiting for the next resync
    pub processing_job_retries: u32,
    /// Restrict the watch to one namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            concurrent_workers: controller::CONCURRENT_WORKERS,
            resync_interval: Duration::from_secs(controller::RESYNC_INTERVAL_SECS),
            processing_job_retries: controller::PROCESSING_JOB_RETRIES,
            watch_namespace: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let concurrent_workers = parse_or(&lookup, "CONCURRENT_WORKERS", defaults.concurrent_workers)?;
        if concurrent_workers == 0 {
            anyhow::bail!("CONCURRENT_WORKERS must be at least 1");
        }

        let resync_interval = parse_or(&lookup, "RESYNC_INTERVAL_SECS", controller::RESYNC_INTERVAL_SECS)
            .map(Duration::from_secs)?;
        if resync_interval.is_zero() {
            anyhow::bail!("RESYNC_INTERVAL_SECS must be greater than 0");
        }

        let processing_job_retries =
            parse_or(&lookup, "PROCESSING_JOB_RETRIES", defaults.processing_job_retries)?;

        let watch_namespace = lookup("WATCH_NAMESPACE")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty());

        Ok(Config {
            concurrent_workers,
            resync_interval,
            processing_job_retries,
            watch_namespace,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
