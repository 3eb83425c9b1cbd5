// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use wms_app::{
    DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE, DEFAULT_ROW_HEIGHT, DEFAULT_VIRTUALIZATION_THRESHOLD,
    SmartTableConfig, WindowConfig,
};
use wms_tui::TableSettings;

pub const APP_NAME: &str = "wms";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_DEMO_ROWS: usize = 250;
const DEFAULT_DEMO_SEED: u64 = 42;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            table: Table::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub path: Option<String>,
    pub demo_rows: Option<i64>,
    pub demo_seed: Option<u64>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            path: None,
            demo_rows: Some(DEFAULT_DEMO_ROWS as i64),
            demo_seed: Some(DEFAULT_DEMO_SEED),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub page_size: Option<i64>,
    pub virtualization_threshold: Option<i64>,
    pub row_height: Option<i64>,
    pub overscan: Option<i64>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
            virtualization_threshold: Some(DEFAULT_VIRTUALIZATION_THRESHOLD as i64),
            row_height: Some(DEFAULT_ROW_HEIGHT as i64),
            overscan: Some(DEFAULT_OVERSCAN as i64),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("WMS_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set WMS_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [data], [table], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `wms --print-example-config` for the current layout",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(data_path) = &self.data.path {
            validate_file_path("data.path", data_path)?;
        }
        if let Some(log_path) = &self.log.path {
            validate_file_path("log.path", log_path)?;
        }

        let positive = [
            ("data.demo_rows", self.data.demo_rows),
            ("table.page_size", self.table.page_size),
            ("table.virtualization_threshold", self.table.virtualization_threshold),
            ("table.row_height", self.table.row_height),
        ];
        for (name, value) in positive {
            if let Some(value) = value
                && value <= 0
            {
                bail!("{name} in {} must be positive, got {value}", path.display());
            }
        }

        if let Some(overscan) = self.table.overscan
            && overscan < 0
        {
            bail!(
                "table.overscan in {} must be non-negative, got {}",
                path.display(),
                overscan
            );
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!("log.level in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// Dataset file: `[data].path`, then `WMS_DATA_PATH`. `None` means demo data.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data
            .path
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| env::var_os("WMS_DATA_PATH").map(PathBuf::from))
    }

    pub fn demo_rows(&self) -> usize {
        positive_usize(self.data.demo_rows, DEFAULT_DEMO_ROWS)
    }

    pub fn demo_seed(&self) -> u64 {
        self.data.demo_seed.unwrap_or(DEFAULT_DEMO_SEED)
    }

    pub fn table_settings(&self) -> TableSettings {
        TableSettings {
            page_size: positive_usize(self.table.page_size, DEFAULT_PAGE_SIZE),
            smart: SmartTableConfig {
                virtualization_threshold: positive_usize(
                    self.table.virtualization_threshold,
                    DEFAULT_VIRTUALIZATION_THRESHOLD,
                ),
                window: WindowConfig {
                    row_height: self
                        .table
                        .row_height
                        .and_then(|value| u64::try_from(value).ok())
                        .filter(|value| *value > 0)
                        .unwrap_or(DEFAULT_ROW_HEIGHT),
                    overscan: self
                        .table
                        .overscan
                        .and_then(|value| usize::try_from(value).ok())
                        .unwrap_or(DEFAULT_OVERSCAN),
                },
            },
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path to a writable log file")
        })?;
        let app_dir = data_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create data directory {}", app_dir.display()))?;
        Ok(app_dir.join("wms.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# wms config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional. Without a path (or WMS_DATA_PATH) wms starts with generated demo data.\n# path = \"/absolute/path/to/warehouse.json\"\ndemo_rows = {}\ndemo_seed = {}\n\n[table]\npage_size = {}\n# Tables with at least this many records render only the visible window.\nvirtualization_threshold = {}\nrow_height = {}\noverscan = {}\n\n[log]\n# RUST_LOG overrides this level.\nlevel = \"{}\"\n# path = \"/absolute/path/to/wms.log\"\n",
            path.display(),
            DEFAULT_DEMO_ROWS,
            DEFAULT_DEMO_SEED,
            DEFAULT_PAGE_SIZE,
            DEFAULT_VIRTUALIZATION_THRESHOLD,
            DEFAULT_ROW_HEIGHT,
            DEFAULT_OVERSCAN,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn positive_usize(value: Option<i64>, default: usize) -> usize {
    value
        .and_then(|value| usize::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub fn validate_file_path(name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        bail!("{name} must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!("{name} {path:?} looks like a URI ({scheme}://); pass a filesystem path instead");
        }
    }

    if path.starts_with("file:") {
        bail!("{name} {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    Ok(())
}
