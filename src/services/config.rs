use serde::Deserialize;
use std::path::Path;

use crate::cli::Cli;

pub const DEFAULT_OWNER: &str = "grafana";
pub const DEFAULT_REPO: &str = "grafana";
pub const DEFAULT_LABEL: &str = "type/bug";
pub const DEFAULT_PRODUCT: &str = "Grafana";
pub const DEFAULT_PAGES: u32 = 20;

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub fetch: FetchSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProjectSection {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub label: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FetchSection {
    pub pages: Option<u32>,
}

/// Fully resolved settings: CLI flags over config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub label: String,
    pub product: String,
    pub pages: u32,
}

/// Load the optional TOML config. A missing file falls back to defaults.
pub fn load_config(path: &Path) -> anyhow::Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

pub fn resolve(cli: &Cli, file: &ConfigFile, pages_flag: Option<u32>) -> Settings {
    Settings {
        owner: cli
            .owner
            .clone()
            .or_else(|| file.project.owner.clone())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
        repo: cli
            .repo
            .clone()
            .or_else(|| file.project.repo.clone())
            .unwrap_or_else(|| DEFAULT_REPO.to_string()),
        label: cli
            .label
            .clone()
            .or_else(|| file.project.label.clone())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        product: cli
            .product
            .clone()
            .or_else(|| file.project.product.clone())
            .unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
        pages: pages_flag.or(file.fetch.pages).unwrap_or(DEFAULT_PAGES),
    }
}
