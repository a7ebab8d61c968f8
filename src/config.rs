use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::brightness::DEFAULT_SMOOTHING_WINDOW;
use crate::audio::window::DEFAULT_WINDOW_MS;
use crate::cli::{Cli, DEFAULT_HEADER};

pub const CONFIG_FILE: &str = "brightline.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisSection {
    #[serde(default = "default_window_ms")]
    pub window_ms: u32,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    pub header: Option<PathBuf>,
    pub plot: Option<PathBuf>,
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub no_plot: bool,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            smoothing_window: default_smoothing_window(),
        }
    }
}

fn default_window_ms() -> u32 { DEFAULT_WINDOW_MS }
fn default_smoothing_window() -> usize { DEFAULT_SMOOTHING_WINDOW }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Explicit path first, then `./brightline.toml`, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("brightline").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("brightline").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Config values apply only where the CLI is still at its default.
pub fn merge_into(cli: &mut Cli, cfg: Config) {
    if cli.window_ms == DEFAULT_WINDOW_MS { cli.window_ms = cfg.analysis.window_ms; }
    if cli.smoothing_window == DEFAULT_SMOOTHING_WINDOW {
        cli.smoothing_window = cfg.analysis.smoothing_window;
    }
    if cli.output == Path::new(DEFAULT_HEADER) {
        if let Some(header) = cfg.output.header {
            cli.output = header;
        }
    }
    if cli.plot.is_none() && !cli.no_plot {
        cli.plot = cfg.output.plot;
        cli.no_plot = cfg.output.no_plot;
    }
    if cli.report.is_none() {
        cli.report = cfg.output.report;
    }
}
