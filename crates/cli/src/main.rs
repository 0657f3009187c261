use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use menubar_util::{MenuBarConfig, MenuItemConfig, expand_tilde};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Env var overriding where the log file is written.
const LOG_PATH_ENV: &str = "MENUBAR_LOG_PATH";

/// Items shown when neither the config file nor the command line names any.
const DEMO_ITEMS: &[&str] = &["Home", "Products", "Solutions", "Pricing", "Docs", "Blog", "Community", "Support", "About"];

/// Adaptive menu bar: resize the terminal to watch items move into "More".
#[derive(Debug, Parser)]
#[command(name = "menubar", version, about)]
struct Cli {
    /// Config file path (defaults to MENUBAR_CONFIG_PATH or the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Text on the overflow toggle
    #[arg(long, value_name = "TEXT")]
    overflow_label: Option<String>,

    /// Render every item inline and never build a dropdown
    #[arg(long)]
    no_overflow: bool,

    /// Menu item label; repeat to add several. Replaces configured items.
    #[arg(long = "item", value_name = "LABEL")]
    items: Vec<String>,
}

impl Cli {
    /// Loads the config file and applies command line overrides.
    fn resolve_config(&self) -> Result<MenuBarConfig> {
        let mut config = match self.config.as_deref() {
            Some(path) => MenuBarConfig::load_from(&expand_tilde(path)),
            None => MenuBarConfig::load(),
        }
        .context("failed to load menu bar config")?;

        if let Some(label) = self.overflow_label.as_ref().filter(|label| !label.trim().is_empty()) {
            config.overflow_label = label.clone();
        }
        if self.no_overflow {
            config.overflow_enabled = false;
        }
        if !self.items.is_empty() {
            config.items = self.items.iter().map(|label| item_config(label)).collect();
        }
        if config.items.is_empty() {
            config.items = DEMO_ITEMS.iter().map(|label| item_config(label)).collect();
        }
        Ok(config)
    }
}

fn item_config(label: &str) -> MenuItemConfig {
    MenuItemConfig {
        label: label.to_string(),
        disabled: false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = cli.resolve_config()?;
    info!(
        items = config.items.len(),
        overflow_enabled = config.overflow_enabled,
        "starting menu bar"
    );
    menubar_tui::run(config).await
}

fn default_log_path() -> PathBuf {
    if let Ok(path) = std::env::var(LOG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menubar")
        .join("menubar.log")
}

/// Opens the log file; logs are discarded when it cannot be created.
fn log_writer(path: &Path) -> BoxMakeWriter {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    }
}

fn init_tracing() {
    // stdout belongs to the terminal UI, so logs go to a file.
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(log_writer(&default_log_path()))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("menubar").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("menubar.json");
        std::fs::write(&path, r#"{"overflow_label":"Extra","items":[{"label":"A"}]}"#).expect("write");
        let path_str = path.to_string_lossy().to_string();

        let cli = parse(&["--config", path_str.as_str(), "--overflow-label", "Más", "--no-overflow", "--item", "X", "--item", "Y"]);
        let config = cli.resolve_config().expect("config");
        assert_eq!(config.overflow_label, "Más");
        assert!(!config.overflow_enabled);
        let labels: Vec<_> = config.items.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["X", "Y"]);
    }

    #[test]
    fn empty_config_falls_back_to_demo_items() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");
        temp_env::with_var("MENUBAR_CONFIG_PATH", Some(path.as_os_str()), || {
            let config = parse(&[]).resolve_config().expect("config");
            assert_eq!(config.items.len(), DEMO_ITEMS.len());
            assert_eq!(config.overflow_label, "More");
        });
    }

    #[test]
    fn log_path_honors_env_override() {
        temp_env::with_var(LOG_PATH_ENV, Some("/tmp/menubar-test.log"), || {
            assert_eq!(default_log_path(), PathBuf::from("/tmp/menubar-test.log"));
        });
    }
}
