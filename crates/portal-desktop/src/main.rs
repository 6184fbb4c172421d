//! Portal Desktop - Main entry point
//!
//! Opens the portal scene in a native window, reading its configuration
//! from a TOML file and its assets from a local directory.

use anyhow::Result;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use clap::Parser;
use portal_core::config::save_default_config;
use portal_core::{load_config, PortalConfig};
use portal_scene::PortalScenePlugin;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Baked portal scene with fireflies and a live debug panel")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "portal.toml")]
    config: PathBuf,

    /// Directory the asset paths are relative to
    #[arg(short, long, default_value = "assets")]
    assets: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Hide the debug panel
    #[arg(long)]
    no_debug: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Load the configuration and apply command-line overrides
fn prepare_config(args: &Args) -> Result<PortalConfig> {
    let mut config = load_config(&args.config)?;

    // Override panel visibility if requested
    if args.no_debug {
        config.debug.enabled = false;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Portal v{}", env!("CARGO_PKG_VERSION"));

    if args.write_config {
        save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Default configuration written");
        return Ok(());
    }

    let config = prepare_config(&args)?;

    info!(
        model = %config.assets.model,
        fireflies = config.fireflies.count,
        debug = config.debug.enabled,
        "Configuration loaded"
    );

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: args.assets.clone(),
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Must come before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(PortalScenePlugin { config })
        .run();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(config: PathBuf, no_debug: bool) -> Args {
        Args {
            config,
            assets: "assets".to_string(),
            log_level: "info".to_string(),
            no_debug,
            write_config: false,
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["portal"]);
        assert_eq!(args.config, PathBuf::from("portal.toml"));
        assert_eq!(args.assets, "assets");
        assert!(!args.no_debug);

        let args = Args::parse_from(["portal", "--config", "x.toml", "--no-debug", "-l", "trace"]);
        assert_eq!(args.config, PathBuf::from("x.toml"));
        assert!(args.no_debug);
        assert_eq!(args.log_level, "trace");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = prepare_config(&args(dir.path().join("absent.toml"), false)).unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_no_debug_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = prepare_config(&args(dir.path().join("absent.toml"), true)).unwrap();
        assert!(!config.debug.enabled);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fireflies]\ncount = 0").unwrap();
        assert!(prepare_config(&args(file.path().to_path_buf(), false)).is_err());
    }

    #[test]
    fn test_non_finite_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fireflies]\nheight = inf").unwrap();
        let err = prepare_config(&args(file.path().to_path_buf(), true)).unwrap_err();
        assert!(err.to_string().contains("fireflies.height"), "{err}");
    }
}
