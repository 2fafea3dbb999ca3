// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless map driver demo.
//!
//! Runs a scripted session against the mock engine: the mount element
//! appears after a delay, features are added and clicked, an overlay is
//! shown and a short location track is followed. Everything observable is
//! logged through `tracing`; set `RUST_LOG=debug` for per-command detail.

mod demo;
mod fs_store;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use map_driver::{
    ConfigService, DriverOptions, FillConfig, ImageConfig, LayerConfig, StrokeConfig,
    StyleConfig, TextConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::demo::DemoPlan;
use crate::fs_store::FsConfigStore;

const CONFIG_KEY: &str = "map_driver";

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless map driver demo on the mock engine")]
struct Args {
    /// Driver options JSON file. Falls back to the saved config, then to built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Persist the resolved options to the user config directory.
    #[arg(long)]
    save_config: bool,
    /// Delay before the mount element appears, in milliseconds.
    #[arg(long, default_value_t = 50)]
    mount_delay_ms: u64,
    /// Number of features to add and click.
    #[arg(long, default_value_t = 3)]
    features: usize,
    /// Number of location fixes to stream.
    #[arg(long, default_value_t = 5)]
    fixes: usize,
    /// Ignore track-location commands.
    #[arg(long)]
    no_location_dot: bool,
}

fn default_options() -> DriverOptions {
    let pin = StyleConfig {
        image: Some(ImageConfig {
            kind: Some("circle".into()),
            radius: Some(6.0),
            fill: Some(FillConfig {
                color: Some("#d33".into()),
            }),
            stroke: Some(StrokeConfig {
                color: Some("#fff".into()),
                width: Some(2.0),
            }),
            ..ImageConfig::default()
        }),
        text: Some(TextConfig {
            font: Some("12px sans-serif".into()),
            text_baseline: Some("bottom".into()),
            ..TextConfig::default()
        }),
    };
    DriverOptions::new("#map")
        .with_layer("pins", LayerConfig::vector(vec![pin]))
        .with_overlay("#popup")
        .with_control("#locate")
}

fn resolve_options(args: &Args) -> Result<DriverOptions> {
    if let Some(path) = &args.config {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        return DriverOptions::from_json(&bytes)
            .with_context(|| format!("parsing {}", path.display()));
    }
    let saved = FsConfigStore::new()
        .map(ConfigService::new)
        .ok()
        .and_then(|config| match config.load_options(CONFIG_KEY) {
            Ok(options) => options,
            Err(err) => {
                warn!(%err, "ignoring unusable saved config");
                None
            }
        });
    Ok(saved.unwrap_or_else(default_options))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut options = resolve_options(&args)?;
    if args.no_location_dot {
        options.show_location_dot = false;
    }
    if args.save_config {
        let store = FsConfigStore::new().context("resolving config dir")?;
        let base = store.base().display().to_string();
        ConfigService::new(store)
            .save(CONFIG_KEY, &options)
            .context("saving config")?;
        info!(dir = %base, "config saved");
    }

    let report = demo::run(
        options,
        DemoPlan {
            mount_delay: Duration::from_millis(args.mount_delay_ms),
            features: args.features,
            fixes: args.fixes,
        },
    )
    .await?;
    info!(
        maps = report.maps_created,
        features = report.features,
        events = report.events,
        feature_hits = report.feature_hits,
        empty_hits = report.empty_hits,
        location_features = report.location_features,
        tracked = ?report.tracked_point,
        "demo finished"
    );
    Ok(())
}
