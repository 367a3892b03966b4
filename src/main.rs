// SPDX-License-Identifier: GPL-3.0-only

//! emoji-popup simulator
//!
//! Replays a scripted scenario of host callbacks and user intents against a
//! headless popup and prints every collaborator call it produced.
//!
//! Usage: `emoji-popup-sim <scenario.json> [config.json]`

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use emoji_popup::app_settings;
use emoji_popup::scenario::Scenario;
use emoji_popup::{HeightCache, PopupConfig, PopupResult};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("emoji_popup=info".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(scenario_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: emoji-popup-sim <scenario.json> [config.json]");
        return ExitCode::from(2);
    };
    let config_path = args.next().map(PathBuf::from);

    // Single UI thread: the popup never leaves the thread it was built on.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(simulate(scenario_path, config_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn simulate(scenario_path: PathBuf, config_path: Option<PathBuf>) -> PopupResult<()> {
    let config = match config_path {
        Some(path) => PopupConfig::load(path)?,
        None => PopupConfig::default(),
    };
    let scenario = Scenario::load(&scenario_path)?;

    let cache_path = config
        .height_cache_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(app_settings::HEIGHT_CACHE_FILE));
    let cache = Rc::new(HeightCache::load(&cache_path)?);

    tracing::info!(
        "Replaying {} step(s) from {}",
        scenario.steps.len(),
        scenario_path.display()
    );
    let host = scenario.host();
    let popup = scenario.play(&host, cache.clone(), &config).await?;

    for call in host.recorder.calls() {
        println!("{}", call);
    }
    println!(
        "final: {:?}, overlay {:?}, keyboard {:?}",
        popup.overlay_state(),
        popup.overlay_size(),
        popup.keyboard_state()
    );

    cache.save(&cache_path)?;
    Ok(())
}
