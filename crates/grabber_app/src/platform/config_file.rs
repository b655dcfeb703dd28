use std::fs;
use std::path::Path;

use anyhow::Context;
use engine_logging::engine_info;
use grabber_engine::{EngineConfig, ProxyEndpoint, SchedulePolicy};

use crate::FetchArgs;

/// Reads a RON engine config; missing fields keep their defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("parsing config {}", path.display()))?;
    engine_info!("loaded engine config from {}", path.display());
    Ok(config)
}

pub fn parse(content: &str) -> Result<EngineConfig, ron::error::SpannedError> {
    ron::from_str(content)
}

/// Command-line flags take precedence over the file.
pub fn apply_overrides(mut config: EngineConfig, args: &FetchArgs) -> EngineConfig {
    if let Some(limit) = args.concurrency {
        config.schedule = SchedulePolicy::Ceiling { limit };
    }
    if let Some(size) = args.window {
        config.schedule = SchedulePolicy::Windowed { size };
    }
    if args.no_render {
        config.rendered_fallback = false;
    }
    config.proxies.extend(
        args.relays
            .iter()
            .map(|relay| ProxyEndpoint::Relay(relay.clone())),
    );
    config
}
