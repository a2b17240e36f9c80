//! Loading of session configuration from TOML files and command-line flags.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use geocoin_world::config::Config;
use tracing::{debug, info};

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Values supplied on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) random_seed: bool,
    pub(crate) radius: Option<u32>,
    pub(crate) tile_degrees: Option<f64>,
    pub(crate) spawn_probability: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    world: Config,
}

/// Builds the session configuration from an optional file plus overrides.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let base = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| {
                format!("failed to read configuration file at {}", path.display())
            })?;
            let config = parse(&contents)
                .with_context(|| format!("invalid configuration file {}", path.display()))?;
            info!(path = %path.display(), "loaded configuration file");
            config
        }
        None => Config::default(),
    };

    let config = apply_overrides(base, overrides);
    config
        .validate()
        .context("configuration rejected by the world")?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn parse(contents: &str) -> Result<Config> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported configuration version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    Ok(file.world)
}

fn apply_overrides(mut config: Config, overrides: Overrides) -> Config {
    if let Some(seed) = overrides.seed {
        config.luck_seed = seed;
    }
    if overrides.random_seed {
        config.luck_seed = rand::random();
        info!(seed = config.luck_seed, "picked a random luck seed");
    }
    if let Some(radius) = overrides.radius {
        config.neighborhood_radius = radius;
    }
    if let Some(tile_degrees) = overrides.tile_degrees {
        config.tile_degrees = tile_degrees;
    }
    if let Some(spawn_probability) = overrides.spawn_probability {
        config.spawn_probability = spawn_probability;
    }
    config
}
