pub mod commands;
pub mod market;

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use cinder_core::{
    ComparablesQuery, Discount, EngineConfig, SessionConfig, ValuationError,
};

pub const DEFAULT_CONFIG_PATH: &str = "cinder.toml";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CinderConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub probe: ProbeSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub market: MarketSection,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Annealing,
    Probe,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub timescale: u32,
    pub initial_increment: f64,
    pub minimum_increment: f64,
    pub min_observations: usize,
    pub resume_from: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            timescale: defaults.timescale,
            initial_increment: defaults.initial_increment,
            minimum_increment: defaults.minimum_increment,
            min_observations: defaults.min_observations,
            resume_from: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSection {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    pub comparables: usize,
    pub include_pending: bool,
    pub discount: f64,
    pub halt_on_failure: bool,
    pub rounds: usize,
    pub seed: Option<u64>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            comparables: 10,
            include_pending: false,
            discount: 1.0,
            halt_on_failure: false,
            rounds: 50,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MarketSection {
    pub users: u64,
    pub base_price: f64,
    pub price_spread: f64,
    pub purchase_revenue: f64,
    pub seed: u64,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            users: 200,
            base_price: 4.0,
            price_spread: 2.0,
            purchase_revenue: 10.96,
            seed: 13,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse toml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<CinderConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: CinderConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(config)
}

/// Command-line values that win over the config file.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunOverrides {
    pub rounds: Option<usize>,
    pub seed: Option<u64>,
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunPlan {
    pub strategy: StrategyKind,
    pub rounds: usize,
    pub seed: Option<u64>,
}

pub fn resolve_run(config: &CinderConfig, overrides: RunOverrides) -> RunPlan {
    RunPlan {
        strategy: overrides.strategy.unwrap_or(config.strategy),
        rounds: overrides.rounds.unwrap_or(config.session.rounds),
        seed: overrides.seed.or(config.session.seed),
    }
}

impl CinderConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            timescale: self.engine.timescale,
            initial_increment: self.engine.initial_increment,
            minimum_increment: self.engine.minimum_increment,
            min_observations: self.engine.min_observations,
        }
    }

    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig {
            comparables: ComparablesQuery {
                k: self.session.comparables,
                include_pending: self.session.include_pending,
            },
            discount: Discount::new(self.session.discount)?,
            halt_on_failure: self.session.halt_on_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_example_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("cinder.example.toml");
        let config = load_config(path).expect("should parse example config");

        assert_eq!(config.strategy, StrategyKind::Annealing);
        assert_eq!(config.engine.timescale, 500);
        assert_eq!(config.engine.initial_increment, 0.5);
        assert_eq!(config.session.comparables, 10);
        assert_eq!(config.session.seed, Some(7));
        assert_eq!(config.market.users, 200);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config: CinderConfig = toml::from_str("strategy = \"probe\"").expect("minimal config");
        assert_eq!(config.strategy, StrategyKind::Probe);
        assert_eq!(config.engine.timescale, 500);
        assert_eq!(config.engine.minimum_increment, 0.001);
        assert_eq!(config.session.rounds, 50);
        assert_eq!(config.probe.upper, 10.0);
    }

    #[test]
    fn overrides_win_over_config() {
        let config: CinderConfig = toml::from_str("").expect("empty config");
        let plan = resolve_run(
            &config,
            RunOverrides {
                rounds: Some(5),
                seed: Some(99),
                strategy: Some(StrategyKind::Probe),
            },
        );
        assert_eq!(plan.rounds, 5);
        assert_eq!(plan.seed, Some(99));
        assert_eq!(plan.strategy, StrategyKind::Probe);

        let plan = resolve_run(&config, RunOverrides::default());
        assert_eq!(plan.rounds, 50);
        assert_eq!(plan.seed, None);
        assert_eq!(plan.strategy, StrategyKind::Annealing);
    }

    #[test]
    fn rejects_out_of_range_discount() {
        let config: CinderConfig =
            toml::from_str("[session]\ndiscount = 1.5").expect("parses structurally");
        assert!(config.session_config().is_err());
    }
}
