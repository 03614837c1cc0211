use log::warn;
use once_cell::sync::OnceCell;
use serde_derive::Deserialize;
use std::sync::Mutex;

use crate::engine::pricing::PriceModel;

static INSTANCE: OnceCell<Mutex<RuntimeConfig>> = OnceCell::new();

pub fn instance() -> &'static Mutex<RuntimeConfig> {
    INSTANCE.get_or_init(|| Mutex::new(RuntimeConfig::new()))
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PriceConfig {
    pub drift: f64,
    pub volatility: f64,
    pub impact_factor: f64,
    pub tick_interval_ms: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        PriceConfig {
            drift: 0.0001,
            volatility: 0.005,
            impact_factor: 0.01,
            tick_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub symbols: Vec<String>,
    pub order_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            enabled: true,
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOG".to_string()],
            order_interval_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RuntimeConfig {
    pub metrics_addr: String,
    pub cycle_interval_ms: u64,
    pub price: PriceConfig,
    pub simulation: SimulationConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig::new()
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        RuntimeConfig {
            metrics_addr: "0.0.0.0:4010".to_string(),
            cycle_interval_ms: 5000,
            price: PriceConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    pub fn from_toml(path: &str) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file, {:?}",
                    e
                );
                return Some(RuntimeConfig::new());
            }
        };
        let config: RuntimeConfig = match toml::from_str(&contents) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file, {:?}",
                    e
                );
                return Some(RuntimeConfig::new());
            }
        };
        *instance().lock().unwrap() = config.clone();
        Some(config)
    }

    pub fn price_model(&self) -> PriceModel {
        PriceModel {
            drift: self.price.drift,
            volatility: self.price.volatility,
            impact_factor: self.price.impact_factor,
        }
    }
}
