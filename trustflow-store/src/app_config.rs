use serde::Deserialize;
use std::env;
use trustflow_order::CommissionRates;
use trustflow_risk::RiskThresholds;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineRules,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Operator-tunable decision parameters. None of these are engine constants:
/// commission rates, risk cutoffs and the auto-release policy all come from
/// configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EngineRules {
    pub commission_rates: CommissionRates,
    pub risk_thresholds: RiskThresholds,
    pub auto_release_without_escrow: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration file; every key has a serde default, so a
            // missing file still yields a runnable config.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `TRUSTFLOW__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("TRUSTFLOW").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_schedule() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.engine.commission_rates.bronze, 5.0);
        assert_eq!(cfg.engine.commission_rates.silver, 4.0);
        assert_eq!(cfg.engine.commission_rates.gold, 3.0);
        assert!(cfg.engine.commission_rates.platinum.is_none());
        assert_eq!(cfg.engine.risk_thresholds.low, 80.0);
        assert_eq!(cfg.engine.risk_thresholds.medium, 50.0);
        assert_eq!(cfg.engine.risk_thresholds.high, 35.0);
        assert!(!cfg.engine.auto_release_without_escrow);
    }
}
