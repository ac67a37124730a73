//! Configuration for the architecture CLI

use std::path::PathBuf;

use core_config::gateway::GatewayConfig;
use core_config::{Environment, FromEnv, env_optional, env_or_default};
use domain_architecture::DEFAULT_REGION;
use eyre::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    /// Region for nodes added without one
    pub default_region: String,
    /// Directory export files are written to unless `--out-dir` is given
    pub export_dir: PathBuf,
    /// Prometheus text file written after each run, when set
    pub metrics_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            environment: Environment::from_env(),
            gateway: GatewayConfig::from_env()?,
            default_region: env_or_default("DEFAULT_REGION", DEFAULT_REGION),
            export_dir: PathBuf::from(env_or_default("EXPORT_DIR", ".")),
            metrics_file: env_optional("METRICS_FILE").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "DEFAULT_REGION",
                "EXPORT_DIR",
                "METRICS_FILE",
                "ARCHITECTURE_API_URL",
                "ARCHITECTURE_API_TOKEN",
                "ARCHITECTURE_API_TIMEOUT_SECS",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.default_region, "us-east-1");
                assert_eq!(config.export_dir, PathBuf::from("."));
                assert_eq!(config.metrics_file, None);
                assert_eq!(config.gateway, GatewayConfig::default());
            },
        );
    }

    #[test]
    fn test_config_overrides() {
        temp_env::with_vars(
            [
                ("DEFAULT_REGION", Some("eu-west-1")),
                ("EXPORT_DIR", Some("/tmp/exports")),
                ("METRICS_FILE", Some("/var/lib/node_exporter/architecture.prom")),
                ("ARCHITECTURE_API_TIMEOUT_SECS", Some("10")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.default_region, "eu-west-1");
                assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
                assert_eq!(
                    config.metrics_file,
                    Some(PathBuf::from("/var/lib/node_exporter/architecture.prom"))
                );
                assert_eq!(config.gateway.timeout.as_secs(), 10);
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        temp_env::with_var("ARCHITECTURE_API_TIMEOUT_SECS", Some("never"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
