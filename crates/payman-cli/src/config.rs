//! Configuration file management.
//!
//! Settings come from a TOML file and may be overridden per field by
//! `PAYMAN_*` environment variables. The file is looked up at, in order:
//! the `--config` path, `$PAYMAN_HOME/config.toml`, `~/.payman/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use payman_payout::batch::DEFAULT_SUBMISSION_TIMEOUT_SECS;
use payman_payout::{BatchPolicy, PayoutParams};
use payman_types::{FeeRate, DEFAULT_GAS_LIMIT, DEFAULT_MAX_BATCH_SIZE, DEFAULT_NETWORK_FEE};

/// Complete payman configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymanConfig {
    /// What to pay out.
    #[serde(default)]
    pub payout: PayoutConfig,
    /// Fee, gas and batching.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Chain data source.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Payout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Delegate (baker) address. Required.
    #[serde(default)]
    pub delegate: String,
    /// Cycle to pay out. Can be overridden on the command line.
    #[serde(default)]
    pub cycle: u32,
    /// Delegate fee as a fraction, e.g. 0.05 for 5%.
    #[serde(default)]
    pub fee: f64,
    /// Minimum net reward (mutez) worth paying.
    #[serde(default)]
    pub payment_minimum: u64,
}

/// Network fee and batching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Fee per transfer in mutez.
    #[serde(default = "default_network_fee")]
    pub network_fee: u64,
    /// Gas limit per transfer.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Maximum transfers per operation group.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Per-injection timeout. 0 = wait indefinitely.
    #[serde(default = "default_submission_timeout")]
    pub submission_timeout_secs: u64,
}

/// Chain data source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Directory of `<delegate>/<cycle>.json` snapshots. Empty = `$PAYMAN_HOME/snapshots`.
    #[serde(default)]
    pub snapshot_dir: String,
    /// Spendable balance of the paying wallet in mutez. Unset = unchecked.
    #[serde(default)]
    pub wallet_balance: Option<u64>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network_fee() -> u64 {
    DEFAULT_NETWORK_FEE
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_submission_timeout() -> u64 {
    DEFAULT_SUBMISSION_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_fee: default_network_fee(),
            gas_limit: default_gas_limit(),
            max_batch_size: default_max_batch_size(),
            submission_timeout_secs: default_submission_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl PaymanConfig {
    /// Load configuration and apply environment overrides.
    ///
    /// An explicit `path` must exist. Otherwise the default location is
    /// used if present, and built-in defaults if not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply `PAYMAN_*` overrides, looking each key up through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(v) = lookup("PAYMAN_DELEGATE") {
            self.payout.delegate = v;
        }
        if let Some(v) = lookup("PAYMAN_CYCLE") {
            self.payout.cycle = v.parse().context("PAYMAN_CYCLE")?;
        }
        if let Some(v) = lookup("PAYMAN_FEE") {
            self.payout.fee = v.parse().context("PAYMAN_FEE")?;
        }
        if let Some(v) = lookup("PAYMAN_PAYMENT_MIN") {
            self.payout.payment_minimum = v.parse().context("PAYMAN_PAYMENT_MIN")?;
        }
        if let Some(v) = lookup("PAYMAN_NETWORK_FEE") {
            self.network.network_fee = v.parse().context("PAYMAN_NETWORK_FEE")?;
        }
        if let Some(v) = lookup("PAYMAN_GAS_LIMIT") {
            self.network.gas_limit = v.parse().context("PAYMAN_GAS_LIMIT")?;
        }
        if let Some(v) = lookup("PAYMAN_SNAPSHOT_DIR") {
            self.chain.snapshot_dir = v;
        }
        Ok(())
    }

    /// Check the settings needed to compute a payout.
    pub fn validate_payout(&self) -> anyhow::Result<()> {
        if self.payout.delegate.is_empty() {
            bail!("payout.delegate is required");
        }
        FeeRate::from_fraction(self.payout.fee)?;
        self.validate_network()
    }

    /// Check the settings needed to batch payments.
    pub fn validate_network(&self) -> anyhow::Result<()> {
        if self.network.max_batch_size == 0 {
            bail!("network.max_batch_size must be at least 1");
        }
        Ok(())
    }

    /// Payout parameters, optionally for a cycle other than the configured one.
    pub fn payout_params(&self, cycle: Option<u32>) -> anyhow::Result<PayoutParams> {
        Ok(PayoutParams {
            delegate: self.payout.delegate.clone(),
            cycle: cycle.unwrap_or(self.payout.cycle),
            fee: FeeRate::from_fraction(self.payout.fee)?,
            minimum_payout: self.payout.payment_minimum,
        })
    }

    /// Batch policy for the configured network settings.
    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            network_fee: self.network.network_fee,
            gas_limit: self.network.gas_limit,
            max_batch_size: self.network.max_batch_size,
            submission_timeout: match self.network.submission_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    /// Snapshot directory path.
    pub fn snapshot_dir(&self) -> PathBuf {
        if self.chain.snapshot_dir.is_empty() {
            Self::home_dir().join("snapshots")
        } else {
            PathBuf::from(&self.chain.snapshot_dir)
        }
    }

    fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    fn home_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("PAYMAN_HOME") {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".payman"))
            .unwrap_or_else(|_| PathBuf::from(".payman"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaymanConfig::default();
        assert_eq!(config.network.network_fee, 2941);
        assert_eq!(config.network.gas_limit, 26283);
        assert_eq!(config.network.max_batch_size, 100);
        assert_eq!(config.logging.log_level, "info");
        assert!(config.chain.wallet_balance.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = PaymanConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: PaymanConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[payout]\ndelegate = \"tz1baker\"\ncycle = 300\nfee = 0.08\n\n[network]\nmax_batch_size = 50"
        )
        .expect("write");

        let config = PaymanConfig::from_file(file.path()).expect("load");
        assert_eq!(config.payout.delegate, "tz1baker");
        assert_eq!(config.network.max_batch_size, 50);
        assert_eq!(config.network.network_fee, 2941);

        let params = config.payout_params(Some(301)).expect("params");
        assert_eq!(params.cycle, 301);
        assert_eq!(params.fee.ppm(), 80_000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PAYMAN_DELEGATE", "tz1other"),
            ("PAYMAN_CYCLE", "42"),
            ("PAYMAN_PAYMENT_MIN", "1000"),
            ("PAYMAN_GAS_LIMIT", "10300"),
        ]
        .into_iter()
        .collect();

        let mut config = PaymanConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .expect("overrides");
        assert_eq!(config.payout.delegate, "tz1other");
        assert_eq!(config.payout.cycle, 42);
        assert_eq!(config.payout.payment_minimum, 1000);
        assert_eq!(config.network.gas_limit, 10300);
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut config = PaymanConfig::default();
        let result = config.apply_overrides(|k| (k == "PAYMAN_CYCLE").then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = PaymanConfig::default();
        assert!(config.validate_payout().is_err());

        config.payout.delegate = "tz1baker".to_string();
        config.payout.fee = 1.5;
        assert!(config.validate_payout().is_err());

        config.payout.fee = 0.05;
        assert!(config.validate_payout().is_ok());

        config.network.max_batch_size = 0;
        assert!(config.validate_network().is_err());
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let mut config = PaymanConfig::default();
        assert_eq!(
            config.batch_policy().submission_timeout,
            BatchPolicy::default().submission_timeout
        );
        config.network.submission_timeout_secs = 0;
        assert_eq!(config.batch_policy().submission_timeout, None);
    }
}
