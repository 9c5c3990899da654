//! Analytics configuration.
//!
//! Every numeric threshold that governs severity, confidence, or window
//! boundaries lives here under a name, so analyzers and tests share one
//! source of truth. Defaults are compiled in; a TOML file can override any
//! subset of fields.

use std::path::{Path, PathBuf};
use std::{env, fs};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a config file, consulted when no explicit
/// path is given.
pub const CONFIG_ENV_VAR: &str = "SHOPLENS_CONFIG";
/// Config file picked up from the working directory when neither an
/// explicit path nor [`CONFIG_ENV_VAR`] points elsewhere.
pub const DEFAULT_CONFIG_FILE: &str = "Shoplens.toml";

/// Lower edge of the reorder-due window, in days before the expected
/// reorder date.
pub const DUE_WINDOW_EARLY_DAYS: f64 = 2.0;
/// Upper edge of the reorder-due window, in days past the expected date.
/// Asymmetric on purpose: the window privileges recall over precision.
pub const DUE_WINDOW_LATE_DAYS: f64 = 7.0;
/// Lifetime spend at which a customer counts as VIP without a tier label.
pub const HIGH_VALUE_SPEND: i64 = 10_000;

/// Minimum lifetime spend before churn interventions are worth triggering.
pub const CHURN_MIN_LIFETIME_SPEND: i64 = 1_000;
/// Days overdue past which a customer is churn-risk rather than merely due.
/// Deliberately stricter than [`DUE_WINDOW_LATE_DAYS`]; the two windows are
/// kept distinct, not reconciled.
pub const CHURN_OVERDUE_DAYS: f64 = 7.0;
/// Days overdue past which churn severity escalates to high.
pub const CHURN_HIGH_OVERDUE_DAYS: f64 = 30.0;
/// Fraction of lifetime spend counted as at risk; churn is probabilistic,
/// not certain loss.
pub const CHURN_AT_RISK_FRACTION_PCT: i64 = 30;
pub const CHURN_MAX_RESULTS: usize = 10;

/// Co-occurrence count below which a pair is coincidence, not affinity.
pub const AFFINITY_MIN_PAIR_COUNT: u32 = 2;
pub const AFFINITY_MEDIUM_COUNT: u32 = 5;
pub const AFFINITY_HIGH_COUNT: u32 = 10;
pub const AFFINITY_MAX_PAIRS: usize = 10;

/// Candidate bundle discount rates, percent.
pub const BUNDLE_DISCOUNT_RATES_PCT: [i64; 3] = [5, 10, 15];
/// Rate surfaced when no candidate rate is profitable.
pub const BUNDLE_FALLBACK_RATE_PCT: i64 = 10;
/// Profitability floor for a bundle: margin must stay at or above this.
pub const BUNDLE_MIN_MARGIN_PCT: f64 = 15.0;

/// Unit margin below which a product leaks profit.
pub const LOW_MARGIN_PCT: f64 = 20.0;
/// Unit margin at or below which the leak is severe.
pub const SEVERE_MARGIN_PCT: f64 = 10.0;
/// Target margin used when suggesting a corrective price.
pub const TARGET_MARGIN_PCT: f64 = 30.0;
/// Softer corrective target for severely under-priced products.
pub const SEVERE_TARGET_MARGIN_PCT: f64 = 25.0;
/// Trailing window for discount-overuse analysis.
pub const DISCOUNT_WINDOW_DAYS: i64 = 30;
/// Discounted-order share above which overuse is high severity.
pub const DISCOUNT_HIGH_SHARE: f64 = 0.5;
pub const DISCOUNT_MEDIUM_SHARE: f64 = 0.3;
/// Trailing window for sales-velocity checks.
pub const VELOCITY_WINDOW_DAYS: i64 = 60;
/// Units sold within the velocity window at or below which stock is dead.
pub const DEAD_STOCK_MAX_UNITS: u64 = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    pub cycle: CycleConfig,
    pub churn: ChurnConfig,
    pub affinity: AffinityConfig,
    pub bundle: BundleConfig,
    pub leakage: LeakageConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    pub due_window_early_days: f64,
    pub due_window_late_days: f64,
    pub high_value_spend: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChurnConfig {
    pub min_lifetime_spend: Decimal,
    pub overdue_after_days: f64,
    pub high_severity_after_days: f64,
    pub at_risk_fraction: Decimal,
    pub max_results: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AffinityConfig {
    pub min_pair_count: u32,
    pub medium_count: u32,
    pub high_count: u32,
    pub max_pairs: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Percentages, e.g. `[5, 10, 15]`.
    pub discount_rates_pct: Vec<Decimal>,
    pub fallback_rate_pct: Decimal,
    pub min_margin_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeakageConfig {
    pub low_margin_pct: f64,
    pub severe_margin_pct: f64,
    pub target_margin_pct: f64,
    pub severe_target_margin_pct: f64,
    pub discount_window_days: i64,
    pub discount_high_share: f64,
    pub discount_medium_share: f64,
    pub velocity_window_days: i64,
    pub dead_stock_max_units: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            due_window_early_days: DUE_WINDOW_EARLY_DAYS,
            due_window_late_days: DUE_WINDOW_LATE_DAYS,
            high_value_spend: Decimal::from(HIGH_VALUE_SPEND),
        }
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            min_lifetime_spend: Decimal::from(CHURN_MIN_LIFETIME_SPEND),
            overdue_after_days: CHURN_OVERDUE_DAYS,
            high_severity_after_days: CHURN_HIGH_OVERDUE_DAYS,
            at_risk_fraction: Decimal::new(CHURN_AT_RISK_FRACTION_PCT, 2),
            max_results: CHURN_MAX_RESULTS,
        }
    }
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self {
            min_pair_count: AFFINITY_MIN_PAIR_COUNT,
            medium_count: AFFINITY_MEDIUM_COUNT,
            high_count: AFFINITY_HIGH_COUNT,
            max_pairs: AFFINITY_MAX_PAIRS,
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            discount_rates_pct: BUNDLE_DISCOUNT_RATES_PCT.iter().map(|p| Decimal::from(*p)).collect(),
            fallback_rate_pct: Decimal::from(BUNDLE_FALLBACK_RATE_PCT),
            min_margin_pct: BUNDLE_MIN_MARGIN_PCT,
        }
    }
}

impl Default for LeakageConfig {
    fn default() -> Self {
        Self {
            low_margin_pct: LOW_MARGIN_PCT,
            severe_margin_pct: SEVERE_MARGIN_PCT,
            target_margin_pct: TARGET_MARGIN_PCT,
            severe_target_margin_pct: SEVERE_TARGET_MARGIN_PCT,
            discount_window_days: DISCOUNT_WINDOW_DAYS,
            discount_high_share: DISCOUNT_HIGH_SHARE,
            discount_medium_share: DISCOUNT_MEDIUM_SHARE,
            velocity_window_days: VELOCITY_WINDOW_DAYS,
            dead_stock_max_units: DEAD_STOCK_MAX_UNITS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl AnalyticsConfig {
    /// Compiled-in defaults, file overrides applied on top. The file is
    /// the explicit `path` when given, otherwise whatever
    /// [`CONFIG_ENV_VAR`] names, otherwise [`DEFAULT_CONFIG_FILE`] in the
    /// working directory when present. The file may override any subset of
    /// fields.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(discovered_path);
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| Err(ConfigError::Invalid(message.to_string()));

        if self.cycle.due_window_early_days < 0.0 || self.cycle.due_window_late_days < 0.0 {
            return invalid("cycle due window edges must be non-negative");
        }
        if self.churn.at_risk_fraction <= Decimal::ZERO || self.churn.at_risk_fraction > Decimal::ONE
        {
            return invalid("churn.at_risk_fraction must be in (0, 1]");
        }
        if self.churn.high_severity_after_days < self.churn.overdue_after_days {
            return invalid("churn.high_severity_after_days must be >= churn.overdue_after_days");
        }
        if self.affinity.min_pair_count < 2 {
            return invalid("affinity.min_pair_count below 2 admits coincidental co-purchases");
        }
        if self.affinity.medium_count > self.affinity.high_count {
            return invalid("affinity.medium_count must not exceed affinity.high_count");
        }
        if self.bundle.discount_rates_pct.is_empty() {
            return invalid("bundle.discount_rates_pct must not be empty");
        }
        let hundred = Decimal::from(100);
        for rate in &self.bundle.discount_rates_pct {
            if *rate <= Decimal::ZERO || *rate >= hundred {
                return invalid("bundle discount rates must be within (0, 100) percent");
            }
        }
        if self.bundle.fallback_rate_pct <= Decimal::ZERO || self.bundle.fallback_rate_pct >= hundred
        {
            return invalid("bundle.fallback_rate_pct must be within (0, 100) percent");
        }
        if self.leakage.severe_margin_pct > self.leakage.low_margin_pct {
            return invalid("leakage.severe_margin_pct must not exceed leakage.low_margin_pct");
        }
        if self.leakage.discount_medium_share > self.leakage.discount_high_share {
            return invalid("leakage.discount_medium_share must not exceed discount_high_share");
        }
        if self.leakage.discount_window_days <= 0 || self.leakage.velocity_window_days <= 0 {
            return invalid("leakage windows must be positive day counts");
        }
        Ok(())
    }
}

/// A non-empty [`CONFIG_ENV_VAR`] always names the file, even if it does
/// not exist; a missing file named by the operator is an error surfaced by
/// `load`, not silently skipped. The working-directory default applies
/// only when present.
fn discovered_path() -> Option<PathBuf> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.is_file().then(|| default.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{AnalyticsConfig, ConfigError, CONFIG_ENV_VAR};

    #[test]
    fn defaults_are_valid() {
        AnalyticsConfig::default().validate().expect("default config");
    }

    #[test]
    fn toml_overrides_a_subset_of_fields() {
        let config = AnalyticsConfig::from_toml_str(
            r#"
            [churn]
            max_results = 5

            [bundle]
            discount_rates_pct = [5, 20]
            "#,
        )
        .expect("parse overrides");

        assert_eq!(config.churn.max_results, 5);
        assert_eq!(config.bundle.discount_rates_pct, vec![Decimal::from(5), Decimal::from(20)]);
        // Untouched sections keep their defaults.
        assert_eq!(config.affinity.high_count, 10);
        config.validate().expect("overridden config is still valid");
    }

    #[test]
    fn invalid_at_risk_fraction_is_rejected() {
        let mut config = AnalyticsConfig::default();
        config.churn.at_risk_fraction = Decimal::from(2);

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let result = AnalyticsConfig::from_toml_str("[cycle]\nno_such_knob = 1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // Env precedence assertions share one test; only this test touches the
    // process environment, so parallel test threads cannot interleave on it.
    #[test]
    fn environment_names_the_config_file_unless_a_path_is_explicit() {
        let dir = std::env::temp_dir();
        let env_file = dir.join(format!("shoplens-env-{}.toml", std::process::id()));
        let explicit_file = dir.join(format!("shoplens-explicit-{}.toml", std::process::id()));
        std::fs::write(&env_file, "[churn]\nmax_results = 3\n").expect("write env config");
        std::fs::write(&explicit_file, "[churn]\nmax_results = 7\n").expect("write explicit config");

        std::env::set_var(CONFIG_ENV_VAR, &env_file);
        let from_env = AnalyticsConfig::load(None).expect("load via env var");
        let from_path =
            AnalyticsConfig::load(Some(explicit_file.as_path())).expect("load explicit path");

        std::env::set_var(CONFIG_ENV_VAR, dir.join("no-such-shoplens.toml"));
        let missing = AnalyticsConfig::load(None);

        std::env::remove_var(CONFIG_ENV_VAR);
        let defaults = AnalyticsConfig::load(None).expect("load defaults");
        let _ = std::fs::remove_file(&env_file);
        let _ = std::fs::remove_file(&explicit_file);

        assert_eq!(from_env.churn.max_results, 3);
        // An explicit path wins over the environment.
        assert_eq!(from_path.churn.max_results, 7);
        // A file the operator named must exist.
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
        assert_eq!(defaults, AnalyticsConfig::default());
    }
}
