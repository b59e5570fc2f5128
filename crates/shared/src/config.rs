//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Pricing engine configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Pricing engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    /// Decimal places of every transmitted amount.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Two VAT rates closer than this are treated as the same rate.
    #[serde(default = "default_vat_rate_tolerance")]
    pub vat_rate_tolerance: Decimal,
    /// Backend result codes that reject an order because of its VAT mode.
    #[serde(default = "default_ambiguous_vat_mode_codes")]
    pub ambiguous_vat_mode_codes: Vec<String>,
}

fn default_decimal_places() -> u32 {
    2
}

fn default_vat_rate_tolerance() -> Decimal {
    Decimal::new(1, 9)
}

fn default_ambiguous_vat_mode_codes() -> Vec<String> {
    vec!["50036".to_string()]
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            vat_rate_tolerance: default_vat_rate_tolerance(),
            ambiguous_vat_mode_codes: default_ambiguous_vat_mode_codes(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `.env`, config files, and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default.toml`, `config/{RUN_MODE}.toml`, then `VATSPLIT__*`
    /// environment variables (e.g. `VATSPLIT__PRICING__DECIMAL_PLACES`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("VATSPLIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pricing.ambiguous_vat_mode_codes"),
            )
            .build()?;

        config.try_deserialize()
    }
}
