//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ledger posting configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Tax configuration.
    pub tax: TaxConfig,
    /// Retry policy for concurrency conflicts.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Ledger posting configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Chart-of-accounts codes used by the posting templates.
    #[serde(default)]
    pub accounts: AccountCodes,
}

/// Chart-of-accounts codes for every account a posting template may touch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountCodes {
    /// Cash / bank.
    pub cash: String,
    /// Accounts receivable (customers).
    pub receivable: String,
    /// Inventory on hand.
    pub inventory: String,
    /// Input CGST recoverable.
    pub input_cgst: String,
    /// Input SGST recoverable.
    pub input_sgst: String,
    /// Input IGST recoverable.
    pub input_igst: String,
    /// Accounts payable (vendors).
    pub payable: String,
    /// Output CGST payable.
    pub output_cgst: String,
    /// Output SGST payable.
    pub output_sgst: String,
    /// Output IGST payable.
    pub output_igst: String,
    /// Sales revenue.
    pub sales: String,
    /// Sales returns (contra revenue).
    pub sales_returns: String,
    /// Cost of goods sold.
    pub cost_of_goods_sold: String,
    /// Purchases of non-stock goods and services.
    pub purchases: String,
    /// Purchase returns.
    pub purchase_returns: String,
    /// Stock adjustment gains and losses.
    pub stock_adjustment: String,
}

impl Default for AccountCodes {
    fn default() -> Self {
        Self {
            cash: "1100".to_string(),
            receivable: "1200".to_string(),
            inventory: "1300".to_string(),
            input_cgst: "1410".to_string(),
            input_sgst: "1420".to_string(),
            input_igst: "1430".to_string(),
            payable: "2100".to_string(),
            output_cgst: "2310".to_string(),
            output_sgst: "2320".to_string(),
            output_igst: "2330".to_string(),
            sales: "4100".to_string(),
            sales_returns: "4200".to_string(),
            cost_of_goods_sold: "5100".to_string(),
            purchases: "5200".to_string(),
            purchase_returns: "5300".to_string(),
            stock_adjustment: "5400".to_string(),
        }
    }
}

/// Tax configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
    /// The organization's own tax jurisdiction (e.g. a GST state code).
    pub home_jurisdiction: String,
}

/// Bounded exponential backoff for retrying conflicting transitions.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for a single delay in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    25
}

fn default_max_backoff_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BAHI").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
