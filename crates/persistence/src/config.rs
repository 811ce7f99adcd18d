//! Store configuration.
//!
//! Configuration is read from environment variables. Credentials fall back to
//! literal placeholders when unset; they are not checked here, only handed to
//! the store's authentication step.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CLOUDANT_ID` | `<cloudant_id>` | Account identifier |
//! | `CLOUDANT_IAM_APIKEY` | `<cloudant_apikey>` | IAM API key |
//! | `CLOUDANT_URL` | `https://{account}.cloudant.com` | Store base URL |
//! | `CLOUDANT_IAM_TOKEN_URL` | `https://iam.cloud.ibm.com/identity/token` | IAM token endpoint |
//! | `BLASTER_DONOR_COLLECTION` | `blaster_db` | Donor collection name |
//! | `BLASTER_LEDGER_COLLECTION` | `blockchain_db` | Ledger collection name |
//! | `BLASTER_LOG_LEVEL` | `info` | Log level |
//!
//! # Example
//!
//! ```rust
//! use blaster_persistence::config::StoreConfig;
//!
//! let config = StoreConfig {
//!     account: "my-account".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(config.base_url(), "https://my-account.cloudant.com");
//! ```

use std::fmt;
use std::str::FromStr;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::util::TryInitError;

/// Placeholder used when `CLOUDANT_ID` is unset.
pub const PLACEHOLDER_ACCOUNT: &str = "<cloudant_id>";

/// Placeholder used when `CLOUDANT_IAM_APIKEY` is unset.
pub const PLACEHOLDER_API_KEY: &str = "<cloudant_apikey>";

/// Default IBM Cloud IAM token endpoint.
pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Default name of the donor collection.
pub const DEFAULT_DONOR_COLLECTION: &str = "blaster_db";

/// Default name of the ledger collection.
pub const DEFAULT_LEDGER_COLLECTION: &str = "blockchain_db";

/// Document store configuration.
#[derive(Clone, Parser)]
#[command(name = "blaster-persistence")]
#[command(about = "Blaster document store settings")]
pub struct StoreConfig {
    /// Account identifier.
    #[arg(long, env = "CLOUDANT_ID", default_value = PLACEHOLDER_ACCOUNT)]
    pub account: String,

    /// IAM API key.
    #[arg(long, env = "CLOUDANT_IAM_APIKEY", default_value = PLACEHOLDER_API_KEY)]
    pub api_key: String,

    /// Base URL of the store. Derived from the account when unset.
    #[arg(long, env = "CLOUDANT_URL")]
    pub url: Option<String>,

    /// IAM token endpoint.
    #[arg(long, env = "CLOUDANT_IAM_TOKEN_URL", default_value = DEFAULT_IAM_TOKEN_URL)]
    pub iam_token_url: String,

    /// Donor collection name.
    #[arg(long, env = "BLASTER_DONOR_COLLECTION", default_value = DEFAULT_DONOR_COLLECTION)]
    pub donor_collection: String,

    /// Ledger collection name.
    #[arg(long, env = "BLASTER_LEDGER_COLLECTION", default_value = DEFAULT_LEDGER_COLLECTION)]
    pub ledger_collection: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "BLASTER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            account: PLACEHOLDER_ACCOUNT.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            url: None,
            iam_token_url: DEFAULT_IAM_TOKEN_URL.to_string(),
            donor_collection: DEFAULT_DONOR_COLLECTION.to_string(),
            ledger_collection: DEFAULT_LEDGER_COLLECTION.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("account", &self.account)
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .field("iam_token_url", &self.iam_token_url)
            .field("donor_collection", &self.donor_collection)
            .field("ledger_collection", &self.ledger_collection)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl StoreConfig {
    /// Reads the configuration from the environment.
    ///
    /// Process arguments are ignored. If any variable cannot be read, the
    /// error is logged and every value falls back to its default.
    pub fn from_env() -> Self {
        match Self::try_parse_from([env!("CARGO_PKG_NAME")]) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Unreadable store configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Returns the log filter directive for [`log_level`](Self::log_level).
    pub fn log_filter(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.log_level.trim())
    }

    /// Installs the global log subscriber at the configured level.
    ///
    /// See [`crate::init_logging`]. Fails if a subscriber is already set.
    pub fn init_logging(&self) -> Result<(), TryInitError> {
        crate::init_logging(&self.log_filter())
    }

    /// Returns the store's base URL.
    pub fn base_url(&self) -> String {
        match &self.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.cloudant.com", self.account),
        }
    }

    /// Returns the account credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            account: self.account.clone(),
            api_key: self.api_key.clone(),
        }
    }

    /// Returns `true` if either credential is still a placeholder.
    pub fn uses_placeholder_credentials(&self) -> bool {
        self.account == PLACEHOLDER_ACCOUNT || self.api_key == PLACEHOLDER_API_KEY
    }

    /// Validates the configuration and returns errors if any.
    ///
    /// Credentials are deliberately not checked.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (label, name) in [
            ("donor collection", &self.donor_collection),
            ("ledger collection", &self.ledger_collection),
        ] {
            if let Err(message) = validate_collection_name(name) {
                errors.push(format!("Invalid {} name '{}': {}", label, name, message));
            }
        }

        if self.donor_collection == self.ledger_collection {
            errors.push("Donor and ledger collections must differ".to_string());
        }

        if let Some(url) = &self.url {
            let lower = url.trim().to_ascii_lowercase();
            if !lower.starts_with("http://") && !lower.starts_with("https://") {
                errors.push("Store URL must start with http:// or https://".to_string());
            }
        }

        if LevelFilter::from_str(self.log_level.trim()).is_err() {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Account identifier and API key used to authenticate with the store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account identifier.
    pub account: String,
    /// IAM API key.
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Checks a collection name against the store's database naming rules:
/// a lowercase letter followed by lowercase letters, digits or `_$()+-/`.
pub fn validate_collection_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("name is empty".to_string()),
        Some(c) if !c.is_ascii_lowercase() => {
            return Err("name must start with a lowercase letter".to_string());
        }
        Some(_) => {}
    }

    if name.len() > 238 {
        return Err("name is longer than 238 characters".to_string());
    }

    if let Some(bad) = chars.find(|c| {
        !(c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+-/".contains(*c))
    }) {
        return Err(format!("character '{}' is not allowed", bad));
    }

    Ok(())
}
