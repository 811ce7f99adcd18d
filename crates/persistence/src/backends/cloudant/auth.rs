//! IBM Cloud IAM token exchange.

use std::fmt;

use chrono::Utc;
use serde::Deserialize;

/// Seconds before expiry at which a cached token is considered stale.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Body returned by the IAM token endpoint.
#[derive(Clone, Deserialize)]
pub(crate) struct IamTokenResponse {
    pub access_token: String,
    /// Expiry as a Unix timestamp in seconds.
    pub expiration: i64,
}

/// A bearer token together with its expiry.
#[derive(Clone)]
pub(crate) struct IamToken {
    access_token: String,
    expiration: i64,
}

impl fmt::Debug for IamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamToken")
            .field("access_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl IamToken {
    pub(crate) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(crate) fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now().timestamp())
    }

    fn is_fresh_at(&self, now: i64) -> bool {
        now < self.expiration - REFRESH_MARGIN_SECS
    }
}

impl From<IamTokenResponse> for IamToken {
    fn from(response: IamTokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            expiration: response.expiration,
        }
    }
}

/// Form fields of an API-key token request.
pub(crate) fn token_request_form(api_key: &str) -> [(&'static str, &str); 2] {
    [
        ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
        ("apikey", api_key),
    ]
}
