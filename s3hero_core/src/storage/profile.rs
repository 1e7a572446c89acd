use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The storage service family a profile talks to.
///
/// Serialized lowercase, so JSON looks like `"provider": "cloudflare"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Cloudflare,
    Custom,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Cloudflare => "cloudflare",
            Provider::Custom => "custom",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "cloudflare" => Ok(Provider::Cloudflare),
            "custom" => Ok(Provider::Custom),
            other => Err(format!(
                "unknown provider '{other}' (expected aws, cloudflare or custom)"
            )),
        }
    }
}

/// A user-named set of credentials for one S3-compatible endpoint.
///
/// `endpoint` and `account_id` are empty when unused and are left out of the
/// JSON entirely in that case:
/// `{ "name":"work", "provider":"aws", "access_key_id":"..", "secret_access_key":"..", "region":"us-east-1" }`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub provider: Provider,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Cloudflare R2 account id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        provider: Provider,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: String::new(),
            endpoint: String::new(),
            account_id: String::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    pub fn endpoint(&self) -> Option<&str> {
        non_empty(&self.endpoint)
    }

    pub fn account_id(&self) -> Option<&str> {
        non_empty(&self.account_id)
    }

    /// The URL an S3 client should be pointed at for this profile.
    ///
    /// An explicit endpoint always wins. Cloudflare falls back to the R2 URL
    /// derived from the account id. `None` means "use the SDK's regional default".
    pub fn endpoint_url(&self) -> Option<String> {
        if let Some(endpoint) = self.endpoint() {
            return Some(endpoint.to_string());
        }
        match self.provider {
            Provider::Cloudflare => self
                .account_id()
                .map(|id| format!("https://{id}.r2.cloudflarestorage.com")),
            Provider::Aws | Provider::Custom => None,
        }
    }
}

// Keeps the secret out of `{:?}` output and therefore out of logs.
impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("account_id", &self.account_id)
            .finish()
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The full persisted state: every profile plus the default's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Empty, or a key of `profiles`.
    #[serde(default)]
    pub default_profile: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Keys whose profile carries a different `name`. Only a hand-edited file can have these.
    pub fn mismatched_keys(&self) -> Vec<&str> {
        self.profiles
            .iter()
            .filter(|(key, profile)| **key != profile.name)
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
