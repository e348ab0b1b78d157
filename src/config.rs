//! Connection settings for the external services Horizon composes.

use std::{fmt::Display, str::FromStr};

/// The settings for connecting to Appwrite, which provides user accounts,
/// sessions and the document database.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// The API endpoint, e.g. "https://cloud.appwrite.io/v1".
    pub endpoint: String,
    /// The Appwrite project ID.
    pub project_id: String,
    /// A server API key with access to users, sessions and documents.
    pub api_key: String,
    /// The ID of the database holding the collections below.
    pub database_id: String,
    /// The collection of user profile documents.
    pub user_collection_id: String,
    /// The collection of linked bank documents.
    pub bank_collection_id: String,
    /// The collection of transfer documents.
    pub transaction_collection_id: String,
}

/// The Plaid environment to send requests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    /// Test environment with fake institutions and credentials.
    Sandbox,
    /// Limited live environment.
    Development,
    /// Live environment.
    Production,
}

impl PlaidEnvironment {
    /// The base URL for API requests in this environment.
    pub fn base_url(self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            _ => Err(UnknownEnvironment(s.to_owned())),
        }
    }
}

/// The settings for connecting to Plaid.
#[derive(Debug, Clone)]
pub struct PlaidConfig {
    /// The Plaid client ID.
    pub client_id: String,
    /// The Plaid secret for `environment`.
    pub secret: String,
    /// Which Plaid environment to use.
    pub environment: PlaidEnvironment,
}

/// The Dwolla environment to send requests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwollaEnvironment {
    /// Test environment where transfers are simulated.
    Sandbox,
    /// Live environment.
    Production,
}

impl DwollaEnvironment {
    /// The base URL for API requests in this environment.
    pub fn base_url(self) -> &'static str {
        match self {
            DwollaEnvironment::Sandbox => "https://api-sandbox.dwolla.com",
            DwollaEnvironment::Production => "https://api.dwolla.com",
        }
    }
}

impl FromStr for DwollaEnvironment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(DwollaEnvironment::Sandbox),
            "production" => Ok(DwollaEnvironment::Production),
            _ => Err(UnknownEnvironment(s.to_owned())),
        }
    }
}

/// The settings for connecting to Dwolla.
#[derive(Debug, Clone)]
pub struct DwollaConfig {
    /// The application key.
    pub key: String,
    /// The application secret.
    pub secret: String,
    /// Which Dwolla environment to use.
    pub environment: DwollaEnvironment,
}

/// The name of an environment was not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnvironment(String);

impl Display for UnknownEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown environment \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownEnvironment {}
