//! Plaid links bank accounts and provides their balances and transactions.

mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::Error;

pub use client::PlaidClient;

time::serde::format_description!(plaid_date, Date, "[year]-[month]-[day]");

/// The result of exchanging a public token from the Link widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenExchange {
    /// The token used to access the item's data.
    pub access_token: String,
    /// The ID of the item (a login at one institution).
    pub item_id: String,
}

/// The accounts belonging to an item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountsResponse {
    /// The accounts the user shared when linking the item.
    pub accounts: Vec<PlaidAccount>,
    /// The item the accounts belong to.
    pub item: Item,
}

/// A bank account as reported by Plaid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidAccount {
    /// The Plaid account ID.
    pub account_id: String,
    /// The balances of the account.
    pub balances: Balances,
    /// The last few digits of the account number.
    pub mask: Option<String>,
    /// The name of the account, e.g. "Plaid Checking".
    pub name: String,
    /// The name given by the institution.
    pub official_name: Option<String>,
    /// The account type, e.g. "depository".
    #[serde(rename = "type")]
    pub account_type: String,
    /// The account subtype, e.g. "checking".
    pub subtype: Option<String>,
}

/// Account balances. Institutions do not always report every balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    /// The amount that can be withdrawn.
    pub available: Option<f64>,
    /// The total amount of funds in the account.
    pub current: Option<f64>,
}

/// A login at a financial institution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    /// The item ID.
    pub item_id: String,
    /// The institution the item belongs to.
    pub institution_id: Option<String>,
}

/// A financial institution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Institution {
    /// The institution ID.
    pub institution_id: String,
    /// The institution name, e.g. "Chase".
    pub name: String,
}

/// One page of transaction updates from `/transactions/sync`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncPage {
    /// The transactions added since the cursor.
    ///
    /// Kept as raw JSON so a malformed page can be detected rather than
    /// failing the whole sync.
    #[serde(default)]
    pub added: Value,
    /// The cursor for the next page.
    #[serde(default)]
    pub next_cursor: String,
    /// Whether more pages are available.
    #[serde(default)]
    pub has_more: bool,
    /// Set when Plaid reports a problem with the page.
    #[serde(default)]
    pub error: Option<Value>,
}

/// A transaction as reported by Plaid.
///
/// Positive amounts are money leaving the account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaidTransaction {
    /// The transaction ID.
    pub transaction_id: String,
    /// The account the transaction belongs to.
    pub account_id: String,
    /// The transaction amount.
    pub amount: f64,
    /// The date the transaction posted.
    #[serde(with = "plaid_date")]
    pub date: Date,
    /// The merchant or description.
    pub name: String,
    /// How the transaction was made, e.g. "online" or "in store".
    pub payment_channel: String,
    /// Whether the transaction has yet to settle.
    #[serde(default)]
    pub pending: bool,
    /// The legacy category hierarchy, most general first.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    /// The personal finance category.
    #[serde(default)]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    /// The merchant logo.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// The personal finance category of a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonalFinanceCategory {
    /// The broad category, e.g. "FOOD_AND_DRINK".
    pub primary: String,
}

/// The operations Horizon needs from Plaid.
#[async_trait]
pub trait Plaid: Send + Sync {
    /// Create a token for initialising the Link widget.
    async fn create_link_token(&self, client_user_id: &str, client_name: &str)
    -> Result<String, Error>;

    /// Exchange the public token from the Link widget for an access token.
    async fn exchange_public_token(&self, public_token: &str) -> Result<TokenExchange, Error>;

    /// Get the accounts and item for an access token.
    async fn get_accounts(&self, access_token: &str) -> Result<AccountsResponse, Error>;

    /// Get an institution by ID.
    async fn get_institution(&self, institution_id: &str) -> Result<Institution, Error>;

    /// Get the page of transaction updates after `cursor`.
    ///
    /// An empty cursor starts from the beginning of the item's history.
    async fn sync_transactions(
        &self,
        access_token: &str,
        cursor: &str,
        count: u32,
    ) -> Result<SyncPage, Error>;

    /// Create a token that lets Dwolla access an account.
    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, Error>;
}
