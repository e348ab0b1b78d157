//! The bank documents that record each linked bank account.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    appwrite::{Appwrite, Collection, Query, documents},
};

/// A bank account the user linked with Plaid and registered with Dwolla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// The ID of the bank document.
    #[serde(rename = "$id")]
    pub id: String,
    /// The ID of the owner's profile document.
    pub user_id: String,
    /// The Plaid item ID.
    pub bank_id: String,
    /// The Plaid account ID.
    pub account_id: String,
    /// The Plaid access token for the item.
    pub access_token: String,
    /// The Dwolla funding source for the account.
    pub funding_source_url: String,
    /// The encoded account ID that other users send money to.
    pub shareable_id: String,
}

/// The fields of a new bank document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBank {
    pub user_id: String,
    pub bank_id: String,
    pub account_id: String,
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
}

/// Store a new bank document.
pub async fn create_bank_account(appwrite: &dyn Appwrite, new_bank: &NewBank) -> Result<Bank, Error> {
    documents::create(appwrite, Collection::Banks, new_bank).await
}

/// Get the banks linked by the user with the profile `user_id`.
pub async fn get_banks(appwrite: &dyn Appwrite, user_id: &str) -> Result<Vec<Bank>, Error> {
    documents::list(appwrite, Collection::Banks, &[Query::equal("userId", user_id)]).await
}

/// Get a bank by its document ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no bank document with the ID.
pub async fn get_bank(appwrite: &dyn Appwrite, document_id: &str) -> Result<Bank, Error> {
    documents::get(appwrite, Collection::Banks, document_id).await
}

/// Get the bank that holds the Plaid account `account_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no bank holds the account.
pub async fn get_bank_by_account_id(
    appwrite: &dyn Appwrite,
    account_id: &str,
) -> Result<Bank, Error> {
    documents::list::<Bank>(
        appwrite,
        Collection::Banks,
        &[Query::equal("accountId", account_id)],
    )
    .await?
    .into_iter()
    .next()
    .ok_or(Error::NotFound)
}
