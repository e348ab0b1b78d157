//! Dwolla moves money between the funding sources of Horizon users.

mod client;

use async_trait::async_trait;
use serde::Serialize;

use crate::Error;

pub use client::DwollaClient;

/// The details needed to create a personal (verified) customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    /// The customer's first name.
    pub first_name: String,
    /// The customer's last name.
    pub last_name: String,
    /// The customer's email address.
    pub email: String,
    /// Always "personal" for Horizon users.
    #[serde(rename = "type")]
    pub customer_type: String,
    /// The first line of the street address.
    pub address1: String,
    /// The city of the address.
    pub city: String,
    /// Two letter state code, e.g. "NY".
    pub state: String,
    /// The postal code of the address.
    pub postal_code: String,
    /// Formatted as "yyyy-mm-dd".
    pub date_of_birth: String,
    /// The last four digits, or the full number.
    pub ssn: String,
}

/// The operations Horizon needs from Dwolla.
#[async_trait]
pub trait Dwolla: Send + Sync {
    /// Create a customer and return its URL.
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, Error>;

    /// Attach a bank account to a customer using a Plaid processor token and
    /// return the URL of the funding source.
    async fn create_funding_source(
        &self,
        customer_id: &str,
        processor_token: &str,
        bank_name: &str,
    ) -> Result<String, Error>;

    /// Move `amount` dollars from one funding source to another and return
    /// the URL of the transfer.
    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: f64,
    ) -> Result<String, Error>;
}

/// Get the customer ID from a customer URL, e.g.
/// "https://api-sandbox.dwolla.com/customers/abc" gives "abc".
pub fn extract_customer_id_from_url(url: &str) -> &str {
    let url = url.trim_end_matches('/');

    url.rsplit_once('/').map_or(url, |(_, id)| id)
}
