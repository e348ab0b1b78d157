//! Fetches a bank's transactions with Plaid's cursor-based sync.

use crate::{
    Error,
    plaid::{Plaid, PlaidTransaction},
    transaction::core::Transaction,
};

/// The number of transactions to request per sync page.
const SYNC_PAGE_SIZE: u32 = 100;

/// Get all transactions for the item with `access_token`.
///
/// Pages are requested until Plaid reports there are no more. A page that
/// reports an error or has malformed transactions ends the sync early, and
/// the transactions collected so far are returned.
///
/// # Errors
///
/// Returns the error of a failed Plaid request.
pub async fn get_transactions(
    plaid: &dyn Plaid,
    access_token: &str,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = Vec::new();
    let mut cursor = String::new();

    loop {
        let page = plaid
            .sync_transactions(access_token, &cursor, SYNC_PAGE_SIZE)
            .await?;

        if let Some(error) = &page.error {
            tracing::error!("Plaid reported an error while syncing transactions: {error}");
            break;
        }

        if !page.added.is_array() {
            tracing::error!("Unexpected transactions format: {}", page.added);
            break;
        }

        match serde_json::from_value::<Vec<PlaidTransaction>>(page.added) {
            Ok(added) => transactions.extend(added.into_iter().map(Transaction::from)),
            Err(error) => {
                tracing::error!("Could not parse synced transactions: {error}");
                break;
            }
        }

        if !page.has_more {
            break;
        }

        cursor = page.next_cursor;
    }

    tracing::debug!(
        "Synced {} transactions for access token ending in {}",
        transactions.len(),
        token_suffix(access_token)
    );

    Ok(transactions)
}

fn token_suffix(access_token: &str) -> &str {
    let start = access_token
        .char_indices()
        .rev()
        .nth(3)
        .map_or(0, |(index, _)| index);

    &access_token[start..]
}
