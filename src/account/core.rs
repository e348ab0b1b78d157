//! Live account snapshots built from the user's banks and Plaid.

use futures::future::try_join_all;

use crate::{
    Error,
    appwrite::Appwrite,
    bank::{Bank, get_bank, get_banks},
    plaid::{Institution, Plaid, PlaidAccount},
    transaction::{Transaction, get_transactions, get_transactions_by_bank_id, merge_transactions},
};

/// A bank account with the balances Plaid currently reports. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The Plaid account ID.
    pub id: String,
    /// The amount that can be withdrawn.
    pub available_balance: f64,
    /// The total amount of funds in the account.
    pub current_balance: f64,
    /// The institution that holds the account.
    pub institution_id: String,
    /// The name of the account, e.g. "Plaid Checking".
    pub name: String,
    /// The name given by the institution.
    pub official_name: Option<String>,
    /// The last few digits of the account number.
    pub mask: String,
    /// The account type, e.g. "depository".
    pub account_type: String,
    /// The account subtype, e.g. "checking".
    pub subtype: String,
    /// The ID of the bank document for the account.
    pub appwrite_item_id: String,
    /// The ID other users send money to.
    pub shareable_id: String,
}

impl Account {
    fn new(account: &PlaidAccount, institution_id: String, bank: &Bank) -> Self {
        let current_balance = account.balances.current.unwrap_or_default();

        Self {
            id: account.account_id.clone(),
            available_balance: account.balances.available.unwrap_or(current_balance),
            current_balance,
            institution_id,
            name: account.name.clone(),
            official_name: account.official_name.clone(),
            mask: account.mask.clone().unwrap_or_default(),
            account_type: account.account_type.clone(),
            subtype: account.subtype.clone().unwrap_or_default(),
            appwrite_item_id: bank.id.clone(),
            shareable_id: bank.shareable_id.clone(),
        }
    }
}

/// All of a user's accounts and their combined balance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountsSummary {
    pub data: Vec<Account>,
    pub total_banks: usize,
    pub total_current_balance: f64,
}

/// One account and its transactions, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetail {
    pub data: Account,
    pub transactions: Vec<Transaction>,
}

/// Get the institution with `institution_id` from Plaid.
pub async fn get_institution(plaid: &dyn Plaid, institution_id: &str) -> Result<Institution, Error> {
    plaid.get_institution(institution_id).await
}

/// Fetch the first Plaid account of `bank` and the ID of its institution.
async fn fetch_account(plaid: &dyn Plaid, bank: &Bank) -> Result<Account, Error> {
    let response = plaid.get_accounts(&bank.access_token).await?;
    let account = response.accounts.first().ok_or(Error::NoAccounts)?;

    let institution_id = match &response.item.institution_id {
        Some(institution_id) => get_institution(plaid, institution_id).await?.institution_id,
        None => String::new(),
    };

    Ok(Account::new(account, institution_id, bank))
}

/// Get a snapshot of every account the user with the profile `user_id` linked.
///
/// Plaid is queried for all banks concurrently.
pub async fn get_accounts(
    appwrite: &dyn Appwrite,
    plaid: &dyn Plaid,
    user_id: &str,
) -> Result<AccountsSummary, Error> {
    let banks = get_banks(appwrite, user_id).await?;
    let accounts = try_join_all(banks.iter().map(|bank| fetch_account(plaid, bank))).await?;

    let total_current_balance = accounts
        .iter()
        .map(|account| account.current_balance)
        .sum();

    Ok(AccountsSummary {
        total_banks: accounts.len(),
        total_current_balance,
        data: accounts,
    })
}

/// Get the account of the bank document `appwrite_item_id` with its bank
/// transactions and transfer records.
///
/// A failed transaction sync is logged and the account is shown with its
/// transfer records only.
pub async fn get_account(
    appwrite: &dyn Appwrite,
    plaid: &dyn Plaid,
    appwrite_item_id: &str,
) -> Result<AccountDetail, Error> {
    let bank = get_bank(appwrite, appwrite_item_id).await?;
    let account = fetch_account(plaid, &bank).await?;

    let transfers = get_transactions_by_bank_id(appwrite, &bank.id)
        .await?
        .iter()
        .map(|transfer| transfer.to_transaction(&bank.id))
        .collect();

    let bank_transactions = get_transactions(plaid, &bank.access_token)
        .await
        .unwrap_or_else(|error| {
            tracing::error!("Could not sync transactions for bank {}: {error}", bank.id);
            Vec::new()
        });

    Ok(AccountDetail {
        data: account,
        transactions: merge_transactions(bank_transactions, transfers),
    })
}
