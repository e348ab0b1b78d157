//! Transactions from the bank and transfers between Horizon users.
//!
//! This module contains:
//! - The `Transaction` display model and the mapping from Plaid transactions
//! - The cursor-based sync that fetches a bank's transactions
//! - Transfer records stored in Appwrite
//! - The paginated transaction table and the transaction history page

mod core;
mod history_page;
mod sync;
mod table;
mod transfer_record;

pub use core::{Direction, Transaction, count_categories, merge_transactions};
pub use history_page::{AccountQuery, get_transaction_history_page};
pub(crate) use history_page::ensure_owned;
pub use sync::get_transactions;
pub use table::{account_tabs, paginated_transactions};
pub use transfer_record::{
    NewTransfer, TransferRecord, create_transaction, get_transactions_by_bank_id,
};
