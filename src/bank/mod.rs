//! Linked banks: the bank documents, linking new banks with Plaid Link and
//! the page listing the user's banks.

mod core;
mod link;
mod my_banks_page;

pub use core::{Bank, get_bank, get_bank_by_account_id, get_banks};
pub use link::{get_link_bank_page, post_exchange_public_token};
pub(crate) use my_banks_page::bank_card;
pub use my_banks_page::get_my_banks_page;
