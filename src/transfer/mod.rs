//! Payment transfers between Horizon users.
//!
//! The sender picks one of their banks and identifies the recipient's bank by
//! its shareable ID. The money moves through Dwolla and the transfer is
//! recorded in Appwrite so both users see it in their transaction history.

mod create_endpoint;
mod form;
mod page;

pub use create_endpoint::create_transfer_endpoint;
pub use page::get_payment_transfer_page;
