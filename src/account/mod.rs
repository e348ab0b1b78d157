//! Live snapshots of the user's linked accounts.

mod core;

pub use core::{Account, AccountDetail, AccountsSummary, get_account, get_accounts};
