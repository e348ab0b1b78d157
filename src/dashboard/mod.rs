//! Dashboard module
//!
//! Provides the home page: a greeting, the total balance of the user's banks
//! with a chart, recent transactions and a sidebar with the user's profile.

mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
