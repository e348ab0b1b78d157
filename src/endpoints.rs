//! The API endpoints URIs.

/// The home page for signed in users.
pub const ROOT: &str = "/";
/// The page for displaying the transactions of one linked bank account.
pub const TRANSACTION_HISTORY_VIEW: &str = "/transaction-history";
/// The page for listing the user's linked bank accounts.
pub const MY_BANKS_VIEW: &str = "/my-banks";
/// The page for sending money to another user.
pub const PAYMENT_TRANSFER_VIEW: &str = "/payment-transfer";
/// The page that opens the bank linking widget.
pub const LINK_BANK_VIEW: &str = "/link-bank";
/// The route for getting the sign-in page.
pub const SIGN_IN_VIEW: &str = "/sign-in";
/// The route for getting the sign-up page.
pub const SIGN_UP_VIEW: &str = "/sign-up";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for signing in a user.
pub const SIGN_IN_API: &str = "/api/sign-in";
/// The route for creating a new user.
pub const SIGN_UP_API: &str = "/api/sign-up";
/// The route for the client to sign out the current user.
pub const SIGN_OUT: &str = "/api/sign-out";
/// The route the bank linking widget posts its public token to.
pub const EXCHANGE_PUBLIC_TOKEN_API: &str = "/api/exchange-public-token";
/// The route for creating a transfer between two linked bank accounts.
pub const TRANSFERS_API: &str = "/api/transfers";
