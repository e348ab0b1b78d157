mod cookie;
mod middleware;
mod redirect;
mod sign_in;
mod sign_out;
mod sign_up;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::set_auth_cookie;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use sign_in::{get_sign_in_page, post_sign_in};
pub use sign_out::get_sign_out;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub use token::Token;
pub use user::{User, get_logged_in_user};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
