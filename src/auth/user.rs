//! The user profile documents stored alongside Appwrite accounts.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    appwrite::{Appwrite, Collection, Query, documents},
    auth::Token,
};

/// A Horizon user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The ID of the profile document.
    #[serde(rename = "$id")]
    pub id: String,
    /// The Appwrite account ID.
    pub user_id: String,
    /// The email the user signs in with.
    pub email: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The first line of the street address.
    pub address1: String,
    /// The city of the address.
    pub city: String,
    /// Two letter state code.
    pub state: String,
    /// The postal code of the address.
    pub postal_code: String,
    /// Formatted as "yyyy-mm-dd".
    pub date_of_birth: String,
    /// The social security number given at sign-up.
    pub ssn: String,
    /// The ID of the user's Dwolla customer.
    pub dwolla_customer_id: String,
    /// The URL of the user's Dwolla customer.
    pub dwolla_customer_url: String,
}

impl User {
    /// The user's first and last name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The fields of a new profile document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub ssn: String,
    pub dwolla_customer_id: String,
    pub dwolla_customer_url: String,
}

/// Store a new profile document.
pub async fn create_user(appwrite: &dyn Appwrite, new_user: &NewUser) -> Result<User, Error> {
    documents::create(appwrite, Collection::Users, new_user).await
}

/// Get the profile of the Appwrite account `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the account has no profile.
pub async fn get_user_info(appwrite: &dyn Appwrite, user_id: &str) -> Result<User, Error> {
    documents::list::<User>(appwrite, Collection::Users, &[Query::equal("userId", user_id)])
        .await?
        .into_iter()
        .next()
        .ok_or(Error::NotFound)
}

/// Get the profile of the signed in user.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if Appwrite no longer accepts the
/// session or the account has no profile, so that the user is sent back to
/// the sign-in page.
pub async fn get_logged_in_user(appwrite: &dyn Appwrite, token: &Token) -> Result<User, Error> {
    let account = appwrite.get_account(&token.session_secret).await?;

    match get_user_info(appwrite, &account.id).await {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            tracing::warn!("Account {} has no user profile", account.id);
            Err(Error::Unauthenticated)
        }
        Err(error) => Err(error),
    }
}
