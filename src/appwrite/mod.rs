//! Appwrite provides user accounts, email/password sessions and the document
//! database that stores user profiles, linked banks and transfers.

mod client;
pub mod documents;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::Error;

pub use client::AppwriteClient;

/// Asks Appwrite to generate a unique ID for a new account or document.
pub const UNIQUE_ID: &str = "unique()";

/// An Appwrite user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppwriteAccount {
    /// The account ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// The display name given at sign-up.
    pub name: String,
    /// The email the user signs in with.
    pub email: String,
}

/// An Appwrite email/password session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    /// The session ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// The ID of the account the session belongs to.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// The secret that authenticates requests made on behalf of the user.
    ///
    /// Only returned when the session is created with a server API key.
    pub secret: String,
    /// When the session stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expire: OffsetDateTime,
}

/// The document collections used by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// User profile documents.
    Users,
    /// Linked bank documents.
    Banks,
    /// Transfer documents.
    Transactions,
}

/// A filter or paging instruction for listing documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    values: Vec<Value>,
}

impl Query {
    /// Match documents where `attribute` equals `value`.
    pub fn equal(attribute: &str, value: &str) -> Self {
        Self {
            method: "equal",
            attribute: Some(attribute.to_owned()),
            values: vec![Value::from(value)],
        }
    }

    /// Return at most `count` documents.
    pub fn limit(count: usize) -> Self {
        Self {
            method: "limit",
            attribute: None,
            values: vec![Value::from(count)],
        }
    }

    /// Skip the first `count` documents.
    pub fn offset(count: usize) -> Self {
        Self {
            method: "offset",
            attribute: None,
            values: vec![Value::from(count)],
        }
    }

    /// The attribute the query filters on, if it is a filter.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// The values the attribute is compared against.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Serialise the query in the JSON format Appwrite expects in the
    /// `queries[]` URL parameter.
    pub fn to_query_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The operations Horizon needs from Appwrite.
#[async_trait]
pub trait Appwrite: Send + Sync {
    /// Create a user account.
    ///
    /// # Errors
    ///
    /// Returns [Error::DuplicateEmail] if an account already uses `email`.
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AppwriteAccount, Error>;

    /// Create a session for the account with `email` and `password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the email or password is wrong.
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error>;

    /// Get the account the session belongs to.
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthenticated] if the session is not valid.
    async fn get_account(&self, session_secret: &str) -> Result<AppwriteAccount, Error>;

    /// Delete the session, signing the user out.
    async fn delete_session(&self, session_secret: &str) -> Result<(), Error>;

    /// Delete a user account.
    async fn delete_user(&self, user_id: &str) -> Result<(), Error>;

    /// Create a document in `collection` with a generated ID and return it.
    async fn create_document(&self, collection: Collection, data: Value) -> Result<Value, Error>;

    /// List the documents in `collection` matching all `queries`.
    ///
    /// Every matching document is returned, however many pages Appwrite
    /// splits them into.
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, Error>;

    /// Get a document by its ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such document.
    async fn get_document(&self, collection: Collection, document_id: &str)
    -> Result<Value, Error>;

    /// Delete a document by its ID.
    async fn delete_document(&self, collection: Collection, document_id: &str)
    -> Result<(), Error>;
}
