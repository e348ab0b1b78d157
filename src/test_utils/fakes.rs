//! In-memory stand-ins for the external APIs.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppState, Error,
    appwrite::{Appwrite, AppwriteAccount, Collection, Query, Session},
    auth::{Token, User},
    dwolla::{Dwolla, NewCustomer},
    pagination::PaginationConfig,
    plaid::{
        AccountsResponse, Balances, Institution, Item, Plaid, PlaidAccount, SyncPage,
        TokenExchange,
    },
};

#[derive(Default)]
struct AppwriteData {
    accounts: Vec<(AppwriteAccount, String)>,
    sessions: Vec<Session>,
    documents: HashMap<Collection, Vec<Value>>,
    failing_collections: Vec<Collection>,
    failing_sessions: bool,
    next_id: usize,
}

impl AppwriteData {
    fn generate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

#[derive(Default)]
pub(crate) struct FakeAppwrite {
    data: Mutex<AppwriteData>,
}

impl FakeAppwrite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_account(&self, email: &str, password: &str, name: &str) -> AppwriteAccount {
        let mut data = self.data.lock().unwrap();
        let account = AppwriteAccount {
            id: data.generate_id("account"),
            name: name.to_owned(),
            email: email.to_owned(),
        };
        data.accounts.push((account.clone(), password.to_owned()));

        account
    }

    /// Create an account for `user` and store `user` as its profile.
    pub(crate) fn add_user(&self, user: User, password: &str) -> User {
        let account = self.add_account(&user.email, password, &user.full_name());
        let user = User {
            user_id: account.id,
            ..user
        };
        let document = serde_json::to_value(&user).unwrap();
        let stored = self.add_document(Collection::Users, document);

        serde_json::from_value(stored).unwrap()
    }

    pub(crate) fn sign_in(&self, email: &str, password: &str) -> Session {
        let mut data = self.data.lock().unwrap();
        let account_id = data
            .accounts
            .iter()
            .find(|(account, account_password)| account.email == email && account_password == password)
            .map(|(account, _)| account.id.clone())
            .expect("no account with the email and password");
        let session = Session {
            id: data.generate_id("session"),
            user_id: account_id,
            secret: data.generate_id("secret"),
            expire: OffsetDateTime::now_utc() + Duration::days(365),
        };
        data.sessions.push(session.clone());

        session
    }

    /// Store `document`, adding the `$id` and `$createdAt` attributes if missing.
    pub(crate) fn add_document(&self, collection: Collection, mut document: Value) -> Value {
        let mut data = self.data.lock().unwrap();

        if document.get("$id").is_none_or(|id| id.as_str().is_none_or(str::is_empty)) {
            document["$id"] = json!(data.generate_id("doc"));
        }
        if document.get("$createdAt").is_none() {
            document["$createdAt"] = json!(OffsetDateTime::now_utc().format(&Rfc3339).unwrap());
        }

        data.documents
            .entry(collection)
            .or_default()
            .push(document.clone());

        document
    }

    pub(crate) fn documents(&self, collection: Collection) -> Vec<Value> {
        self.data
            .lock()
            .unwrap()
            .documents
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn accounts(&self) -> Vec<AppwriteAccount> {
        self.data
            .lock()
            .unwrap()
            .accounts
            .iter()
            .map(|(account, _)| account.clone())
            .collect()
    }

    /// Make creating documents in `collection` fail.
    pub(crate) fn fail_collection(&self, collection: Collection) {
        self.data.lock().unwrap().failing_collections.push(collection);
    }

    /// Make creating sessions fail.
    pub(crate) fn fail_sessions(&self) {
        self.data.lock().unwrap().failing_sessions = true;
    }
}

fn matches_queries(document: &Value, queries: &[Query]) -> bool {
    queries.iter().all(|query| match query.attribute() {
        Some(attribute) => document
            .get(attribute)
            .is_some_and(|value| query.values().contains(value)),
        None => true,
    })
}

#[async_trait]
impl Appwrite for FakeAppwrite {
    async fn create_account(
        &self,
        _user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AppwriteAccount, Error> {
        let exists = self
            .data
            .lock()
            .unwrap()
            .accounts
            .iter()
            .any(|(account, _)| account.email == email);

        if exists {
            return Err(Error::DuplicateEmail);
        }

        Ok(self.add_account(email, password, name))
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        if self.data.lock().unwrap().failing_sessions {
            return Err(Error::Appwrite {
                status: 500,
                message: "Server Error".to_owned(),
            });
        }

        let is_valid = self
            .data
            .lock()
            .unwrap()
            .accounts
            .iter()
            .any(|(account, account_password)| account.email == email && account_password == password);

        if is_valid {
            Ok(self.sign_in(email, password))
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    async fn get_account(&self, session_secret: &str) -> Result<AppwriteAccount, Error> {
        let data = self.data.lock().unwrap();
        let session = data
            .sessions
            .iter()
            .find(|session| session.secret == session_secret)
            .ok_or(Error::Unauthenticated)?;

        data.accounts
            .iter()
            .find(|(account, _)| account.id == session.user_id)
            .map(|(account, _)| account.clone())
            .ok_or(Error::Unauthenticated)
    }

    async fn delete_session(&self, session_secret: &str) -> Result<(), Error> {
        self.data
            .lock()
            .unwrap()
            .sessions
            .retain(|session| session.secret != session_secret);

        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        data.accounts.retain(|(account, _)| account.id != user_id);
        data.sessions.retain(|session| session.user_id != user_id);

        Ok(())
    }

    async fn create_document(&self, collection: Collection, data: Value) -> Result<Value, Error> {
        if self
            .data
            .lock()
            .unwrap()
            .failing_collections
            .contains(&collection)
        {
            return Err(Error::Appwrite {
                status: 500,
                message: "Server Error".to_owned(),
            });
        }

        Ok(self.add_document(collection, data))
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, Error> {
        Ok(self
            .documents(collection)
            .into_iter()
            .filter(|document| matches_queries(document, queries))
            .collect())
    }

    async fn get_document(
        &self,
        collection: Collection,
        document_id: &str,
    ) -> Result<Value, Error> {
        self.documents(collection)
            .into_iter()
            .find(|document| document["$id"] == document_id)
            .ok_or(Error::NotFound)
    }

    async fn delete_document(
        &self,
        collection: Collection,
        document_id: &str,
    ) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        let documents = data.documents.entry(collection).or_default();
        let count = documents.len();
        documents.retain(|document| document["$id"] != document_id);

        if documents.len() == count {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct PlaidData {
    public_tokens: HashMap<String, TokenExchange>,
    items: HashMap<String, AccountsResponse>,
    institutions: HashMap<String, Institution>,
    sync_pages: HashMap<String, Vec<SyncPage>>,
    failing_syncs: Vec<String>,
    sync_cursors: Vec<String>,
    link_token_requests: Vec<(String, String)>,
}

#[derive(Default)]
pub(crate) struct FakePlaid {
    data: Mutex<PlaidData>,
}

impl FakePlaid {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an item whose public token exchanges for `access_token`.
    pub(crate) fn add_item(
        &self,
        public_token: &str,
        access_token: &str,
        item_id: &str,
        institution_id: &str,
        accounts: Vec<PlaidAccount>,
    ) {
        let mut data = self.data.lock().unwrap();
        data.public_tokens.insert(
            public_token.to_owned(),
            TokenExchange {
                access_token: access_token.to_owned(),
                item_id: item_id.to_owned(),
            },
        );
        data.items.insert(
            access_token.to_owned(),
            AccountsResponse {
                accounts,
                item: Item {
                    item_id: item_id.to_owned(),
                    institution_id: Some(institution_id.to_owned()),
                },
            },
        );
    }

    pub(crate) fn add_institution(&self, institution_id: &str, name: &str) {
        self.data.lock().unwrap().institutions.insert(
            institution_id.to_owned(),
            Institution {
                institution_id: institution_id.to_owned(),
                name: name.to_owned(),
            },
        );
    }

    /// Serve `pages` in order: the first for an empty cursor, each later one
    /// for the previous page's `next_cursor`.
    pub(crate) fn set_sync_pages(&self, access_token: &str, pages: Vec<SyncPage>) {
        self.data
            .lock()
            .unwrap()
            .sync_pages
            .insert(access_token.to_owned(), pages);
    }

    pub(crate) fn fail_sync(&self, access_token: &str) {
        self.data
            .lock()
            .unwrap()
            .failing_syncs
            .push(access_token.to_owned());
    }

    /// The cursors passed to `sync_transactions`, in call order.
    pub(crate) fn sync_cursors(&self) -> Vec<String> {
        self.data.lock().unwrap().sync_cursors.clone()
    }

    /// The `(client_user_id, client_name)` of each link token request.
    pub(crate) fn link_token_requests(&self) -> Vec<(String, String)> {
        self.data.lock().unwrap().link_token_requests.clone()
    }
}

fn plaid_error(error_code: &str) -> Error {
    Error::Plaid {
        status: 400,
        error_code: error_code.to_owned(),
        message: "fake Plaid error".to_owned(),
    }
}

#[async_trait]
impl Plaid for FakePlaid {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        client_name: &str,
    ) -> Result<String, Error> {
        self.data
            .lock()
            .unwrap()
            .link_token_requests
            .push((client_user_id.to_owned(), client_name.to_owned()));

        Ok(format!("link-sandbox-{client_user_id}"))
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<TokenExchange, Error> {
        self.data
            .lock()
            .unwrap()
            .public_tokens
            .get(public_token)
            .cloned()
            .ok_or_else(|| plaid_error("INVALID_PUBLIC_TOKEN"))
    }

    async fn get_accounts(&self, access_token: &str) -> Result<AccountsResponse, Error> {
        self.data
            .lock()
            .unwrap()
            .items
            .get(access_token)
            .cloned()
            .ok_or_else(|| plaid_error("INVALID_ACCESS_TOKEN"))
    }

    async fn get_institution(&self, institution_id: &str) -> Result<Institution, Error> {
        self.data
            .lock()
            .unwrap()
            .institutions
            .get(institution_id)
            .cloned()
            .ok_or_else(|| plaid_error("INVALID_INSTITUTION"))
    }

    async fn sync_transactions(
        &self,
        access_token: &str,
        cursor: &str,
        _count: u32,
    ) -> Result<SyncPage, Error> {
        let mut data = self.data.lock().unwrap();
        data.sync_cursors.push(cursor.to_owned());

        if data.failing_syncs.iter().any(|token| token == access_token) {
            return Err(plaid_error("ITEM_LOGIN_REQUIRED"));
        }

        let pages = data.sync_pages.get(access_token).cloned().unwrap_or_default();
        let index = if cursor.is_empty() {
            Some(0)
        } else {
            pages
                .iter()
                .position(|page| page.next_cursor == cursor)
                .map(|index| index + 1)
        };

        Ok(index
            .and_then(|index| pages.get(index).cloned())
            .unwrap_or(SyncPage {
                added: json!([]),
                next_cursor: cursor.to_owned(),
                has_more: false,
                error: None,
            }))
    }

    async fn create_processor_token(
        &self,
        _access_token: &str,
        account_id: &str,
    ) -> Result<String, Error> {
        Ok(format!("processor-sandbox-{account_id}"))
    }
}

#[derive(Default)]
struct DwollaData {
    customers: Vec<NewCustomer>,
    funding_sources: Vec<(String, String, String)>,
    transfers: Vec<(String, String, f64)>,
    fail_customers: bool,
    fail_transfers: bool,
}

#[derive(Default)]
pub(crate) struct FakeDwolla {
    data: Mutex<DwollaData>,
}

impl FakeDwolla {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn customers(&self) -> Vec<NewCustomer> {
        self.data.lock().unwrap().customers.clone()
    }

    /// The `(customer_id, processor_token, bank_name)` of each funding source.
    pub(crate) fn funding_sources(&self) -> Vec<(String, String, String)> {
        self.data.lock().unwrap().funding_sources.clone()
    }

    /// The `(source, destination, amount)` of each transfer.
    pub(crate) fn transfers(&self) -> Vec<(String, String, f64)> {
        self.data.lock().unwrap().transfers.clone()
    }

    pub(crate) fn fail_customers(&self) {
        self.data.lock().unwrap().fail_customers = true;
    }

    pub(crate) fn fail_transfers(&self) {
        self.data.lock().unwrap().fail_transfers = true;
    }
}

fn dwolla_error() -> Error {
    Error::Dwolla {
        status: 400,
        message: "fake Dwolla error".to_owned(),
    }
}

#[async_trait]
impl Dwolla for FakeDwolla {
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, Error> {
        let mut data = self.data.lock().unwrap();

        if data.fail_customers {
            return Err(dwolla_error());
        }

        data.customers.push(customer.clone());

        Ok(format!(
            "https://api-sandbox.dwolla.com/customers/cust-{}",
            data.customers.len()
        ))
    }

    async fn create_funding_source(
        &self,
        customer_id: &str,
        processor_token: &str,
        bank_name: &str,
    ) -> Result<String, Error> {
        let mut data = self.data.lock().unwrap();
        data.funding_sources.push((
            customer_id.to_owned(),
            processor_token.to_owned(),
            bank_name.to_owned(),
        ));

        Ok(format!(
            "https://api-sandbox.dwolla.com/funding-sources/fs-{}",
            data.funding_sources.len()
        ))
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: f64,
    ) -> Result<String, Error> {
        let mut data = self.data.lock().unwrap();

        if data.fail_transfers {
            return Err(dwolla_error());
        }

        data.transfers.push((
            source_funding_source_url.to_owned(),
            destination_funding_source_url.to_owned(),
            amount,
        ));

        Ok(format!(
            "https://api-sandbox.dwolla.com/transfers/t-{}",
            data.transfers.len()
        ))
    }
}

/// A user profile with an ID that [FakeAppwrite::add_user] replaces.
pub(crate) fn test_user() -> User {
    User {
        id: String::new(),
        user_id: String::new(),
        email: "jane@example.com".to_owned(),
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        address1: "1 Main St".to_owned(),
        city: "New York".to_owned(),
        state: "NY".to_owned(),
        postal_code: "10001".to_owned(),
        date_of_birth: "1990-01-31".to_owned(),
        ssn: "1234".to_owned(),
        dwolla_customer_id: "cust-1".to_owned(),
        dwolla_customer_url: "https://api-sandbox.dwolla.com/customers/cust-1".to_owned(),
    }
}

pub(crate) fn test_plaid_account(account_id: &str, name: &str, current: f64) -> PlaidAccount {
    PlaidAccount {
        account_id: account_id.to_owned(),
        balances: Balances {
            available: Some(current),
            current: Some(current),
        },
        mask: Some("0000".to_owned()),
        name: name.to_owned(),
        official_name: Some(format!("{name} Official")),
        account_type: "depository".to_owned(),
        subtype: Some("checking".to_owned()),
    }
}

/// Everything a handler test needs: the fakes, the app state built from
/// them and a signed in user.
pub(crate) struct TestContext {
    pub(crate) appwrite: Arc<FakeAppwrite>,
    pub(crate) plaid: Arc<FakePlaid>,
    pub(crate) dwolla: Arc<FakeDwolla>,
    pub(crate) state: AppState,
    pub(crate) user: User,
    pub(crate) token: Token,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let appwrite = Arc::new(FakeAppwrite::new());
        let plaid = Arc::new(FakePlaid::new());
        let dwolla = Arc::new(FakeDwolla::new());
        let state = AppState::new(
            "foobar",
            PaginationConfig::default(),
            appwrite.clone(),
            plaid.clone(),
            dwolla.clone(),
        );
        let user = appwrite.add_user(test_user(), "password123");
        let session = appwrite.sign_in(&user.email, "password123");
        let token = Token {
            user_id: session.user_id,
            session_secret: session.secret,
            expires_at: OffsetDateTime::now_utc() + Duration::days(1),
        };

        Self {
            appwrite,
            plaid,
            dwolla,
            state,
            user,
            token,
        }
    }

    /// Link a bank for the signed in user with one Plaid account and return
    /// the bank document.
    pub(crate) fn link_bank(&self, account_id: &str, name: &str, current: f64) -> Value {
        let access_token = format!("access-{account_id}");
        let institution_id = format!("ins-{account_id}");
        self.plaid.add_item(
            &format!("public-{account_id}"),
            &access_token,
            &format!("item-{account_id}"),
            &institution_id,
            vec![test_plaid_account(account_id, name, current)],
        );
        self.plaid.add_institution(&institution_id, &format!("{name} Bank"));

        self.appwrite.add_document(
            Collection::Banks,
            json!({
                "userId": self.user.id,
                "bankId": format!("item-{account_id}"),
                "accountId": account_id,
                "accessToken": access_token,
                "fundingSourceUrl": format!("https://api-sandbox.dwolla.com/funding-sources/{account_id}"),
                "shareableId": crate::shareable_id::encode_shareable_id(account_id),
            }),
        )
    }
}
