use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header::CONTENT_TYPE};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    Error,
    appwrite::{Appwrite, AppwriteAccount, Collection, Query, Session, UNIQUE_ID},
    config::AppwriteConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// The number of documents requested per page when listing documents.
const PAGE_SIZE: usize = 100;

/// Talks to the Appwrite REST API with a server API key.
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    config: AppwriteConfig,
    http: Client,
}

impl AppwriteClient {
    /// Create a client for the Appwrite project described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HttpError] if the HTTP client could not be built.
    pub fn new(config: AppwriteConfig) -> Result<Self, Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header(CONTENT_TYPE, "application/json")
    }

    /// A request made with the server API key.
    fn admin_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .header("X-Appwrite-Key", &self.config.api_key)
    }

    /// A request made on behalf of the user that owns `session_secret`.
    fn session_request(&self, method: Method, path: &str, session_secret: &str) -> RequestBuilder {
        self.request(method, path)
            .header("X-Appwrite-Session", session_secret)
    }

    fn documents_path(&self, collection: Collection) -> String {
        let collection_id = match collection {
            Collection::Users => &self.config.user_collection_id,
            Collection::Banks => &self.config.bank_collection_id,
            Collection::Transactions => &self.config.transaction_collection_id,
        };

        format!(
            "/databases/{}/collections/{collection_id}/documents",
            self.config.database_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

async fn into_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => String::new(),
    };

    Error::Appwrite { status, message }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    if !response.status().is_success() {
        return Err(into_error(response).await);
    }

    Ok(response.json().await?)
}

async fn check_status(response: Response) -> Result<(), Error> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(into_error(response).await)
    }
}

#[async_trait]
impl Appwrite for AppwriteClient {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AppwriteAccount, Error> {
        let response = self
            .admin_request(Method::POST, "/account")
            .json(&json!({
                "userId": user_id,
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(Error::DuplicateEmail),
            _ => parse_json(response).await,
        }
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let response = self
            .admin_request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => Err(Error::InvalidCredentials),
            _ => parse_json(response).await,
        }
    }

    async fn get_account(&self, session_secret: &str) -> Result<AppwriteAccount, Error> {
        let response = self
            .session_request(Method::GET, "/account", session_secret)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthenticated),
            _ => parse_json(response).await,
        }
    }

    async fn delete_session(&self, session_secret: &str) -> Result<(), Error> {
        let response = self
            .session_request(Method::DELETE, "/account/sessions/current", session_secret)
            .send()
            .await?;

        check_status(response).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        let response = self
            .admin_request(Method::DELETE, &format!("/users/{user_id}"))
            .send()
            .await?;

        check_status(response).await
    }

    async fn create_document(&self, collection: Collection, data: Value) -> Result<Value, Error> {
        let response = self
            .admin_request(Method::POST, &self.documents_path(collection))
            .json(&json!({ "documentId": UNIQUE_ID, "data": data }))
            .send()
            .await?;

        parse_json(response).await
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, Error> {
        let path = self.documents_path(collection);
        let mut documents = Vec::new();

        loop {
            let query_params = queries
                .iter()
                .cloned()
                .chain([Query::limit(PAGE_SIZE), Query::offset(documents.len())])
                .map(|query| query.to_query_string().map(|query| ("queries[]", query)))
                .collect::<Result<Vec<_>, _>>()?;

            let response = self
                .admin_request(Method::GET, &path)
                .query(&query_params)
                .send()
                .await?;

            let page: DocumentList = parse_json(response).await?;
            let page_len = page.documents.len();
            documents.extend(page.documents);

            if page_len < PAGE_SIZE {
                return Ok(documents);
            }
        }
    }

    async fn get_document(
        &self,
        collection: Collection,
        document_id: &str,
    ) -> Result<Value, Error> {
        let path = format!("{}/{document_id}", self.documents_path(collection));
        let response = self.admin_request(Method::GET, &path).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            _ => parse_json(response).await,
        }
    }

    async fn delete_document(
        &self,
        collection: Collection,
        document_id: &str,
    ) -> Result<(), Error> {
        let path = format!("{}/{document_id}", self.documents_path(collection));
        let response = self.admin_request(Method::DELETE, &path).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            _ => check_status(response).await,
        }
    }
}
