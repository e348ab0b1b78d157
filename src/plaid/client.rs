use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    Error,
    config::PlaidConfig,
    plaid::{AccountsResponse, Institution, Plaid, SyncPage, TokenExchange},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const COUNTRY_CODES: [&str; 1] = ["US"];

/// Talks to the Plaid REST API.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    config: PlaidConfig,
    base_url: String,
    http: Client,
}

impl PlaidClient {
    /// Create a client for the environment in `config`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HttpError] if the HTTP client could not be built.
    pub fn new(config: PlaidConfig) -> Result<Self, Error> {
        let base_url = config.environment.base_url().to_owned();

        Self::with_base_url(config, base_url)
    }

    /// Create a client that sends requests to `base_url` instead of the
    /// configured environment.
    pub fn with_base_url(config: PlaidConfig, base_url: String) -> Result<Self, Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    /// POST `body` to `path` with the client credentials added.
    async fn post<T: DeserializeOwned>(&self, path: &str, mut body: Value) -> Result<T, Error> {
        if let Value::Object(fields) = &mut body {
            fields.insert("client_id".to_owned(), self.config.client_id.clone().into());
            fields.insert("secret".to_owned(), self.config.secret.clone().into());
        }

        let response = self
            .http
            .post(format!("{}{path}", self.base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?;

        parse_json(response).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.json::<ErrorBody>().await.unwrap_or_default();

    Err(Error::Plaid {
        status: status.as_u16(),
        error_code: body.error_code,
        message: body.error_message,
    })
}

#[derive(Deserialize)]
struct LinkTokenResponse {
    link_token: String,
}

#[derive(Deserialize)]
struct InstitutionResponse {
    institution: Institution,
}

#[derive(Deserialize)]
struct ProcessorTokenResponse {
    processor_token: String,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    cursor: &'a str,
    count: u32,
}

#[async_trait]
impl Plaid for PlaidClient {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        client_name: &str,
    ) -> Result<String, Error> {
        let response: LinkTokenResponse = self
            .post(
                "/link/token/create",
                json!({
                    "user": { "client_user_id": client_user_id },
                    "client_name": client_name,
                    "products": ["auth"],
                    "language": "en",
                    "country_codes": COUNTRY_CODES,
                }),
            )
            .await?;

        Ok(response.link_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<TokenExchange, Error> {
        self.post(
            "/item/public_token/exchange",
            json!({ "public_token": public_token }),
        )
        .await
    }

    async fn get_accounts(&self, access_token: &str) -> Result<AccountsResponse, Error> {
        self.post("/accounts/get", json!({ "access_token": access_token }))
            .await
    }

    async fn get_institution(&self, institution_id: &str) -> Result<Institution, Error> {
        let response: InstitutionResponse = self
            .post(
                "/institutions/get_by_id",
                json!({
                    "institution_id": institution_id,
                    "country_codes": COUNTRY_CODES,
                }),
            )
            .await?;

        Ok(response.institution)
    }

    async fn sync_transactions(
        &self,
        access_token: &str,
        cursor: &str,
        count: u32,
    ) -> Result<SyncPage, Error> {
        let body = serde_json::to_value(SyncRequest {
            access_token,
            cursor,
            count,
        })?;

        self.post("/transactions/sync", body).await
    }

    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, Error> {
        let response: ProcessorTokenResponse = self
            .post(
                "/processor/token/create",
                json!({
                    "access_token": access_token,
                    "account_id": account_id,
                    "processor": "dwolla",
                }),
            )
            .await?;

        Ok(response.processor_token)
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::{Value, json};

    use crate::{
        Error,
        config::{PlaidConfig, PlaidEnvironment},
        plaid::{Plaid, PlaidClient},
        test_utils::spawn_stub_server,
    };

    fn get_test_client(base_url: String) -> PlaidClient {
        PlaidClient::with_base_url(
            PlaidConfig {
                client_id: "client".to_owned(),
                secret: "shh".to_owned(),
                environment: PlaidEnvironment::Sandbox,
            },
            base_url,
        )
        .expect("could not create client")
    }

    #[tokio::test]
    async fn link_token_request_has_credentials_and_products() {
        let router = Router::new().route(
            "/link/token/create",
            post(|Json(body): Json<Value>| async move {
                let is_valid = body["client_id"] == "client"
                    && body["secret"] == "shh"
                    && body["products"] == json!(["auth"])
                    && body["country_codes"] == json!(["US"])
                    && body["language"] == "en"
                    && body["user"]["client_user_id"] == "user-doc-1"
                    && body["client_name"] == "Jane Doe";

                if is_valid {
                    Json(json!({ "link_token": "link-sandbox-123" })).into_response()
                } else {
                    StatusCode::BAD_REQUEST.into_response()
                }
            }),
        );
        let client = get_test_client(spawn_stub_server(router).await);

        let token = client
            .create_link_token("user-doc-1", "Jane Doe")
            .await
            .unwrap();

        assert_eq!(token, "link-sandbox-123");
    }

    #[tokio::test]
    async fn first_sync_request_omits_cursor() {
        let router = Router::new().route(
            "/transactions/sync",
            post(|Json(body): Json<Value>| async move {
                let has_more = body.get("cursor").is_some();

                Json(json!({
                    "added": [],
                    "next_cursor": "cursor-1",
                    "has_more": has_more,
                }))
            }),
        );
        let client = get_test_client(spawn_stub_server(router).await);

        let first = client.sync_transactions("access", "", 100).await.unwrap();
        let second = client
            .sync_transactions("access", "cursor-1", 100)
            .await
            .unwrap();

        assert!(!first.has_more);
        assert!(second.has_more);
        assert_eq!(first.next_cursor, "cursor-1");
    }

    #[tokio::test]
    async fn error_response_keeps_error_code() {
        let router = Router::new().route(
            "/accounts/get",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error_type": "INVALID_INPUT",
                        "error_code": "INVALID_ACCESS_TOKEN",
                        "error_message": "provided access token is in an invalid format",
                    })),
                )
            }),
        );
        let client = get_test_client(spawn_stub_server(router).await);

        let result = client.get_accounts("bad").await;

        assert_eq!(
            result,
            Err(Error::Plaid {
                status: 400,
                error_code: "INVALID_ACCESS_TOKEN".to_owned(),
                message: "provided access token is in an invalid format".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn processor_token_is_for_dwolla() {
        let router = Router::new().route(
            "/processor/token/create",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "processor_token": format!("processor-{}", body["processor"].as_str().unwrap_or_default()),
                }))
            }),
        );
        let client = get_test_client(spawn_stub_server(router).await);

        let token = client.create_processor_token("access", "acc1").await.unwrap();

        assert_eq!(token, "processor-dwolla");
    }
}
