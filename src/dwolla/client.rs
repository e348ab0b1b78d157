use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE, LOCATION},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{
    Error,
    config::DwollaConfig,
    dwolla::{Dwolla, NewCustomer},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MEDIA_TYPE: &str = "application/vnd.dwolla.v1.hal+json";
/// Access tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Talks to the Dwolla REST API, authenticating with the client credentials
/// grant.
#[derive(Debug)]
pub struct DwollaClient {
    config: DwollaConfig,
    base_url: String,
    http: Client,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

#[derive(Deserialize)]
struct SelfLinks {
    #[serde(rename = "self")]
    self_link: Link,
}

#[derive(Deserialize)]
struct OnDemandAuthorization {
    #[serde(rename = "_links")]
    links: SelfLinks,
}

impl DwollaClient {
    /// Create a client for the environment in `config`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HttpError] if the HTTP client could not be built.
    pub fn new(config: DwollaConfig) -> Result<Self, Error> {
        let base_url = config.environment.base_url().to_owned();

        Self::with_base_url(config, base_url)
    }

    /// Create a client that sends requests to `base_url` instead of the
    /// configured environment.
    pub fn with_base_url(config: DwollaConfig, base_url: String) -> Result<Self, Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            config,
            base_url,
            http,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Get a cached access token, requesting a new one if there is none or it
    /// is about to expire.
    async fn access_token(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;

        match cached.as_ref() {
            Some(token) if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at => {
                return Ok(token.value.clone());
            }
            _ => {}
        }

        tracing::debug!("Requesting a new Dwolla access token");

        let response = self
            .http
            .post(self.url("/token"))
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = parse_json(response).await?;
        let value = token.access_token.clone();

        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Response, Error> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .header(ACCEPT, MEDIA_TYPE)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(into_error(response).await)
        }
    }

    /// POST `body` to `path` and return the URL of the created resource.
    async fn create(&self, path: &str, body: &Value, resource: &'static str) -> Result<String, Error> {
        let response = self.post(path, body).await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|location| location.to_str().ok())
            .map(str::to_owned)
            .ok_or(Error::MissingLocationHeader(resource))
    }
}

async fn into_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.json::<ErrorBody>().await.unwrap_or_default();

    Error::Dwolla {
        status,
        message: body.message,
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    if !response.status().is_success() {
        return Err(into_error(response).await);
    }

    Ok(response.json().await?)
}

#[async_trait]
impl Dwolla for DwollaClient {
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, Error> {
        let body = serde_json::to_value(customer)?;

        self.create("/customers", &body, "customer").await
    }

    async fn create_funding_source(
        &self,
        customer_id: &str,
        processor_token: &str,
        bank_name: &str,
    ) -> Result<String, Error> {
        let response = self.post("/on-demand-authorizations", &json!({})).await?;
        let authorization: OnDemandAuthorization = response.json().await?;

        let body = json!({
            "name": bank_name,
            "plaidToken": processor_token,
            "_links": {
                "on-demand-authorization": { "href": authorization.links.self_link.href },
            },
        });

        self.create(
            &format!("/customers/{customer_id}/funding-sources"),
            &body,
            "funding source",
        )
        .await
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: f64,
    ) -> Result<String, Error> {
        let body = json!({
            "_links": {
                "source": { "href": source_funding_source_url },
                "destination": { "href": destination_funding_source_url },
            },
            "amount": {
                "currency": "USD",
                "value": format!("{amount:.2}"),
            },
        });

        self.create("/transfers", &body, "transfer").await
    }
}
