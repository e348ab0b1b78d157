//! Linking a bank account with the Plaid Link widget.
//!
//! The link-bank page creates a link token and hands it to the widget. Once
//! the user picks an account, the widget's public token is posted back and
//! exchanged for an access token, a Dwolla funding source and a bank document.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    appwrite::Appwrite,
    auth::{Token, User, get_logged_in_user},
    bank::core::{Bank, NewBank, create_bank_account},
    dwolla::Dwolla,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, HeadElement, auth_layout, base, link, loading_spinner},
    plaid::Plaid,
    shareable_id::encode_shareable_id,
};

/// The hosted script that provides the Plaid Link widget.
const PLAID_LINK_SCRIPT: &str = "https://cdn.plaid.com/link/v2/stable/link-initialize.js";

/// Create a Plaid link token for `user`.
pub async fn create_link_token(plaid: &dyn Plaid, user: &User) -> Result<String, Error> {
    plaid.create_link_token(&user.id, &user.full_name()).await
}

/// Exchange the widget's `public_token` and register the first account of the
/// linked item as a bank for `user`.
///
/// # Errors
///
/// Returns [Error::NoAccounts] if the item has no accounts, or the error of
/// whichever API call failed.
pub async fn exchange_public_token(
    appwrite: &dyn Appwrite,
    plaid: &dyn Plaid,
    dwolla: &dyn Dwolla,
    public_token: &str,
    user: &User,
) -> Result<Bank, Error> {
    let exchange = plaid.exchange_public_token(public_token).await?;
    let accounts = plaid.get_accounts(&exchange.access_token).await?;
    let account = accounts.accounts.first().ok_or(Error::NoAccounts)?;

    let processor_token = plaid
        .create_processor_token(&exchange.access_token, &account.account_id)
        .await?;
    let funding_source_url = dwolla
        .create_funding_source(&user.dwolla_customer_id, &processor_token, &account.name)
        .await?;

    let bank = create_bank_account(
        appwrite,
        &NewBank {
            user_id: user.id.clone(),
            bank_id: exchange.item_id,
            account_id: account.account_id.clone(),
            access_token: exchange.access_token,
            funding_source_url,
            shareable_id: encode_shareable_id(&account.account_id),
        },
    )
    .await?;

    tracing::info!("User {} linked bank {}", user.id, bank.id);

    Ok(bank)
}

/// The state needed to link a bank.
#[derive(Clone)]
pub struct LinkBankState {
    pub appwrite: Arc<dyn Appwrite>,
    pub plaid: Arc<dyn Plaid>,
    pub dwolla: Arc<dyn Dwolla>,
}

impl FromRef<AppState> for LinkBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            appwrite: state.appwrite.clone(),
            plaid: state.plaid.clone(),
            dwolla: state.dwolla.clone(),
        }
    }
}

fn link_bank_view(link_token: &str) -> Markup {
    let form = html! {
        div class="space-y-4"
        {
            button
                id="plaid-link-button"
                type="button"
                class=(BUTTON_PRIMARY_STYLE)
                data-link-token=(link_token)
                data-exchange-url=(endpoints::EXCHANGE_PUBLIC_TOKEN_API)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Connect bank"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already linked your banks? " (link(endpoints::ROOT, "Go to your dashboard"))
            }
        }
    };

    let content = auth_layout(
        "Link account",
        "Link your bank account to get started.",
        &form,
    );

    base(
        "Link Bank",
        &[HeadElement::ScriptLink(PLAID_LINK_SCRIPT.to_owned())],
        &content,
    )
}

/// Render the page with the Plaid Link button for the signed in user.
pub async fn get_link_bank_page(
    State(state): State<LinkBankState>,
    Extension(token): Extension<Token>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;
    let link_token = create_link_token(state.plaid.as_ref(), &user).await?;

    Ok(link_bank_view(&link_token).into_response())
}

/// The form data posted by the Plaid Link widget.
#[derive(Debug, Deserialize)]
pub struct PublicTokenForm {
    /// The short-lived token from the widget.
    pub public_token: String,
}

/// Exchange the public token from the Plaid Link widget and redirect to the
/// home page.
pub async fn post_exchange_public_token(
    State(state): State<LinkBankState>,
    Extension(token): Extension<Token>,
    Form(form): Form<PublicTokenForm>,
) -> Response {
    let result = async {
        let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;

        exchange_public_token(
            state.appwrite.as_ref(),
            state.plaid.as_ref(),
            state.dwolla.as_ref(),
            &form.public_token,
            &user,
        )
        .await
    }
    .await;

    match result {
        Ok(_) => {
            (HxRedirect(endpoints::ROOT.to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
