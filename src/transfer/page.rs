//! The payment transfer page.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    account::{Account, get_accounts},
    appwrite::Appwrite,
    auth::{Token, get_logged_in_user},
    dwolla::Dwolla,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    plaid::Plaid,
    transfer::form::{FormErrors, TransferForm, transfer_form},
};

/// The state needed for the payment transfer page and endpoint.
#[derive(Clone)]
pub struct TransferState {
    pub appwrite: Arc<dyn Appwrite>,
    pub plaid: Arc<dyn Plaid>,
    pub dwolla: Arc<dyn Dwolla>,
}

impl FromRef<AppState> for TransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            appwrite: state.appwrite.clone(),
            plaid: state.plaid.clone(),
            dwolla: state.dwolla.clone(),
        }
    }
}

fn payment_transfer_view(accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::new(endpoints::PAYMENT_TRANSFER_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-xl space-y-6"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Payment Transfer" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Please provide any specific details or notes related to the payment transfer."
                    }
                }

                @if accounts.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "You need a linked bank to send money. "
                        a href=(endpoints::LINK_BANK_VIEW) class=(LINK_STYLE) { "Link a bank" }
                        " first."
                    }
                } @else {
                    (transfer_form(accounts, &TransferForm::default(), &FormErrors::new()))
                }
            }
        }
    };

    base("Payment Transfer", &[dollar_input_styles()], &content)
}

/// Render the transfer form with the signed in user's banks as sources.
pub async fn get_payment_transfer_page(
    State(state): State<TransferState>,
    Extension(token): Extension<Token>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;
    let accounts = get_accounts(state.appwrite.as_ref(), state.plaid.as_ref(), &user.id).await?;

    Ok(payment_transfer_view(&accounts.data).into_response())
}
