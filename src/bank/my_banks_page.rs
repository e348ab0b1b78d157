//! The page that lists the user's linked bank accounts.

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
    auth::{Token, User, get_logged_in_user},
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    plaid::Plaid,
};

/// The state needed for the my-banks page.
#[derive(Clone)]
pub struct MyBanksState {
    pub appwrite: Arc<dyn Appwrite>,
    pub plaid: Arc<dyn Plaid>,
}

impl FromRef<AppState> for MyBanksState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            appwrite: state.appwrite.clone(),
            plaid: state.plaid.clone(),
        }
    }
}

/// A card that looks like a bank card for `account`.
///
/// The card links to the account's transaction history. If `show_shareable_id`
/// is set, the shareable ID is shown under the card.
pub(crate) fn bank_card(account: &Account, owner_name: &str, show_shareable_id: bool) -> Markup {
    let history_url = format!(
        "{}?id={}",
        endpoints::TRANSACTION_HISTORY_VIEW,
        account.appwrite_item_id
    );

    html! {
        div class="flex flex-col gap-2" data-bank-card=(account.appwrite_item_id)
        {
            a
                href=(history_url)
                class="flex flex-col justify-between w-full max-w-sm h-44 p-5 rounded-2xl
                    text-white bg-gradient-to-br from-blue-600 to-blue-900 shadow-lg"
            {
                div class="flex justify-between"
                {
                    div
                    {
                        p class="text-base font-semibold" { (account.name) }
                        p class="text-sm text-blue-100" { (owner_name) }
                    }

                    p class="text-lg font-bold tabular-nums" data-balance
                    {
                        (format_currency(account.current_balance))
                    }
                }

                p class="text-sm font-semibold tracking-widest" data-mask
                {
                    "●●●● ●●●● ●●●● " (account.mask)
                }
            }

            @if show_shareable_id {
                p class="text-xs text-gray-500 dark:text-gray-400"
                {
                    "Shareable ID: "
                    code class="break-all text-gray-900 dark:text-white" data-shareable-id
                    {
                        (account.shareable_id)
                    }
                }
            }
        }
    }
}

fn my_banks_view(user: &User, accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::new(endpoints::MY_BANKS_VIEW).into_html();
    let owner_name = user.full_name();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "My Bank Accounts" }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "Effortlessly manage your banking activities. Give the \
                            shareable ID of an account to anyone who wants to send you money."
                        }
                    }

                    a href=(endpoints::LINK_BANK_VIEW) class=(LINK_STYLE) { "Add Bank" }
                }

                @if accounts.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "You have not linked any banks yet. "
                        a href=(endpoints::LINK_BANK_VIEW) class=(LINK_STYLE) { "Link a bank" }
                        " to get started."
                    }
                } @else {
                    div class="grid gap-6 sm:grid-cols-2 lg:grid-cols-3"
                    {
                        @for account in accounts {
                            (bank_card(account, &owner_name, true))
                        }
                    }
                }
            }
        }
    };

    base("My Banks", &[], &content)
}

/// Render the cards of the signed in user's linked bank accounts.
pub async fn get_my_banks_page(
    State(state): State<MyBanksState>,
    Extension(token): Extension<Token>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;
    let accounts = get_accounts(state.appwrite.as_ref(), state.plaid.as_ref(), &user.id).await?;

    Ok(my_banks_view(&user, &accounts.data).into_response())
}
