//! The transaction history page for one of the user's accounts.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{Account, AccountDetail, get_account, get_accounts},
    appwrite::Appwrite,
    auth::{Token, get_logged_in_user},
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    pagination::PaginationConfig,
    plaid::Plaid,
    transaction::table::{account_tabs, paginated_transactions},
};

/// The state needed for the transaction history page.
#[derive(Clone)]
pub struct TransactionHistoryState {
    pub appwrite: Arc<dyn Appwrite>,
    pub plaid: Arc<dyn Plaid>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionHistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            appwrite: state.appwrite.clone(),
            plaid: state.plaid.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Selects the account and page of transactions to display.
#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    /// The bank document ID of the account. Defaults to the user's first account.
    pub id: Option<String>,
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
}

fn account_header_view(account: &Account) -> Markup {
    html! {
        div
            class="flex flex-wrap justify-between items-center gap-4 w-full p-6 rounded-lg
                text-white bg-blue-600 dark:bg-blue-800"
            data-account-header
        {
            div class="flex flex-col gap-2"
            {
                h2 class="text-lg font-bold" { (account.name) }
                @if let Some(official_name) = &account.official_name {
                    p class="text-sm text-blue-100" { (official_name) }
                }
                p class="text-xs font-semibold tracking-widest"
                {
                    "●●●● ●●●● ●●●● " (account.mask)
                }
            }

            div class="flex flex-col items-center gap-1 px-4 py-2 rounded-lg bg-blue-500/40"
            {
                p class="text-sm" { "Current Balance" }
                p class="text-2xl font-bold tabular-nums" { (format_currency(account.current_balance)) }
            }
        }
    }
}

fn transaction_history_view(
    accounts: &[Account],
    detail: Option<&AccountDetail>,
    page: u64,
    pagination_config: &PaginationConfig,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTION_HISTORY_VIEW).into_html();
    let now = OffsetDateTime::now_utc();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-6"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Transaction History" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "See your bank details and transactions."
                    }
                }

                @match detail {
                    Some(detail) => {
                        @let selected_id = &detail.data.appwrite_item_id;

                        (account_tabs(accounts, selected_id, endpoints::TRANSACTION_HISTORY_VIEW))
                        (account_header_view(&detail.data))
                        (paginated_transactions(
                            &detail.transactions,
                            page,
                            pagination_config,
                            now,
                            |page| format!(
                                "{}?id={}&page={}",
                                endpoints::TRANSACTION_HISTORY_VIEW,
                                selected_id,
                                page
                            ),
                        ))
                    }
                    None => {
                        p class="text-center text-gray-500 dark:text-gray-400"
                        {
                            "You have not linked any banks yet. "
                            a href=(endpoints::LINK_BANK_VIEW) class=(LINK_STYLE) { "Link a bank" }
                            " to see its transactions."
                        }
                    }
                }
            }
        }
    };

    base("Transaction History", &[], &content)
}

/// Render the transactions of the account chosen with `?id=`, or the user's
/// first account.
pub async fn get_transaction_history_page(
    State(state): State<TransactionHistoryState>,
    Extension(token): Extension<Token>,
    Query(query): Query<AccountQuery>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;
    let accounts = get_accounts(state.appwrite.as_ref(), state.plaid.as_ref(), &user.id).await?;

    let selected_id = query
        .id
        .or_else(|| accounts.data.first().map(|account| account.appwrite_item_id.clone()));

    let detail = match selected_id {
        Some(id) => {
            ensure_owned(&accounts.data, &id)?;
            Some(get_account(state.appwrite.as_ref(), state.plaid.as_ref(), &id).await?)
        }
        None => None,
    };

    let page = query
        .page
        .unwrap_or(state.pagination_config.default_page);

    Ok(transaction_history_view(
        &accounts.data,
        detail.as_ref(),
        page,
        &state.pagination_config,
    )
    .into_response())
}

/// Users may only view the accounts they linked.
pub(crate) fn ensure_owned(accounts: &[Account], appwrite_item_id: &str) -> Result<(), Error> {
    if accounts
        .iter()
        .any(|account| account.appwrite_item_id == appwrite_item_id)
    {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}
