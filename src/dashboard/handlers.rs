//! Home page HTTP handler and view rendering.
//!
//! This module contains:
//! - The route handler for the home page
//! - HTML view functions for the greeting, recent transactions and empty state
//! - The state used by the handler

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{AccountDetail, AccountsSummary, get_account, get_accounts},
    appwrite::Appwrite,
    auth::{Token, User, get_logged_in_user},
    dashboard::{
        cards::{profile_sidebar, total_balance_box},
        charts::{DashboardChart, ECHARTS_SCRIPT, balances_doughnut_chart, charts_script},
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, HeadElement, LINK_STYLE, base},
    navigation::NavBar,
    pagination::PaginationConfig,
    plaid::Plaid,
    transaction::{
        AccountQuery, account_tabs, count_categories, ensure_owned, paginated_transactions,
    },
};

/// The state needed for displaying the home page.
#[derive(Clone)]
pub struct DashboardState {
    /// Profiles and bank documents.
    pub appwrite: Arc<dyn Appwrite>,
    /// Account balances and transactions.
    pub plaid: Arc<dyn Plaid>,
    /// The config that controls how to display pages of transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            appwrite: state.appwrite.clone(),
            plaid: state.plaid.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Display a page with an overview of the user's banks and recent transactions.
///
/// The account whose transactions are shown is chosen with `?id=`, otherwise
/// it is the user's first account.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(token): Extension<Token>,
    Query(query): Query<AccountQuery>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(state.appwrite.as_ref(), &token).await?;
    let summary = get_accounts(state.appwrite.as_ref(), state.plaid.as_ref(), &user.id)
        .await
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    let selected_id = query
        .id
        .or_else(|| summary.data.first().map(|account| account.appwrite_item_id.clone()));

    let detail = match selected_id {
        Some(id) => {
            ensure_owned(&summary.data, &id)?;
            Some(get_account(state.appwrite.as_ref(), state.plaid.as_ref(), &id).await?)
        }
        None => None,
    };

    let page = query.page.unwrap_or(state.pagination_config.default_page);

    Ok(dashboard_view(&user, &summary, detail.as_ref(), page, &state.pagination_config).into_response())
}

fn greeting_view(user: &User) -> Markup {
    html! {
        header class="flex flex-col gap-1"
        {
            h1 class="text-2xl lg:text-3xl font-semibold"
            {
                "Welcome, "
                span class="text-blue-600 dark:text-blue-500" data-first-name { (user.first_name) }
            }
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Access and manage your account and transactions efficiently."
            }
        }
    }
}

fn recent_transactions_view(
    summary: &AccountsSummary,
    detail: &AccountDetail,
    page: u64,
    pagination_config: &PaginationConfig,
) -> Markup {
    let selected_id = &detail.data.appwrite_item_id;
    let history_url = format!(
        "{}?id={}",
        endpoints::TRANSACTION_HISTORY_VIEW,
        selected_id
    );

    html! {
        section class="flex flex-col gap-4 w-full" data-recent-transactions
        {
            header class="flex justify-between items-center"
            {
                h2 class="text-xl font-semibold" { "Recent transactions" }
                a href=(history_url) class=(LINK_STYLE) { "View all" }
            }

            (account_tabs(&summary.data, selected_id, endpoints::ROOT))
            (paginated_transactions(
                &detail.transactions,
                page,
                pagination_config,
                OffsetDateTime::now_utc(),
                |page| format!("{}?id={}&page={}", endpoints::ROOT, selected_id, page),
            ))
        }
    }
}

fn no_banks_view() -> Markup {
    html! {
        section
            class="flex flex-col items-center gap-4 w-full p-8 rounded-xl text-center
                border border-dashed border-gray-300 dark:border-gray-600"
            data-no-banks
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }
            p class="text-gray-500 dark:text-gray-400"
            {
                "Link a bank to see your balances and transactions here."
            }
            a href=(endpoints::LINK_BANK_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Link a bank" }
        }
    }
}

/// Renders the home page.
fn dashboard_view(
    user: &User,
    summary: &AccountsSummary,
    detail: Option<&AccountDetail>,
    page: u64,
    pagination_config: &PaginationConfig,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT).into_html();
    let chart = DashboardChart {
        id: "balances-chart",
        options: balances_doughnut_chart(&summary.data).to_string(),
    };
    let categories = detail
        .map(|detail| count_categories(&detail.transactions))
        .unwrap_or_default();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col xl:flex-row gap-8 px-2 lg:px-6 py-4 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            main class="flex flex-col gap-8 w-full"
            {
                (greeting_view(user))
                (total_balance_box(summary, &chart))

                @match detail {
                    Some(detail) => (recent_transactions_view(summary, detail, page, pagination_config)),
                    None => (no_banks_view()),
                }
            }

            (profile_sidebar(user, &summary.data, &categories))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&[chart]),
    ];

    base("Home", &scripts, &content)
}
