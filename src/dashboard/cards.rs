//! Card components for the home page.
//!
//! Provides:
//! - The total balance box with the number of banks and a balance chart
//! - The profile sidebar with the user's bank cards
//! - The top categories of the selected account's transactions

use maud::{Markup, html};

use crate::{
    account::{Account, AccountsSummary},
    auth::User,
    bank::bank_card,
    dashboard::charts::{DashboardChart, chart_view},
    endpoints,
    html::{LINK_STYLE, format_currency},
};

/// Bank cards shown in the sidebar, the rest are on the my-banks page.
const MAX_SIDEBAR_BANK_CARDS: usize = 2;

/// Categories listed in the sidebar.
const MAX_TOP_CATEGORIES: usize = 3;

/// Renders the total balance box.
pub(super) fn total_balance_box(summary: &AccountsSummary, chart: &DashboardChart) -> Markup {
    let bank_label = if summary.total_banks == 1 {
        "Bank Account"
    } else {
        "Bank Accounts"
    };

    html! {
        section
            class="flex items-center gap-4 sm:gap-6 w-full p-4 sm:p-6 rounded-xl
                border border-gray-200 shadow-sm bg-white
                dark:bg-gray-800 dark:border-gray-700"
            data-total-balance
        {
            (chart_view(chart))

            div class="flex flex-col gap-4"
            {
                h2 class="text-lg font-semibold" data-total-banks
                {
                    (summary.total_banks) " " (bank_label)
                }

                div class="flex flex-col gap-1"
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Total Current Balance" }
                    p class="text-2xl sm:text-3xl font-bold tabular-nums" data-total-current-balance
                    {
                        (format_currency(summary.total_current_balance))
                    }
                }
            }
        }
    }
}

/// Renders the right sidebar with the user's profile and banks.
pub(super) fn profile_sidebar(
    user: &User,
    accounts: &[Account],
    categories: &[(String, usize)],
) -> Markup {
    let full_name = user.full_name();
    let initial = user.first_name.chars().next().unwrap_or('?');

    html! {
        aside class="flex flex-col gap-8 w-full xl:w-96 xl:shrink-0" data-profile-sidebar
        {
            section class="flex flex-col gap-2"
            {
                div
                    class="flex items-center justify-center w-16 h-16 rounded-full
                        text-2xl font-bold text-blue-600 bg-blue-100
                        dark:bg-blue-900 dark:text-blue-300"
                {
                    (initial)
                }
                h2 class="text-xl font-semibold" data-profile-name { (full_name) }
                p class="text-sm text-gray-500 dark:text-gray-400" data-profile-email { (user.email) }
            }

            section class="flex flex-col gap-4"
            {
                div class="flex justify-between items-baseline"
                {
                    h2 class="text-lg font-semibold" { "My Banks" }
                    a href=(endpoints::LINK_BANK_VIEW) class=(LINK_STYLE) { "+ Add Bank" }
                }

                @for account in accounts.iter().take(MAX_SIDEBAR_BANK_CARDS) {
                    (bank_card(account, &full_name, false))
                }
            }

            @if !categories.is_empty() {
                (top_categories_view(categories))
            }
        }
    }
}

fn top_categories_view(categories: &[(String, usize)]) -> Markup {
    let total: usize = categories.iter().map(|(_, count)| count).sum();

    html! {
        section class="flex flex-col gap-4" data-top-categories
        {
            h2 class="text-lg font-semibold" { "Top Categories" }

            ul class="flex flex-col gap-3"
            {
                @for (category, count) in categories.iter().take(MAX_TOP_CATEGORIES) {
                    @let percent = (*count as f64 / total as f64 * 100.0).round();

                    li class="flex flex-col gap-1" data-category=(category)
                    {
                        div class="flex justify-between text-sm"
                        {
                            span class="font-medium" { (category) }
                            span class="text-gray-500 dark:text-gray-400" data-category-count
                            {
                                (count)
                            }
                        }
                        div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
                        {
                            div
                                class="h-2 rounded-full bg-blue-600"
                                style={ "width: " (percent) "%" }
                            {}
                        }
                    }
                }
            }
        }
    }
}
