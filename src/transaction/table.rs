//! Renders transactions as a paginated table with tabs for switching accounts.

use maud::{Markup, html};
use time::{
    OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    account::Account,
    html::{CATEGORY_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    pagination::{
        PaginationConfig, clamp_page, create_pagination_indicators, page_count, page_slice,
        pagination_view,
    },
    transaction::core::{Direction, Transaction, TransactionStatus},
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_NAME_GRAPHEMES: usize = 32;

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:short], [month repr:short] [day padding:none], [year]");

const DATE_ATTRIBUTE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

fn format_name(name: &str) -> (String, Option<&str>) {
    let name_length = name.graphemes(true).count();

    if name_length <= MAX_NAME_GRAPHEMES {
        (name.to_owned(), None)
    } else {
        let truncated: String = name.graphemes(true).take(MAX_NAME_GRAPHEMES - 3).collect();
        (truncated + "...", Some(name))
    }
}

fn format_date(date: OffsetDateTime) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.date().to_string())
}

fn date_datetime_attr(date: OffsetDateTime) -> String {
    date.format(DATE_ATTRIBUTE_FORMAT)
        .unwrap_or_else(|_| date.date().to_string())
}

fn amount_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Debit => "text-red-700 dark:text-red-300",
        Direction::Credit => "text-green-700 dark:text-green-300",
    }
}

fn status_class(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Processing => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full \
            text-gray-700 bg-gray-100 dark:bg-gray-700 dark:text-gray-300"
        }
        TransactionStatus::Success => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full \
            text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
    }
}

/// Links for switching between the user's accounts.
///
/// `base_url` is the page the links point to, the selected account's bank
/// document ID is passed as the `id` query parameter.
pub fn account_tabs(accounts: &[Account], selected_id: &str, base_url: &str) -> Markup {
    let tab_class = |is_current: bool| -> &'static str {
        if is_current {
            "inline-block px-4 py-2 border-b-2 border-blue-600 text-blue-600 \
            dark:text-blue-500 dark:border-blue-500"
        } else {
            "inline-block px-4 py-2 border-b-2 border-transparent \
            hover:text-gray-600 hover:border-gray-300 dark:hover:text-gray-300"
        }
    };

    html! {
        ul
            class="flex flex-wrap -mb-px text-sm font-medium text-center text-gray-500
                border-b border-gray-200 dark:text-gray-400 dark:border-gray-700"
            data-account-tabs
        {
            @for account in accounts {
                @let is_current = account.appwrite_item_id == selected_id;
                li
                {
                    a
                        href={ (base_url) "?id=" (account.appwrite_item_id) }
                        class=(tab_class(is_current))
                        aria-current=[is_current.then_some("page")]
                    {
                        (account.name)
                    }
                }
            }
        }
    }
}

fn transaction_row_view(transaction: &Transaction, now: OffsetDateTime) -> Markup {
    let (name, tooltip) = format_name(&transaction.name);
    let status = transaction.status(now);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row=(transaction.id)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                title=[tooltip]
            {
                div class="flex items-center gap-3"
                {
                    @if let Some(image) = &transaction.image {
                        img src=(image) alt="" class="w-8 h-8 rounded-full";
                    }
                    (name)
                }
            }
            td
                class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.direction)) }
                data-direction=(transaction.direction)
            {
                (format_currency(transaction.signed_amount()))
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(status_class(status)) { (status) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(date_datetime_attr(transaction.date)) { (format_date(transaction.date)) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.payment_channel) }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.category.is_empty() {
                    span class="text-gray-400 dark:text-gray-500" { "-" }
                } @else {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }
            }
        }
    }
}

/// A table of `transactions` without pagination.
pub fn transactions_table(transactions: &[Transaction], now: OffsetDateTime) -> Markup {
    html! {
        div class="w-full overflow-x-auto"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transaction" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Channel" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row_view(transaction, now))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// One page of `transactions` with pagination links underneath.
///
/// `page` is clamped to the pages that exist. `page_url` maps a page number to
/// the URL that shows that page.
pub fn paginated_transactions<F>(
    transactions: &[Transaction],
    page: u64,
    config: &PaginationConfig,
    now: OffsetDateTime,
    page_url: F,
) -> Markup
where
    F: Fn(u64) -> String,
{
    let page_count = page_count(transactions.len(), config.default_page_size);
    let page = clamp_page(page, page_count);
    let rows = page_slice(transactions, page, config.default_page_size);

    html! {
        (transactions_table(rows, now))

        @if page_count > 1 {
            (pagination_view(
                &create_pagination_indicators(page, page_count, config.max_pages),
                page_url,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        account::Account,
        pagination::PaginationConfig,
        transaction::core::{Direction, test_transaction},
    };

    use super::{account_tabs, format_name, paginated_transactions, transactions_table};

    fn test_account(id: &str, name: &str) -> Account {
        Account {
            id: format!("acc-{id}"),
            available_balance: 0.0,
            current_balance: 0.0,
            institution_id: "ins-1".to_owned(),
            name: name.to_owned(),
            official_name: None,
            mask: "0000".to_owned(),
            account_type: "depository".to_owned(),
            subtype: "checking".to_owned(),
            appwrite_item_id: id.to_owned(),
            shareable_id: String::new(),
        }
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "a".repeat(40);

        let (truncated, tooltip) = format_name(&name);

        assert_eq!(truncated, format!("{}...", "a".repeat(29)));
        assert_eq!(tooltip, Some(name.as_str()));
    }

    #[test]
    fn short_names_are_unchanged() {
        assert_eq!(format_name("Coffee"), ("Coffee".to_owned(), None));
    }

    #[test]
    fn tabs_mark_selected_account() {
        let accounts = [test_account("bank1", "Checking"), test_account("bank2", "Savings")];

        let markup = account_tabs(&accounts, "bank2", "/transaction-history");

        let fragment = Html::parse_fragment(&markup.into_string());
        let current_selector = Selector::parse("a[aria-current='page']").unwrap();
        let current: Vec<_> = fragment.select(&current_selector).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(
            current[0].value().attr("href"),
            Some("/transaction-history?id=bank2")
        );
    }

    #[test]
    fn table_shows_signed_amounts_and_status() {
        let now = datetime!(2024-03-10 12:00 UTC);
        let mut debit = test_transaction("1", now - Duration::days(10));
        debit.amount = 12.5;
        let mut credit = test_transaction("2", now - Duration::hours(1));
        credit.direction = Direction::Credit;
        credit.amount = 100.0;

        let markup = transactions_table(&[debit, credit], now);

        let fragment = Html::parse_fragment(&markup.into_string());
        let row_selector = Selector::parse("tr[data-transaction-row]").unwrap();
        let rows: Vec<String> = fragment
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("-$12.50"));
        assert!(rows[0].contains("Success"));
        assert!(rows[0].contains("Thu, Feb 29, 2024"));
        assert!(rows[1].contains("$100.00"));
        assert!(rows[1].contains("Processing"));
    }

    #[test]
    fn paginates_ten_rows_per_page() {
        let now = OffsetDateTime::now_utc();
        let transactions: Vec<_> = (0..25)
            .map(|i| test_transaction(&i.to_string(), now - Duration::days(i)))
            .collect();

        let markup = paginated_transactions(
            &transactions,
            3,
            &PaginationConfig::default(),
            now,
            |page| format!("/?page={page}"),
        );

        let fragment = Html::parse_fragment(&markup.into_string());
        let row_selector = Selector::parse("tr[data-transaction-row]").unwrap();
        let ids: Vec<&str> = fragment
            .select(&row_selector)
            .map(|row| row.value().attr("data-transaction-row").unwrap())
            .collect();
        assert_eq!(ids, ["20", "21", "22", "23", "24"]);
        let current_selector = Selector::parse("[aria-current='page']").unwrap();
        let current = fragment.select(&current_selector).next().unwrap();
        assert_eq!(current.text().collect::<String>(), "3");
    }

    #[test]
    fn single_page_has_no_pagination() {
        let now = OffsetDateTime::now_utc();
        let transactions = [test_transaction("1", now)];

        let markup =
            paginated_transactions(&transactions, 1, &PaginationConfig::default(), now, |page| {
                format!("/?page={page}")
            });

        let fragment = Html::parse_fragment(&markup.into_string());
        let nav_selector = Selector::parse("nav.pagination").unwrap();
        assert!(fragment.select(&nav_selector).next().is_none());
    }
}
