//! The transaction shape shared by bank transactions and transfer records.

use std::fmt::Display;

use time::{Date, Duration, OffsetDateTime, Time};

use crate::plaid::PlaidTransaction;

/// Which way money moved relative to the account being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Money left the account.
    Debit,
    /// Money entered the account.
    Credit,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Debit => write!(f, "debit"),
            Direction::Credit => write!(f, "credit"),
        }
    }
}

/// Whether a transaction has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Processing,
    Success,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Processing => write!(f, "Processing"),
            TransactionStatus::Success => write!(f, "Success"),
        }
    }
}

/// Transactions this recent are shown as processing even if the bank says
/// they have settled.
const PROCESSING_PERIOD: Duration = Duration::days(2);

/// A transaction for display, either from the bank or a transfer between
/// Horizon users.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The Plaid transaction ID or the transfer document ID.
    pub id: String,
    /// The merchant, description or transfer note.
    pub name: String,
    /// The amount of money that moved, always zero or positive.
    pub amount: f64,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// How the transaction was made, e.g. "online".
    pub payment_channel: String,
    /// The spending category, empty if the bank did not give one.
    pub category: String,
    /// Whether money left or entered the account.
    pub direction: Direction,
    /// Whether the bank has yet to settle the transaction.
    pub pending: bool,
    /// The Plaid account the transaction belongs to.
    pub account_id: Option<String>,
    /// The merchant logo.
    pub image: Option<String>,
}

impl Transaction {
    /// The amount with a leading minus sign for debits.
    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
        }
    }

    /// The status to show for the transaction at `now`.
    pub fn status(&self, now: OffsetDateTime) -> TransactionStatus {
        if self.pending || self.date > now - PROCESSING_PERIOD {
            TransactionStatus::Processing
        } else {
            TransactionStatus::Success
        }
    }
}

impl From<PlaidTransaction> for Transaction {
    fn from(transaction: PlaidTransaction) -> Self {
        // Plaid reports money leaving the account as a positive amount.
        let direction = if transaction.amount > 0.0 {
            Direction::Debit
        } else {
            Direction::Credit
        };

        let category = transaction
            .category
            .and_then(|categories| categories.into_iter().next())
            .or(transaction
                .personal_finance_category
                .map(|category| category.primary))
            .unwrap_or_default();

        Self {
            id: transaction.transaction_id,
            name: transaction.name,
            amount: transaction.amount.abs(),
            date: midnight_utc(transaction.date),
            payment_channel: transaction.payment_channel,
            category,
            direction,
            pending: transaction.pending,
            account_id: Some(transaction.account_id),
            image: transaction.logo_url,
        }
    }
}

fn midnight_utc(date: Date) -> OffsetDateTime {
    date.with_time(Time::MIDNIGHT).assume_utc()
}

/// Combine bank transactions with transfer records, most recent first.
///
/// Transactions on the same date keep their relative order.
pub fn merge_transactions(
    bank_transactions: Vec<Transaction>,
    transfers: Vec<Transaction>,
) -> Vec<Transaction> {
    let mut transactions = bank_transactions;
    transactions.extend(transfers);
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    transactions
}

/// Count the transactions in each category, most common first.
///
/// Transactions without a category are counted as "Uncategorized". Categories
/// with the same count are ordered by name.
pub fn count_categories(transactions: &[Transaction]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for transaction in transactions {
        let category = if transaction.category.is_empty() {
            "Uncategorized"
        } else {
            &transaction.category
        };

        match counts.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category.to_owned(), 1)),
        }
    }

    counts.sort_by(|(a_name, a_count), (b_name, b_count)| {
        b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
    });

    counts
}

#[cfg(test)]
pub(crate) fn test_transaction(id: &str, date: OffsetDateTime) -> Transaction {
    Transaction {
        id: id.to_owned(),
        name: format!("Transaction {id}"),
        amount: 10.0,
        date,
        payment_channel: "online".to_owned(),
        category: "Food and Drink".to_owned(),
        direction: Direction::Debit,
        pending: false,
        account_id: None,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::plaid::{PersonalFinanceCategory, PlaidTransaction};

    use super::{
        Direction, Transaction, TransactionStatus, count_categories, merge_transactions,
        test_transaction,
    };

    fn plaid_transaction(amount: f64) -> PlaidTransaction {
        serde_json::from_value(serde_json::json!({
            "transaction_id": "tx-1",
            "account_id": "acc-1",
            "amount": amount,
            "date": "2024-03-05",
            "name": "Uber 063015 SF**POOL**",
            "payment_channel": "online",
            "pending": false,
            "category": ["Travel", "Taxi"],
            "logo_url": "https://plaid-merchant-logos.plaid.com/uber_1060.png"
        }))
        .unwrap()
    }

    #[test]
    fn positive_plaid_amount_is_debit() {
        let transaction = Transaction::from(plaid_transaction(5.4));

        assert_eq!(transaction.direction, Direction::Debit);
        assert_eq!(transaction.amount, 5.4);
        assert_eq!(transaction.signed_amount(), -5.4);
    }

    #[test]
    fn negative_plaid_amount_is_credit() {
        let transaction = Transaction::from(plaid_transaction(-500.0));

        assert_eq!(transaction.direction, Direction::Credit);
        assert_eq!(transaction.amount, 500.0);
    }

    #[test]
    fn maps_plaid_fields() {
        let transaction = Transaction::from(plaid_transaction(5.4));

        assert_eq!(transaction.id, "tx-1");
        assert_eq!(transaction.category, "Travel");
        assert_eq!(transaction.date, datetime!(2024-03-05 0:00 UTC));
        assert_eq!(transaction.account_id.as_deref(), Some("acc-1"));
        assert_eq!(
            transaction.image.as_deref(),
            Some("https://plaid-merchant-logos.plaid.com/uber_1060.png")
        );
    }

    #[test]
    fn falls_back_to_personal_finance_category() {
        let mut plaid = plaid_transaction(5.4);
        plaid.category = None;
        plaid.personal_finance_category = Some(PersonalFinanceCategory {
            primary: "TRANSPORTATION".to_owned(),
        });

        let transaction = Transaction::from(plaid);

        assert_eq!(transaction.category, "TRANSPORTATION");
    }

    #[test]
    fn category_is_empty_without_any_category() {
        let mut plaid = plaid_transaction(5.4);
        plaid.category = Some(Vec::new());

        let transaction = Transaction::from(plaid);

        assert_eq!(transaction.category, "");
    }

    #[test]
    fn pending_transaction_is_processing() {
        let now = OffsetDateTime::now_utc();
        let mut transaction = test_transaction("1", now - Duration::days(30));
        transaction.pending = true;

        assert_eq!(transaction.status(now), TransactionStatus::Processing);
    }

    #[test]
    fn recent_transaction_is_processing() {
        let now = OffsetDateTime::now_utc();
        let transaction = test_transaction("1", now - Duration::days(1));

        assert_eq!(transaction.status(now), TransactionStatus::Processing);
    }

    #[test]
    fn old_settled_transaction_is_success() {
        let now = OffsetDateTime::now_utc();
        let transaction = test_transaction("1", now - Duration::days(3));

        assert_eq!(transaction.status(now), TransactionStatus::Success);
    }

    #[test]
    fn merge_sorts_most_recent_first() {
        let bank = vec![
            test_transaction("bank-old", datetime!(2024-01-01 0:00 UTC)),
            test_transaction("bank-new", datetime!(2024-03-01 0:00 UTC)),
        ];
        let transfers = vec![test_transaction("transfer", datetime!(2024-02-01 12:30 UTC))];

        let merged = merge_transactions(bank, transfers);

        let ids: Vec<&str> = merged.iter().map(|transaction| transaction.id.as_str()).collect();
        assert_eq!(ids, ["bank-new", "transfer", "bank-old"]);
    }

    #[test]
    fn merge_keeps_order_of_same_date() {
        let date = datetime!(2024-01-01 0:00 UTC);
        let bank = vec![test_transaction("a", date), test_transaction("b", date)];
        let transfers = vec![test_transaction("c", date)];

        let merged = merge_transactions(bank, transfers);

        let ids: Vec<&str> = merged.iter().map(|transaction| transaction.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn counts_categories_most_common_first() {
        let date = datetime!(2024-01-01 0:00 UTC);
        let mut transactions = vec![
            test_transaction("1", date),
            test_transaction("2", date),
            test_transaction("3", date),
            test_transaction("4", date),
        ];
        transactions[0].category = "Travel".to_owned();
        transactions[3].category = String::new();

        let counts = count_categories(&transactions);

        assert_eq!(
            counts,
            [
                ("Food and Drink".to_owned(), 2),
                ("Travel".to_owned(), 1),
                ("Uncategorized".to_owned(), 1),
            ]
        );
    }
}
