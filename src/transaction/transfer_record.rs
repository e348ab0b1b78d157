//! Transfer records: the documents that remember transfers between Horizon users.
//!
//! Plaid does not know that a transfer was made through Horizon, so each
//! transfer is recorded and shown next to the bank's own transactions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::{
    Error,
    appwrite::{Appwrite, Collection, Query, documents},
    transaction::core::{Direction, Transaction},
};

/// The payment channel of every transfer record.
const TRANSFER_CHANNEL: &str = "online";
/// The category of every transfer record.
const TRANSFER_CATEGORY: &str = "Transfer";

/// A stored transfer between two banks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// The ID of the transfer document.
    #[serde(rename = "$id")]
    pub id: String,
    /// When the transfer was made.
    #[serde(rename = "$createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The note the sender gave the transfer.
    pub name: String,
    /// The amount transferred.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub channel: String,
    pub category: String,
    /// The sender's profile document ID.
    pub sender_id: String,
    /// The sender's bank document ID.
    pub sender_bank_id: String,
    /// The receiver's profile document ID.
    pub receiver_id: String,
    /// The receiver's bank document ID.
    pub receiver_bank_id: String,
    /// The receiver's email.
    pub email: String,
}

impl TransferRecord {
    /// Convert the record into a transaction as seen from the bank `bank_id`.
    pub fn to_transaction(&self, bank_id: &str) -> Transaction {
        let direction = if self.sender_bank_id == bank_id {
            Direction::Debit
        } else {
            Direction::Credit
        };

        Transaction {
            id: self.id.clone(),
            name: self.name.clone(),
            amount: self.amount.abs(),
            date: self.created_at,
            payment_channel: self.channel.clone(),
            category: self.category.clone(),
            direction,
            pending: false,
            account_id: None,
            image: None,
        }
    }
}

/// The details of a transfer to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub name: String,
    pub amount: f64,
    pub sender_id: String,
    pub sender_bank_id: String,
    pub receiver_id: String,
    pub receiver_bank_id: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferDocument<'a> {
    name: &'a str,
    #[serde(serialize_with = "serialize_amount")]
    amount: f64,
    channel: &'a str,
    category: &'a str,
    sender_id: &'a str,
    sender_bank_id: &'a str,
    receiver_id: &'a str,
    receiver_bank_id: &'a str,
    email: &'a str,
}

// Amounts are stored as strings with two decimal places.
fn serialize_amount<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{amount:.2}"))
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(amount) => Ok(amount),
        Amount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount \"{text}\""))),
    }
}

/// Record a transfer.
pub async fn create_transaction(
    appwrite: &dyn Appwrite,
    transfer: &NewTransfer,
) -> Result<TransferRecord, Error> {
    let document = TransferDocument {
        name: &transfer.name,
        amount: transfer.amount,
        channel: TRANSFER_CHANNEL,
        category: TRANSFER_CATEGORY,
        sender_id: &transfer.sender_id,
        sender_bank_id: &transfer.sender_bank_id,
        receiver_id: &transfer.receiver_id,
        receiver_bank_id: &transfer.receiver_bank_id,
        email: &transfer.email,
    };

    documents::create(appwrite, Collection::Transactions, &document).await
}

/// Get the transfers the bank `bank_id` sent or received.
pub async fn get_transactions_by_bank_id(
    appwrite: &dyn Appwrite,
    bank_id: &str,
) -> Result<Vec<TransferRecord>, Error> {
    let sent: Vec<TransferRecord> = documents::list(
        appwrite,
        Collection::Transactions,
        &[Query::equal("senderBankId", bank_id)],
    )
    .await?;
    let received: Vec<TransferRecord> = documents::list(
        appwrite,
        Collection::Transactions,
        &[Query::equal("receiverBankId", bank_id)],
    )
    .await?;

    let mut transfers = sent;
    for transfer in received {
        if !transfers.iter().any(|sent| sent.id == transfer.id) {
            transfers.push(transfer);
        }
    }

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        appwrite::Collection,
        test_utils::FakeAppwrite,
        transaction::core::Direction,
    };

    use super::{NewTransfer, TransferRecord, create_transaction, get_transactions_by_bank_id};

    fn new_transfer(sender_bank_id: &str, receiver_bank_id: &str) -> NewTransfer {
        NewTransfer {
            name: "Rent".to_owned(),
            amount: 12.5,
            sender_id: "user-a".to_owned(),
            sender_bank_id: sender_bank_id.to_owned(),
            receiver_id: "user-b".to_owned(),
            receiver_bank_id: receiver_bank_id.to_owned(),
            email: "b@example.com".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_transaction_records_online_transfer() {
        let appwrite = FakeAppwrite::new();

        let record = create_transaction(&appwrite, &new_transfer("bank-a", "bank-b"))
            .await
            .unwrap();

        assert_eq!(record.channel, "online");
        assert_eq!(record.category, "Transfer");
        assert_eq!(record.amount, 12.5);
        let stored = &appwrite.documents(Collection::Transactions)[0];
        assert_eq!(stored["amount"], "12.50");
        assert_eq!(stored["senderBankId"], "bank-a");
        assert_eq!(stored["receiverBankId"], "bank-b");
    }

    #[tokio::test]
    async fn get_transactions_by_bank_id_returns_sent_and_received() {
        let appwrite = FakeAppwrite::new();
        let sent = create_transaction(&appwrite, &new_transfer("bank-a", "bank-b"))
            .await
            .unwrap();
        let received = create_transaction(&appwrite, &new_transfer("bank-c", "bank-a"))
            .await
            .unwrap();
        create_transaction(&appwrite, &new_transfer("bank-c", "bank-b"))
            .await
            .unwrap();

        let transfers = get_transactions_by_bank_id(&appwrite, "bank-a").await.unwrap();

        assert_eq!(transfers, [sent, received]);
    }

    #[tokio::test]
    async fn transfer_to_same_bank_is_listed_once() {
        let appwrite = FakeAppwrite::new();
        create_transaction(&appwrite, &new_transfer("bank-a", "bank-a"))
            .await
            .unwrap();

        let transfers = get_transactions_by_bank_id(&appwrite, "bank-a").await.unwrap();

        assert_eq!(transfers.len(), 1);
    }

    #[test]
    fn direction_depends_on_viewing_bank() {
        let record: TransferRecord = serde_json::from_value(json!({
            "$id": "doc1",
            "$createdAt": "2024-03-05T10:00:00.000+00:00",
            "name": "Rent",
            "amount": 40,
            "channel": "online",
            "category": "Transfer",
            "senderId": "user-a",
            "senderBankId": "bank-a",
            "receiverId": "user-b",
            "receiverBankId": "bank-b",
            "email": "b@example.com"
        }))
        .unwrap();

        assert_eq!(record.to_transaction("bank-a").direction, Direction::Debit);
        assert_eq!(record.to_transaction("bank-b").direction, Direction::Credit);
        assert_eq!(record.to_transaction("bank-a").amount, 40.0);
    }
}
