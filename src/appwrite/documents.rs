//! Typed wrappers around the JSON document operations of [Appwrite].

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Error,
    appwrite::{Appwrite, Collection, Query},
};

/// Create a document from `data` and deserialize the stored document.
pub async fn create<T, D>(appwrite: &dyn Appwrite, collection: Collection, data: &D) -> Result<T, Error>
where
    T: DeserializeOwned,
    D: Serialize + Sync,
{
    let data = serde_json::to_value(data)?;
    let document = appwrite.create_document(collection, data).await?;

    Ok(serde_json::from_value(document)?)
}

/// List and deserialize the documents matching `queries`.
pub async fn list<T>(
    appwrite: &dyn Appwrite,
    collection: Collection,
    queries: &[Query],
) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    appwrite
        .list_documents(collection, queries)
        .await?
        .into_iter()
        .map(|document| serde_json::from_value(document).map_err(Error::from))
        .collect()
}

/// Get and deserialize a single document.
pub async fn get<T>(
    appwrite: &dyn Appwrite,
    collection: Collection,
    document_id: &str,
) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let document = appwrite.get_document(collection, document_id).await?;

    Ok(serde_json::from_value(document)?)
}
