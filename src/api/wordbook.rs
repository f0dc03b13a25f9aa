use serde::{
    Deserialize,
    Serialize,
};

use super::client::ApiClient;
use crate::{
    core::ApiError,
    srs::types::{
        null_as_default,
        VocabId,
        VocabRef,
    },
};

pub type CategoryId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    #[serde(deserialize_with = "null_as_default")]
    pub id: CategoryId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WordbookItem {
    #[serde(deserialize_with = "null_as_default")]
    pub vocab_id: VocabId,
    pub category_id: Option<CategoryId>,
    pub vocab: Option<VocabRef>,
}

#[derive(Debug, Serialize)]
struct NewCategory<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveMany<'a> {
    vocab_ids: &'a [VocabId],
    category_id: Option<CategoryId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveMany<'a> {
    vocab_ids: &'a [VocabId],
}

/// The user's own word lists and their categories.
pub struct WordbookApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WordbookApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.client.get_or_default("/categories").await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        self.client.post("/categories", &NewCategory { name }).await
    }

    /// `None` lists every saved word, `Some` narrows to one category.
    pub async fn items(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<WordbookItem>, ApiError> {
        let endpoint = match category_id {
            Some(id) => format!("/my-wordbook?categoryId={id}"),
            None => "/my-wordbook".to_string(),
        };
        self.client.get_or_default(&endpoint).await
    }

    /// Moves words to `category_id`, or out of any category when `None`.
    pub async fn move_many(
        &self,
        vocab_ids: &[VocabId],
        category_id: Option<CategoryId>,
    ) -> Result<(), ApiError> {
        if vocab_ids.is_empty() {
            return Ok(());
        }
        self.client.post_unit("/my-wordbook/move-many", &MoveMany { vocab_ids, category_id }).await
    }

    pub async fn remove_many(&self, vocab_ids: &[VocabId]) -> Result<(), ApiError> {
        if vocab_ids.is_empty() {
            return Ok(());
        }
        self.client.post_unit("/my-wordbook/remove-many", &RemoveMany { vocab_ids }).await
    }
}
