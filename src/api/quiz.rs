use serde::{
    Deserialize,
    Serialize,
};

use super::client::ApiClient;
use crate::{
    core::ApiError,
    srs::types::{
        null_as_default,
        CardId,
        FolderId,
        VocabId,
    },
};

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub card_id: Option<CardId>,
    pub vocab_id: VocabId,
    pub folder_id: Option<FolderId>,
    pub correct: bool,
    pub quiz_type: String,
}

/// What the server did with the card after an answer.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerOutcome {
    #[serde(deserialize_with = "null_as_default")]
    pub stage: i32,
    pub next_review_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_mastered: bool,
    /// Same-day repeats do not move the card.
    #[serde(deserialize_with = "null_as_default")]
    pub counted: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListeningRecord {
    pub vocab_id: VocabId,
    pub correct: bool,
    pub attempts: u32,
}

pub struct QuizApi<'a> {
    client: &'a ApiClient,
}

impl<'a> QuizApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn submit_answer(
        &self,
        answer: &AnswerSubmission,
    ) -> Result<AnswerOutcome, ApiError> {
        self.client.post_or_default("/quiz/answer", answer).await
    }

    pub async fn record_listening(&self, record: &ListeningRecord) -> Result<(), ApiError> {
        self.client.post_unit("/listening/record", record).await
    }
}
