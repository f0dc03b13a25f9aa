use chrono::NaiveDate;
use serde::{
    de::DeserializeOwned,
    Serialize,
};
use serde_json::Value;

use super::{
    client::ApiClient,
    envelope,
};
use crate::{
    core::{
        utils::format_date,
        ApiError,
    },
    srs::types::{
        AlarmSummary,
        CardId,
        FolderId,
        MasteredCard,
        SrsCard,
        SrsFolder,
        SrsStatus,
        StreakInfo,
        StudyLogEntry,
        VocabId,
        WrongAnswer,
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolder<'a> {
    name: &'a str,
    parent_id: Option<FolderId>,
}

#[derive(Debug, Serialize)]
struct RenameFolder<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCards<'a> {
    folder_id: FolderId,
    vocab_ids: &'a [VocabId],
}

/// Spaced-repetition endpoints under `/srs`.
pub struct SrsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SrsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn available(&self) -> Result<Vec<SrsCard>, ApiError> {
        self.get_list("/srs/available").await
    }

    pub async fn wrong_answers(
        &self,
        include_completed: bool,
    ) -> Result<Vec<WrongAnswer>, ApiError> {
        self.get_list(&format!("/srs/wrong-answers?includeCompleted={include_completed}")).await
    }

    pub async fn mastered_cards(&self) -> Result<Vec<MasteredCard>, ApiError> {
        self.get_list("/srs/mastered-cards").await
    }

    pub async fn folder_picker(&self) -> Result<Vec<SrsFolder>, ApiError> {
        self.get_list("/srs/folders/picker").await
    }

    pub async fn folder_children_lite(
        &self,
        folder_id: FolderId,
    ) -> Result<Vec<SrsFolder>, ApiError> {
        self.get_list(&format!("/srs/folders/{folder_id}/children-lite")).await
    }

    pub async fn status(&self) -> Result<SrsStatus, ApiError> {
        self.client.get_or_default("/srs/status").await
    }

    pub async fn alarm(&self) -> Result<AlarmSummary, ApiError> {
        self.client.get_or_default("/srs/alarm").await
    }

    pub async fn streak(&self) -> Result<StreakInfo, ApiError> {
        self.client.get_or_default("/srs/streak").await
    }

    pub async fn study_log(&self, date: NaiveDate) -> Result<Vec<StudyLogEntry>, ApiError> {
        self.get_list(&format!("/srs/study-log?date={}", format_date(date))).await
    }

    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Result<SrsFolder, ApiError> {
        self.client.post("/srs/folders", &CreateFolder { name, parent_id }).await
    }

    pub async fn rename_folder(
        &self,
        folder_id: FolderId,
        name: &str,
    ) -> Result<SrsFolder, ApiError> {
        self.client.patch(&format!("/srs/folders/{folder_id}"), &RenameFolder { name }).await
    }

    pub async fn delete_folder(&self, folder_id: FolderId) -> Result<(), ApiError> {
        self.client.delete(&format!("/srs/folders/{folder_id}")).await
    }

    /// Adds vocabulary to a folder; returns the ids of the cards created.
    /// A bare acknowledgement such as `{"success": true}` yields no ids.
    pub async fn add_cards(
        &self,
        folder_id: FolderId,
        vocab_ids: &[VocabId],
    ) -> Result<Vec<CardId>, ApiError> {
        const ENDPOINT: &str = "/srs/cards";
        let body: Value =
            self.client.post_or_default(ENDPOINT, &AddCards { folder_id, vocab_ids }).await?;
        if !body.is_array() {
            return Ok(Vec::new());
        }
        let cards: Vec<SrsCard> = envelope::decode(ENDPOINT, body)?;
        Ok(cards.into_iter().map(|c| c.id).collect())
    }

    // Lists come back as `null` when empty on some endpoints.
    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, ApiError> {
        self.client.get_or_default(endpoint).await
    }
}
