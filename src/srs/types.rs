use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

pub type CardId = u64;
pub type FolderId = u64;
pub type VocabId = u64;

/// Reads an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VocabRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: VocabId,
    #[serde(deserialize_with = "null_as_default")]
    pub lemma: String,
    pub pos: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SrsCard {
    #[serde(deserialize_with = "null_as_default")]
    pub id: CardId,
    pub folder_id: Option<FolderId>,
    #[serde(deserialize_with = "null_as_default")]
    pub stage: i32,
    pub next_review_at: Option<String>,
    pub vocab: Option<VocabRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SrsFolder {
    #[serde(deserialize_with = "null_as_default")]
    pub id: FolderId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub parent_id: Option<FolderId>,
    #[serde(deserialize_with = "null_as_default")]
    pub due_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub card_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub is_today: bool,
    pub kind: Option<String>,
    pub date: Option<String>,
}

impl SrsFolder {
    /// Root folder the server creates for today's reviews.
    pub fn is_today_root(&self, today: &str) -> bool {
        if self.parent_id.is_some() {
            return false;
        }
        self.is_today
            || self.kind.as_deref() == Some("today")
            || self.date.as_deref().is_some_and(|d| d.starts_with(today))
    }
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    Completed,
    InProgress,
    #[default]
    NotStarted,
}

impl<'de> Deserialize<'de> for StreakStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("completed") => StreakStatus::Completed,
            Some("in_progress") | Some("inprogress") | Some("in-progress") => {
                StreakStatus::InProgress
            }
            _ => StreakStatus::NotStarted,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakBonus {
    pub kind: Option<String>,
    pub message: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub days: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub current_streak: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub longest_streak: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub daily_quiz_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub required_daily: u32,
    pub status: StreakStatus,
    pub bonus: Option<StreakBonus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmInfo {
    pub next_alarm_at_kst: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_due: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SrsStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub should_show_alarm: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub overdue_count: u32,
    pub alarm_info: Option<AlarmInfo>,
}

/// `{totalDue, nextAlarmAtKst}`; the default is what a failed fetch degrades to.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub total_due: u32,
    pub next_alarm_at_kst: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyLogEntry {
    pub lemma: Option<String>,
    pub vocab: Option<VocabRef>,
    pub today_first_result: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_today_study: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub stage: i32,
    pub folder_id: Option<FolderId>,
    #[serde(alias = "time")]
    pub last_reviewed_at: Option<String>,
}

impl StudyLogEntry {
    /// `vocab.lemma` wins over the top-level `lemma`; blanks count as missing.
    pub fn word(&self) -> Option<&str> {
        self.vocab
            .as_ref()
            .map(|v| v.lemma.as_str())
            .filter(|l| !l.is_empty())
            .or(self.lemma.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// Explicit first result if the server sent one, else "studied today and
    /// still above stage 0".
    pub fn is_correct(&self) -> bool {
        match self.today_first_result {
            Some(result) => result,
            None => self.is_today_study && self.stage > 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MasteredCard {
    #[serde(deserialize_with = "null_as_default")]
    pub id: CardId,
    pub vocab: Option<VocabRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub master_cycles: u32,
    pub mastered_at: Option<DateTime<Utc>>,
}

/// Newest first, undated cards last.
pub fn sort_mastered(cards: &mut [MasteredCard]) {
    cards.sort_by(|a, b| b.mastered_at.cmp(&a.mastered_at));
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WrongAnswer {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    pub vocab: Option<VocabRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub wrong_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub is_completed: bool,
}
