//! Dashboard aggregation.
//!
//! All read endpoints are requested concurrently. Each slice is settled on its
//! own: a failing endpoint is logged, recorded in [`DashboardView::failed`] and
//! replaced by its default, so the rest of the dashboard still renders.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use super::{
    presentation::{
        select_banner,
        Banner,
        StreakProgress,
    },
    study_log::{
        summarize,
        StudySummary,
    },
    types::{
        sort_mastered,
        AlarmSummary,
        FolderId,
        MasteredCard,
        SrsCard,
        SrsFolder,
        SrsStatus,
        StreakInfo,
        StudyLogEntry,
        WrongAnswer,
    },
};
use crate::{
    api::ApiClient,
    core::{
        utils::format_date,
        ApiError,
    },
};

/// Read side of the SRS service as the dashboard needs it.
#[async_trait]
pub trait SrsSource: Send + Sync {
    async fn available(&self) -> Result<Vec<SrsCard>, ApiError>;
    /// Open wrong answers only.
    async fn wrong_answers(&self) -> Result<Vec<WrongAnswer>, ApiError>;
    async fn mastered_cards(&self) -> Result<Vec<MasteredCard>, ApiError>;
    async fn folder_picker(&self) -> Result<Vec<SrsFolder>, ApiError>;
    async fn folder_children(&self, folder_id: FolderId) -> Result<Vec<SrsFolder>, ApiError>;
    async fn status(&self) -> Result<SrsStatus, ApiError>;
    async fn alarm(&self) -> Result<AlarmSummary, ApiError>;
    async fn streak(&self) -> Result<StreakInfo, ApiError>;
    async fn study_log(&self, date: NaiveDate) -> Result<Vec<StudyLogEntry>, ApiError>;
}

#[async_trait]
impl SrsSource for ApiClient {
    async fn available(&self) -> Result<Vec<SrsCard>, ApiError> {
        self.srs().available().await
    }

    async fn wrong_answers(&self) -> Result<Vec<WrongAnswer>, ApiError> {
        self.srs().wrong_answers(false).await
    }

    async fn mastered_cards(&self) -> Result<Vec<MasteredCard>, ApiError> {
        self.srs().mastered_cards().await
    }

    async fn folder_picker(&self) -> Result<Vec<SrsFolder>, ApiError> {
        self.srs().folder_picker().await
    }

    async fn folder_children(&self, folder_id: FolderId) -> Result<Vec<SrsFolder>, ApiError> {
        self.srs().folder_children_lite(folder_id).await
    }

    async fn status(&self) -> Result<SrsStatus, ApiError> {
        self.srs().status().await
    }

    async fn alarm(&self) -> Result<AlarmSummary, ApiError> {
        self.srs().alarm().await
    }

    async fn streak(&self) -> Result<StreakInfo, ApiError> {
        self.srs().streak().await
    }

    async fn study_log(&self, date: NaiveDate) -> Result<Vec<StudyLogEntry>, ApiError> {
        self.srs().study_log(date).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    Available,
    WrongAnswers,
    Mastered,
    TodayFolders,
    Status,
    Alarm,
    Streak,
    StudyLog,
}

impl Slice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Available => "available",
            Slice::WrongAnswers => "wrong_answers",
            Slice::Mastered => "mastered",
            Slice::TodayFolders => "today_folders",
            Slice::Status => "status",
            Slice::Alarm => "alarm",
            Slice::Streak => "streak",
            Slice::StudyLog => "study_log",
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub date: NaiveDate,
    pub due_count: u32,
    pub wrong_answer_count: u32,
    pub mastered_count: u32,
    pub mastered: Vec<MasteredCard>,
    pub today_folders: Vec<SrsFolder>,
    pub today_due: u32,
    pub status: SrsStatus,
    pub alarm: AlarmSummary,
    pub streak: StreakInfo,
    pub streak_progress: StreakProgress,
    pub study: StudySummary,
    pub banner: Banner,
    /// Slices that fell back to defaults.
    pub failed: Vec<Slice>,
    /// At least one slice was rejected with 401; stored tokens are already gone.
    pub unauthorized: bool,
}

impl DashboardView {
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn has_failed(&self, slice: Slice) -> bool {
        self.failed.contains(&slice)
    }
}

#[derive(Default)]
struct Settle {
    failed: Vec<Slice>,
    unauthorized: bool,
}

impl Settle {
    fn take<T>(&mut self, slice: Slice, result: Result<T, ApiError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    slice = slice.as_str(),
                    status = ?e.status(),
                    error = %e,
                    "Dashboard slice failed, using default"
                );
                self.unauthorized |= e.is_unauthorized();
                self.failed.push(slice);
                None
            }
        }
    }

    fn or_default<T: Default>(&mut self, slice: Slice, result: Result<T, ApiError>) -> T {
        self.take(slice, result).unwrap_or_default()
    }
}

/// Picker first, then the children of today's root folder. No root means no
/// folders for today, which is not a failure.
async fn today_folders<S: SrsSource + ?Sized>(
    source: &S,
    today: &str,
) -> Result<Vec<SrsFolder>, ApiError> {
    let picker = source.folder_picker().await?;
    match picker.iter().find(|f| f.is_today_root(today)) {
        Some(root) => source.folder_children(root.id).await,
        None => {
            tracing::debug!(today, folders = picker.len(), "No root folder for today");
            Ok(Vec::new())
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

pub async fn load_dashboard<S: SrsSource + ?Sized>(source: &S, today: NaiveDate) -> DashboardView {
    let today_key = format_date(today);

    let (available, wrong, mastered, folders, status, alarm, streak, log) = futures::join!(
        source.available(),
        source.wrong_answers(),
        source.mastered_cards(),
        today_folders(source, &today_key),
        source.status(),
        source.alarm(),
        source.streak(),
        source.study_log(today),
    );

    let mut settle = Settle::default();
    let available = settle.or_default(Slice::Available, available);
    let wrong = settle.or_default(Slice::WrongAnswers, wrong);
    let mut mastered = settle.or_default(Slice::Mastered, mastered);
    let today_folders = settle.or_default(Slice::TodayFolders, folders);
    let status = settle.or_default(Slice::Status, status);
    let alarm = settle.or_default(Slice::Alarm, alarm);
    let streak = settle.or_default(Slice::Streak, streak);

    let study = match settle.take(Slice::StudyLog, log) {
        Some(entries) => summarize(&entries),
        None => StudySummary::estimated(streak.daily_quiz_count),
    };

    sort_mastered(&mut mastered);

    let view = DashboardView {
        date: today,
        due_count: count(available.len()),
        wrong_answer_count: count(wrong.iter().filter(|w| !w.is_completed).count()),
        mastered_count: count(mastered.len()),
        today_due: today_folders.iter().map(|f| f.due_count).sum(),
        today_folders,
        mastered,
        banner: select_banner(&status, &alarm),
        streak_progress: StreakProgress::from(&streak),
        status,
        alarm,
        streak,
        study,
        failed: settle.failed,
        unauthorized: settle.unauthorized,
    };

    tracing::info!(
        date = %view.date,
        due = view.due_count,
        mastered = view.mastered_count,
        failed = view.failed.len(),
        "Dashboard loaded"
    );
    view
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::Mutex,
    };

    use chrono::{
        TimeZone,
        Utc,
    };

    use super::*;
    use crate::srs::types::{
        StreakStatus,
        VocabRef,
    };

    /// Canned responses; any slice named in `failing` errors instead.
    #[derive(Default)]
    struct MockSource {
        failing: HashSet<Slice>,
        unauthorized: bool,
        picker: Vec<SrsFolder>,
        children_requested: Mutex<Vec<FolderId>>,
    }

    impl MockSource {
        fn failing(slices: &[Slice]) -> Self {
            Self { failing: slices.iter().copied().collect(), ..Self::with_today_root() }
        }

        fn with_today_root() -> Self {
            Self {
                picker: vec![
                    SrsFolder {
                        id: 1,
                        name: "old".into(),
                        date: Some("2023-12-31".into()),
                        ..Default::default()
                    },
                    SrsFolder {
                        id: 7,
                        name: "today".into(),
                        date: Some("2024-01-01".into()),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }
        }

        fn check(&self, slice: Slice) -> Result<(), ApiError> {
            if self.unauthorized {
                return Err(ApiError::Unauthorized);
            }
            if self.failing.contains(&slice) {
                return Err(ApiError::Http { status: 503, message: format!("{slice} down") });
            }
            Ok(())
        }
    }

    fn card(id: u64) -> SrsCard {
        let vocab = VocabRef { id, lemma: format!("w{id}"), pos: None };
        SrsCard { id, stage: 1, vocab: Some(vocab), ..Default::default() }
    }

    #[async_trait]
    impl SrsSource for MockSource {
        async fn available(&self) -> Result<Vec<SrsCard>, ApiError> {
            self.check(Slice::Available)?;
            Ok(vec![card(1), card(2), card(3)])
        }

        async fn wrong_answers(&self) -> Result<Vec<WrongAnswer>, ApiError> {
            self.check(Slice::WrongAnswers)?;
            Ok(vec![
                WrongAnswer { id: 1, wrong_count: 2, ..Default::default() },
                WrongAnswer { id: 2, wrong_count: 1, is_completed: true, ..Default::default() },
            ])
        }

        async fn mastered_cards(&self) -> Result<Vec<MasteredCard>, ApiError> {
            self.check(Slice::Mastered)?;
            let at = |month| Some(Utc.with_ymd_and_hms(2023, month, 1, 0, 0, 0).unwrap());
            Ok(vec![
                MasteredCard { id: 10, master_cycles: 1, mastered_at: at(5), ..Default::default() },
                MasteredCard { id: 11, master_cycles: 2, mastered_at: at(9), ..Default::default() },
            ])
        }

        async fn folder_picker(&self) -> Result<Vec<SrsFolder>, ApiError> {
            self.check(Slice::TodayFolders)?;
            Ok(self.picker.clone())
        }

        async fn folder_children(&self, folder_id: FolderId) -> Result<Vec<SrsFolder>, ApiError> {
            self.children_requested.lock().unwrap().push(folder_id);
            Ok(vec![
                SrsFolder {
                    id: 70,
                    parent_id: Some(folder_id),
                    due_count: 4,
                    ..Default::default()
                },
                SrsFolder {
                    id: 71,
                    parent_id: Some(folder_id),
                    due_count: 2,
                    ..Default::default()
                },
            ])
        }

        async fn status(&self) -> Result<SrsStatus, ApiError> {
            self.check(Slice::Status)?;
            Ok(SrsStatus { should_show_alarm: false, overdue_count: 0, alarm_info: None })
        }

        async fn alarm(&self) -> Result<AlarmSummary, ApiError> {
            self.check(Slice::Alarm)?;
            Ok(AlarmSummary { total_due: 5, next_alarm_at_kst: Some("2024-01-01 10:00".into()) })
        }

        async fn streak(&self) -> Result<StreakInfo, ApiError> {
            self.check(Slice::Streak)?;
            Ok(StreakInfo {
                current_streak: 3,
                longest_streak: 9,
                daily_quiz_count: 6,
                required_daily: 10,
                status: StreakStatus::InProgress,
                bonus: None,
            })
        }

        async fn study_log(&self, _date: NaiveDate) -> Result<Vec<StudyLogEntry>, ApiError> {
            self.check(Slice::StudyLog)?;
            Ok(serde_json::from_value(serde_json::json!([
                { "lemma": "run", "todayFirstResult": true },
                { "lemma": "run", "todayFirstResult": false },
                { "lemma": "jump", "isTodayStudy": true, "stage": 0 }
            ]))
            .unwrap())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn merges_every_slice() {
        let source = MockSource::with_today_root();
        let view = load_dashboard(&source, today()).await;

        assert!(!view.is_degraded());
        assert_eq!(view.due_count, 3);
        assert_eq!(view.wrong_answer_count, 1);
        assert_eq!(view.mastered_count, 2);
        assert_eq!(view.mastered[0].id, 11);
        assert_eq!(view.today_due, 6);
        assert_eq!(*source.children_requested.lock().unwrap(), vec![7]);
        assert_eq!(view.study.total, 2);
        assert_eq!(view.study.correct, 1);
        assert_eq!(view.study.incorrect, 1);
        assert_eq!(view.streak_progress.percent, 60.0);
        assert_eq!(
            view.banner.message().as_deref(),
            Some("오늘 미학습 5개가 남았습니다. (다음 알림: 2024-01-01 10:00)")
        );
    }

    #[tokio::test]
    async fn streak_failure_degrades_only_streak() {
        let source = MockSource::failing(&[Slice::Streak]);
        let view = load_dashboard(&source, today()).await;

        assert_eq!(view.failed, vec![Slice::Streak]);
        assert_eq!(view.due_count, 3);
        assert_eq!(view.mastered_count, 2);
        assert_eq!(view.streak, StreakInfo::default());
        assert_eq!(view.streak_progress.percent, 0.0);
        assert!(!view.study.is_estimated);
    }

    #[tokio::test]
    async fn study_log_failure_uses_estimate() {
        let source = MockSource::failing(&[Slice::StudyLog]);
        let view = load_dashboard(&source, today()).await;

        assert!(view.has_failed(Slice::StudyLog));
        assert!(view.study.is_estimated);
        assert_eq!(view.study.total, 6);
        assert!(view.study.attempts.is_empty());
    }

    #[tokio::test]
    async fn alarm_failure_defaults_and_hides_reminder() {
        let source = MockSource::failing(&[Slice::Alarm]);
        let view = load_dashboard(&source, today()).await;

        assert_eq!(view.alarm, AlarmSummary { total_due: 0, next_alarm_at_kst: None });
        assert_eq!(view.banner, Banner::None);
    }

    #[tokio::test]
    async fn children_are_skipped_without_today_root() {
        let source = MockSource::default();
        let view = load_dashboard(&source, today()).await;

        assert!(view.today_folders.is_empty());
        assert!(!view.has_failed(Slice::TodayFolders));
        assert!(source.children_requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn picker_failure_skips_children() {
        let source = MockSource::failing(&[Slice::TodayFolders]);
        let view = load_dashboard(&source, today()).await;

        assert!(view.has_failed(Slice::TodayFolders));
        assert!(source.children_requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_is_flagged() {
        let source = MockSource { unauthorized: true, ..MockSource::with_today_root() };
        let view = load_dashboard(&source, today()).await;

        assert!(view.unauthorized);
        assert_eq!(view.due_count, 0);
        assert!(view.study.is_estimated);
        assert_eq!(view.study.total, 0);
    }
}
