use serde::Serialize;

use super::types::{
    AlarmSummary,
    SrsStatus,
    StreakInfo,
    StreakStatus,
};

/// Which reminder, if any, sits at the top of the dashboard. A single value,
/// so the urgent and general banners can never show together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Banner {
    None,
    Reminder { total_due: u32, next_alarm_at: Option<String> },
    Overdue { overdue_count: u32, next_alarm_at: Option<String> },
}

impl Banner {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Banner::None)
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Banner::None => None,
            Banner::Reminder { total_due, next_alarm_at } => Some(format!(
                "오늘 미학습 {total_due}개가 남았습니다.{}",
                next_alarm_suffix(next_alarm_at.as_deref())
            )),
            Banner::Overdue { overdue_count, next_alarm_at } => Some(format!(
                "복습 기한이 지난 카드 {overdue_count}개가 있습니다.{}",
                next_alarm_suffix(next_alarm_at.as_deref())
            )),
        }
    }
}

fn next_alarm_suffix(next_alarm_at: Option<&str>) -> String {
    match next_alarm_at.filter(|t| !t.is_empty()) {
        Some(at) => format!(" (다음 알림: {at})"),
        None => String::new(),
    }
}

/// Server-flagged overdue wins; otherwise any remaining due cards get the
/// general reminder.
pub fn select_banner(status: &SrsStatus, alarm: &AlarmSummary) -> Banner {
    if status.should_show_alarm {
        let next_alarm_at = status
            .alarm_info
            .as_ref()
            .and_then(|info| info.next_alarm_at_kst.clone())
            .or_else(|| alarm.next_alarm_at_kst.clone());
        return Banner::Overdue { overdue_count: status.overdue_count, next_alarm_at };
    }

    if alarm.total_due > 0 {
        return Banner::Reminder {
            total_due: alarm.total_due,
            next_alarm_at: alarm.next_alarm_at_kst.clone(),
        };
    }

    Banner::None
}

/// `done / required` as a percentage clamped to `[0, 100]`; a zero requirement
/// reads as 0 rather than dividing by zero.
pub fn progress_percent(done: u32, required: u32) -> f64 {
    if required == 0 {
        return 0.0;
    }
    (f64::from(done) * 100.0 / f64::from(required)).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakProgress {
    pub today: u32,
    pub required: u32,
    pub percent: f64,
    pub is_complete: bool,
}

impl From<&StreakInfo> for StreakProgress {
    fn from(streak: &StreakInfo) -> Self {
        let today = streak.daily_quiz_count;
        let required = streak.required_daily;
        Self {
            today,
            required,
            percent: progress_percent(today, required),
            is_complete: streak.status == StreakStatus::Completed
                || (required > 0 && today >= required),
        }
    }
}
