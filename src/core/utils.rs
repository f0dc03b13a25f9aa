use chrono::{
    DateTime,
    NaiveDate,
    TimeDelta,
    Utc,
};

// KST has no daylight saving, a fixed shift is exact.
const KST_OFFSET_HOURS: i64 = 9;

/// Calendar date in Korea Standard Time for the given instant.
pub fn kst_date(at: DateTime<Utc>) -> NaiveDate {
    (at + TimeDelta::hours(KST_OFFSET_HOURS)).date_naive()
}

/// "Today" as the server counts it for streaks and study logs.
pub fn kst_today() -> NaiveDate {
    kst_date(Utc::now())
}

/// `YYYY-MM-DD`, the format the study-log endpoint expects.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn kst_rolls_over_at_15_utc() {
        let before = Utc.with_ymd_and_hms(2024, 1, 1, 14, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap();
        assert_eq!(format_date(kst_date(before)), "2024-01-01");
        assert_eq!(format_date(kst_date(after)), "2024-01-02");
    }
}
