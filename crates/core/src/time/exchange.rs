use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

// Daily bars are stamped at the exchange open, in UTC seconds. The calendar date of a bar is the
// date in the exchange's own timezone, otherwise US sessions near midnight UTC shift by a day.
pub fn exchange_local_date(unix_secs: i64, gmt_offset_secs: i32) -> anyhow::Result<NaiveDate> {
    let offset = FixedOffset::east_opt(gmt_offset_secs)
        .with_context(|| format!("invalid exchange gmt offset: {gmt_offset_secs}s"))?;
    let utc = DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .with_context(|| format!("bar timestamp out of range: {unix_secs}"))?;
    Ok(utc.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keeps_us_session_on_its_own_date() {
        // 2024-03-08 13:30 UTC = 09:30 EST (market open).
        let ts = Utc.with_ymd_and_hms(2024, 3, 8, 13, 30, 0).unwrap().timestamp();
        let d = exchange_local_date(ts, -5 * 3600).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
    }

    #[test]
    fn shifts_asian_session_forward_from_utc() {
        // 2024-03-07 23:00 UTC = 2024-03-08 08:00 KST.
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap().timestamp();
        let d = exchange_local_date(ts, 9 * 3600).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(exchange_local_date(0, 48 * 3600).is_err());
    }
}
