use anyhow::Result;
use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_epoch_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub fn local_now(timezone: Option<Tz>) -> NaiveDateTime {
    match timezone {
        Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
        None => Local::now().naive_local(),
    }
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn timestamp_has_seconds_precision() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 3)
            .and_then(|d| d.and_hms_opt(7, 8, 9))
            .expect("datetime");
        assert_eq!(format_timestamp(at), "2024-05-03 07:08:09");
    }
}
