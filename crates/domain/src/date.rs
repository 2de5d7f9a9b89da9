use chrono::LocalResult;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono_tz::Tz;

pub fn is_valid_date(datestr: &str) -> anyhow::Result<(i32, u32, u32)> {
    let err = || anyhow::Error::msg(datestr.to_string());

    let dates = datestr.split('-').collect::<Vec<_>>();
    if dates.len() != 3 {
        return Err(err());
    }
    let year: i32 = dates[0].parse().map_err(|_| err())?;
    let month: u32 = dates[1].parse().map_err(|_| err())?;
    let day: u32 = dates[2].parse().map_err(|_| err())?;

    if !(1970..=2100).contains(&year) || !(1..=12).contains(&month) {
        return Err(err());
    }
    if day < 1 || day > get_month_length(year, month) {
        return Err(err());
    }

    Ok((year, month, day))
}

/// Validates a 24h wall-clock time on the form `HH:MM`
pub fn is_valid_time(timestr: &str) -> anyhow::Result<(u32, u32)> {
    let err = || anyhow::Error::msg(timestr.to_string());

    let parts = timestr.split(':').collect::<Vec<_>>();
    if parts.len() != 2 {
        return Err(err());
    }
    let hour: u32 = parts[0].parse().map_err(|_| err())?;
    let minute: u32 = parts[1].parse().map_err(|_| err())?;

    if hour > 23 || minute > 59 {
        return Err(err());
    }

    Ok((hour, minute))
}

/// Combines a calendar date and a wall-clock time in the given timezone
/// into an epoch timestamp in millis. Local times that do not exist or
/// are ambiguous in the timezone (DST transitions) are rejected.
pub fn datetime_millis(datestr: &str, timestr: &str, tz: &Tz) -> anyhow::Result<i64> {
    let (year, month, day) = is_valid_date(datestr)?;
    let (hour, minute) = is_valid_time(timestr)?;

    let err = || anyhow::Error::msg(format!("{} {} in timezone: {}", datestr, timestr, tz));

    // Resolve the full datetime at once so DST gaps and overlaps at the
    // minute level are caught, not just invalid dates
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(err)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(datetime) => Ok(datetime.timestamp_millis()),
        _ => Err(err()),
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::prelude::*;
    use chrono_tz::UTC;

    #[test]
    fn it_accepts_valid_dates() {
        let valid_dates = vec![
            "2018-1-1",
            "2025-12-31",
            "2020-1-12",
            "2020-2-29",
            "2020-02-2",
            "2020-02-02",
            "2020-2-09",
        ];

        for date in &valid_dates {
            assert!(is_valid_date(date).is_ok());
        }
    }

    #[test]
    fn it_rejects_invalid_dates() {
        let invalid_dates = vec![
            "2018--1-1",
            "2020-1-32",
            "2020-2-30",
            "2021-2-29",
            "2020-0-1",
            "2020-1-0",
            "2020-13-1",
            "1960-1-1",
            "2020-1",
            "",
        ];

        for date in &invalid_dates {
            assert!(is_valid_date(date).is_err());
        }
    }

    #[test]
    fn it_accepts_valid_times() {
        let valid_times = vec!["00:00", "09:30", "9:30", "23:59", "12:00"];

        for time in &valid_times {
            assert!(is_valid_time(time).is_ok());
        }
    }

    #[test]
    fn it_rejects_invalid_times() {
        let invalid_times = vec!["24:00", "12:60", "12", "12:3:4", "ab:cd", ""];

        for time in &invalid_times {
            assert!(is_valid_time(time).is_err());
        }
    }

    #[test]
    fn it_combines_date_and_time_in_timezone() {
        let millis = datetime_millis("2025-03-01", "10:00", &UTC).unwrap();
        assert_eq!(millis, UTC.ymd(2025, 3, 1).and_hms(10, 0, 0).timestamp_millis());

        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let millis = datetime_millis("2025-03-01", "10:00", &tz).unwrap();
        assert_eq!(millis, tz.ymd(2025, 3, 1).and_hms(10, 0, 0).timestamp_millis());
    }

    #[test]
    fn it_rejects_dst_gap_and_overlap_times() {
        let tz: Tz = "Europe/Oslo".parse().unwrap();

        // Spring forward: 02:30 does not exist on this date
        assert!(datetime_millis("2025-03-30", "2:30", &tz).is_err());
        // Fall back: 02:30 occurs twice on this date
        assert!(datetime_millis("2025-10-26", "2:30", &tz).is_err());

        // Same wall-clock time is fine on an ordinary day
        assert!(datetime_millis("2025-06-01", "2:30", &tz).is_ok());
    }
}
