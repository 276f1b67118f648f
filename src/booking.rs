use anyhow::{bail, Context};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};

pub const STUDENT_ID_DIGITS: usize = 9;
pub const TELEPHONE_DIGITS: usize = 10;

/// Identity fields a client submits with a booking.
#[derive(Clone, Debug)]
pub struct BookingForm {
    pub student_id: String,
    pub telephone: String,
}

impl BookingForm {
    /// Returns the trimmed form, or the first field that fails.
    pub fn validate(&self) -> anyhow::Result<BookingForm> {
        Ok(BookingForm {
            student_id: validate_student_id(&self.student_id)?,
            telephone: validate_telephone(&self.telephone)?,
        })
    }
}

fn validate_digits(value: &str, digits: usize, field: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if !value.chars().all(|c| c.is_ascii_digit()) {
        bail!("{} must contain digits only", field);
    }
    if value.len() != digits {
        bail!("{} must be {} digits", field, digits);
    }
    Ok(value.to_string())
}

pub fn validate_student_id(value: &str) -> anyhow::Result<String> {
    validate_digits(value, STUDENT_ID_DIGITS, "Student ID")
}

pub fn validate_telephone(value: &str) -> anyhow::Result<String> {
    validate_digits(value, TELEPHONE_DIGITS, "Telephone")
}

pub fn parse_day(day: &str) -> anyhow::Result<Weekday> {
    day.parse::<Weekday>()
        .map_err(|_| anyhow::anyhow!("Unknown day: {}", day))
}

pub fn parse_slot_time(time: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").with_context(|| format!("Bad slot time: {}", time))
}

/// The calendar date at `now` for a service running at `offset` from UTC.
pub fn service_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// The next date (today included) that falls on `day`.
pub fn next_date_for_day(today: NaiveDate, day: &str) -> anyhow::Result<NaiveDate> {
    let target = parse_day(day)?.num_days_from_monday();
    let current = today.weekday().num_days_from_monday();
    let offset = (target + 7 - current) % 7;
    Ok(today + Duration::days(offset as i64))
}

/// Start and end of a session starting at `time` on `date`.
pub fn session_bounds(
    date: NaiveDate,
    time: &str,
    minutes: i64,
) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    let start = date.and_time(parse_slot_time(time)?);
    Ok((start, start + Duration::minutes(minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    fn form(student_id: &str, telephone: &str) -> BookingForm {
        BookingForm {
            student_id: student_id.to_string(),
            telephone: telephone.to_string(),
        }
    }

    #[test]
    fn accepts_exact_digit_counts() {
        let valid = form(" 640612345 ", "0812345678").validate().unwrap();
        assert_eq!(valid.student_id, "640612345");
        assert_eq!(valid.telephone, "0812345678");
    }

    #[test]
    fn rejects_wrong_student_id_length() {
        for id in ["", "64061234", "6406123456", "64061234567"] {
            let err = form(id, "0812345678").validate().unwrap_err();
            assert!(err.to_string().contains("Student ID"), "{}", err);
        }
    }

    #[test]
    fn rejects_wrong_telephone_length() {
        for phone in ["081234567", "08123456789", "1"] {
            let err = form("640612345", phone).validate().unwrap_err();
            assert!(err.to_string().contains("Telephone"), "{}", err);
        }
    }

    #[test]
    fn rejects_non_digits() {
        assert!(validate_student_id("64061234a").is_err());
        assert!(validate_telephone("081-234-567").is_err());
        assert!(validate_telephone("０８１２３４５６７８").is_err());
    }

    #[test]
    fn next_date_includes_today() {
        // 2024-05-13 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        assert_eq!(next_date_for_day(monday, "Monday").unwrap(), monday);
        assert_eq!(
            next_date_for_day(monday, "Friday").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
        );

        let friday = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(
            next_date_for_day(friday, "Tuesday").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 21).unwrap()
        );
        assert!(next_date_for_day(friday, "Someday").is_err());
    }

    #[test]
    fn service_today_follows_local_offset() {
        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        // 02:00 on Monday in Bangkok is still Sunday in UTC.
        let now = "2024-05-12T19:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let today = service_today(now, bangkok);
        assert_eq!(today, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(next_date_for_day(today, "Monday").unwrap(), today);
        assert_eq!(
            service_today(now, Utc.fix()),
            NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()
        );
    }

    #[test]
    fn session_bounds_add_length() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        let (start, end) = session_bounds(date, "13:30", 60).unwrap();
        assert_eq!(start.to_string(), "2024-05-13 13:30:00");
        assert_eq!(end.to_string(), "2024-05-13 14:30:00");
        assert!(session_bounds(date, "1pm", 60).is_err());
    }
}
