use time::{OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// All externally visible timestamps are numeric epoch seconds. Stored values
/// are naive UTC, so the conversion just assumes UTC.
pub(crate) fn epoch_seconds(value: PrimitiveDateTime) -> i64 {
    value.assume_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    #[test]
    fn epoch_seconds_assumes_utc() {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        let value = PrimitiveDateTime::new(date, time);
        assert_eq!(epoch_seconds(value), 1_735_813_230);
    }

    #[test]
    fn epoch_seconds_at_unix_epoch() {
        let date = Date::from_calendar_date(1970, time::Month::January, 1).unwrap();
        let value = PrimitiveDateTime::new(date, Time::MIDNIGHT);
        assert_eq!(epoch_seconds(value), 0);
    }
}
