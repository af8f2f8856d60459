use chrono::{DateTime, FixedOffset, Utc};

/// Converts a UTC timestamp into the `timestamptz` representation SeaORM
/// expects for `DateTimeWithTimeZone` columns.
pub fn utc_to_fixed_offset(utc_dt: &DateTime<Utc>) -> DateTime<FixedOffset> {
    utc_dt.fixed_offset()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_utc_to_fixed_offset_keeps_instant() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 5, 23, 30, 0).unwrap();
        let fixed = utc_to_fixed_offset(&utc);

        assert_eq!(fixed.offset().local_minus_utc(), 0);
        assert_eq!(fixed.with_timezone(&Utc), utc);
    }
}
