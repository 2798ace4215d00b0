use chrono::{Local, NaiveDateTime};

// Header timestamps render in local wall-clock time, e.g. "2024-05-01 08:30:00".
pub const HEADER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_header_ts(ts: &NaiveDateTime) -> String {
    ts.format(HEADER_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn header_ts_is_zero_padded() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 3, 9).unwrap();
        assert_eq!(format_header_ts(&ts), "2024-05-01 08:03:09");
    }
}
