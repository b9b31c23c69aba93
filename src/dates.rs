use chrono::{Local, NaiveDate};

/// Format of the keys in the scheduled map.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_parse_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        assert_eq!(format_date(date), "2024-09-03");
        assert_eq!(parse_date("2024-09-03"), Some(date));
        assert_eq!(parse_date(" 2024-09-03 "), Some(date));
    }

    #[test]
    fn parse_rejects_other_formats() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("09/03/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }
}
