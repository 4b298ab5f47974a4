use chrono::{Datelike, NaiveDate};

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// True when `start..=end` is exactly one calendar month.
pub fn is_whole_month(start: NaiveDate, end: NaiveDate) -> bool {
    start.day() == 1 && same_month(start, end) && end == last_of_month(start)
}

/// `Mar 2024` for a whole calendar month, otherwise `Mar 05, 2024 - Apr 04, 2024`.
pub fn format_period(start: NaiveDate, end: NaiveDate) -> String {
    if is_whole_month(start, end) {
        start.format("%b %Y").to_string()
    } else {
        format!("{} - {}", start.format("%b %d, %Y"), end.format("%b %d, %Y"))
    }
}
