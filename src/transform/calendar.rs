// 📅 Calendar helpers - weekend rule, weekday, ISO week, month buckets

use crate::options::WeekendDateRule;
use chrono::{Datelike, Days, NaiveDate, Weekday};

impl WeekendDateRule {
    /// Move Saturday/Sunday dates according to the rule. Idempotent: every
    /// rule except `AsIs` maps weekends onto weekdays, which it leaves alone.
    pub fn apply(&self, date: NaiveDate) -> NaiveDate {
        let shifted = match (self, date.weekday()) {
            (WeekendDateRule::NearestWeekday, Weekday::Sat) => date.checked_sub_days(Days::new(1)),
            (WeekendDateRule::NearestWeekday, Weekday::Sun) => date.checked_add_days(Days::new(1)),
            (WeekendDateRule::AllToMonday, Weekday::Sat) => date.checked_add_days(Days::new(2)),
            (WeekendDateRule::AllToMonday, Weekday::Sun) => date.checked_add_days(Days::new(1)),
            (WeekendDateRule::AllToFriday, Weekday::Sat) => date.checked_sub_days(Days::new(1)),
            (WeekendDateRule::AllToFriday, Weekday::Sun) => date.checked_sub_days(Days::new(2)),
            _ => None,
        };
        shifted.unwrap_or(date)
    }
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday = 1 ... Sunday = 7
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// `Jan-2024` style label
pub fn month_year(date: NaiveDate) -> String {
    date.format("%b-%Y").to_string()
}

/// Sort key that orders month labels chronologically
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
