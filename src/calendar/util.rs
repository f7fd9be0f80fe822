use std::iter::successors;
use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime, Weekday,
};

pub(super) const DAYS_IN_WEEK: usize = 7;

/// Day of the month without padding
static DAY_FMT: &[FormatItem<'_>] = format_description!("[day padding:none]");

pub(super) trait WeekdayExt {
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_sunday().into()
    }
}

/// Returns the text shown on a day's label
pub(super) fn format_day(date: Date) -> String {
    date.format(&DAY_FMT).unwrap_or_else(|_| date.day().to_string())
}

/// The current date in the local time zone, or in UTC if the local offset
/// cannot be determined
pub(crate) fn local_today() -> Date {
    local_now().date()
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub(crate) fn is_today(date: Date) -> bool {
    is_same_day(date, local_now())
}

/// Whether `date` falls on the same calendar day as `moment`; the time of day
/// plays no part
pub(super) fn is_same_day(date: Date, moment: OffsetDateTime) -> bool {
    date.year() == moment.year() && date.month() == moment.month() && date.day() == moment.day()
}

/// Returns the seven dates, Sunday first, of the week containing `date`.
/// Days that would fall outside the representable range are omitted.
pub(crate) fn week_containing(date: Date) -> Vec<Date> {
    let i = usize::from(date.weekday().index0());
    let mut days = successors(Some(date), |&d| d.previous_day())
        .take(i + 1)
        .collect::<Vec<_>>();
    days.reverse();
    days.extend(
        successors(Some(date), |&d| d.next_day())
            .skip(1)
            .take(DAYS_IN_WEEK - i - 1),
    );
    days
}
