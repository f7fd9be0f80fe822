mod appearance;
mod cell;
mod day;
mod util;
mod week;
pub(crate) use self::appearance::{AppearanceProvider, DayShape, Font};
pub(crate) use self::cell::TodayPolicy;
pub(crate) use self::day::DayState;
pub(crate) use self::util::local_today;
pub(crate) use self::week::{WeekStrip, WeekView};
