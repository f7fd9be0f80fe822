use super::appearance::AppearanceProvider;
use super::cell::{DayCell, DaySelected, TodayPolicy};
use super::day::{Day, DayState, Supplementary};
use super::util::week_containing;
use crate::theme::{FOCUS_STYLE, WEEKDAY_STYLE};
use log::{debug, info};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect},
    style::Color,
    widgets::{StatefulWidget, Widget},
};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};
use time::{Date, Weekday};

/// Number of lines taken up by the weekday header
const HEADER_LINES: u16 = 1;

/// Colors added, one per press, by [`WeekView::cycle_dots()`]
const DOT_COLORS: [Color; 3] = [Color::LightRed, Color::LightGreen, Color::LightCyan];

/// The seven days of one week, each shown by its own [`DayCell`].
///
/// The view owns the days and is the single listener for their cells' tap
/// notifications.  Selection is exclusive: selecting a day returns the
/// previously selected one to [`DayState::Available`], and selecting the
/// selected day clears the selection.
#[derive(Debug)]
pub(crate) struct WeekView {
    slots: Vec<Slot>,
    selections: Receiver<DaySelected>,
    focus: usize,
}

#[derive(Debug)]
struct Slot {
    day: Day,
    cell: DayCell,
}

impl WeekView {
    /// Builds the week containing `start`.  Days outside the month of `start`
    /// are out of range.
    pub(crate) fn new(start: Date, appearance: Rc<dyn AppearanceProvider>) -> WeekView {
        let (tx, selections) = channel();
        let slots = week_containing(start)
            .into_iter()
            .map(|date| {
                let state = if (date.year(), date.month()) == (start.year(), start.month()) {
                    DayState::Available
                } else {
                    DayState::Out
                };
                let mut day = Day::new(date).with_state(state);
                let cell = DayCell::new(&mut day, Some(Rc::clone(&appearance)), tx.clone());
                Slot { day, cell }
            })
            .collect::<Vec<_>>();
        let focus = slots
            .iter()
            .position(|s| s.day.date() == start)
            .unwrap_or_default();
        WeekView {
            slots,
            selections,
            focus,
        }
    }

    /// Marks the given dates as unavailable
    pub(crate) fn unavailable(mut self, dates: &[Date]) -> WeekView {
        for slot in &mut self.slots {
            if dates.contains(&slot.day.date()) {
                slot.day.set_state(DayState::Unavailable);
            }
        }
        self.refresh();
        self
    }

    /// Pins "today" to `today` instead of the system clock
    #[cfg(test)]
    pub(crate) fn today(self, today: Date) -> WeekView {
        self.map_cells(|cell| cell.today(today))
    }

    pub(crate) fn today_policy(self, policy: TodayPolicy) -> WeekView {
        self.map_cells(|cell| cell.today_policy(policy))
    }

    fn map_cells<F>(mut self, f: F) -> WeekView
    where
        F: Fn(DayCell) -> DayCell,
    {
        self.slots = self
            .slots
            .into_iter()
            .map(|Slot { day, cell }| Slot { day, cell: f(cell) })
            .collect();
        self
    }

    pub(crate) fn selected(&self) -> Option<Date> {
        self.slots
            .iter()
            .map(|s| &s.day)
            .find(|d| d.state() == DayState::Selected)
            .map(Day::date)
    }

    pub(crate) fn focused(&self) -> Option<Date> {
        self.slots.get(self.focus).map(|s| s.day.date())
    }

    // Returns `false` if already at the last day
    pub(crate) fn focus_next(&mut self) -> bool {
        if self.focus + 1 < self.slots.len() {
            self.focus += 1;
            true
        } else {
            false
        }
    }

    // Returns `false` if already at the first day
    pub(crate) fn focus_previous(&mut self) -> bool {
        if let Some(i) = self.focus.checked_sub(1) {
            self.focus = i;
            true
        } else {
            false
        }
    }

    /// Taps the focused day.  Returns `false` if the tap was ignored.
    pub(crate) fn tap_focused(&mut self) -> bool {
        let tapped = self
            .slots
            .get(self.focus)
            .is_some_and(|s| s.cell.tap(&s.day));
        self.process_selections();
        tapped
    }

    /// Taps the day drawn at the given terminal position.  Returns `false` if
    /// there is no day there or the tap was ignored.
    pub(crate) fn tap_at(&mut self, column: u16, row: u16) -> bool {
        let pos = Position::new(column, row);
        let Some(i) = self.slots.iter().position(|s| s.cell.frame().contains(pos)) else {
            return false;
        };
        self.focus = i;
        self.tap_focused()
    }

    /// Adds another dot beneath the focused day, or removes all of its dots
    /// once every color is in use
    pub(crate) fn cycle_dots(&mut self) {
        let Some(slot) = self.slots.get_mut(self.focus) else {
            return;
        };
        let shown = slot
            .day
            .supplementaries()
            .iter()
            .map(|Supplementary::BottomDots(colors)| colors.len())
            .sum::<usize>();
        let supplementaries = match DOT_COLORS.get(..=shown) {
            Some(colors) => vec![Supplementary::BottomDots(colors.to_vec())],
            None => Vec::new(),
        };
        slot.day.set_supplementaries(supplementaries);
        self.refresh();
    }

    /// Applies the selections reported by the cells since the last call
    pub(crate) fn process_selections(&mut self) {
        while let Ok(DaySelected { date, state }) = self.selections.try_recv() {
            debug!("{date} was tapped while {state:?}");
            self.select(date);
        }
        self.refresh();
    }

    fn select(&mut self, date: Date) {
        let Some(i) = self.slots.iter().position(|s| s.day.date() == date) else {
            return;
        };
        if self.slots[i].day.state() == DayState::Selected {
            info!("deselected {date}");
            self.slots[i].day.set_state(DayState::Available);
            return;
        }
        for slot in &mut self.slots {
            if slot.day.state() == DayState::Selected {
                slot.day.set_state(DayState::Available);
            }
        }
        info!("selected {date}");
        self.slots[i].day.set_state(DayState::Selected);
    }

    fn refresh(&mut self) {
        for Slot { day, cell } in &mut self.slots {
            if cell.process_notifications(day) {
                debug!("refreshed {}", day.date());
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct WeekStrip;

impl StatefulWidget for WeekStrip {
    type State = WeekView;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let Ok(count) = u32::try_from(state.slots.len()) else {
            return;
        };
        if count == 0 {
            return;
        }
        let [header, body] =
            Layout::vertical([Constraint::Length(HEADER_LINES), Constraint::Min(0)]).areas(area);
        let columns = Layout::horizontal(vec![Constraint::Ratio(1, count); state.slots.len()])
            .split(body);
        let focus = state.focus;
        for (i, (slot, &frame)) in state.slots.iter_mut().zip(columns.iter()).enumerate() {
            let style = if i == focus { FOCUS_STYLE } else { WEEKDAY_STYLE };
            let name = weekday_abbrev(slot.day.date().weekday());
            let name = if i == focus {
                format!("[{name}]")
            } else {
                name.to_owned()
            };
            if header.height > 0 {
                buf.set_stringn(
                    centered_x(frame, &name),
                    header.y,
                    &name,
                    usize::from(frame.width),
                    style,
                );
            }
            if slot.cell.frame() == frame {
                slot.cell.process_notifications(&slot.day);
            } else {
                slot.cell.set_frame(frame);
                slot.cell.setup_day(&slot.day);
            }
            slot.cell.render(frame, buf);
        }
    }
}

fn centered_x(frame: Rect, s: &str) -> u16 {
    let width = u16::try_from(s.chars().count()).unwrap_or(u16::MAX);
    frame.x + frame.width.saturating_sub(width) / 2
}

fn weekday_abbrev(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Sunday => "Su",
        Weekday::Monday => "Mo",
        Weekday::Tuesday => "Tu",
        Weekday::Wednesday => "We",
        Weekday::Thursday => "Th",
        Weekday::Friday => "Fr",
        Weekday::Saturday => "Sa",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use time::macros::date;

    fn week(start: Date) -> WeekView {
        WeekView::new(start, Rc::new(Theme::default())).today(date!(2000 - 01 - 01))
    }

    fn render(view: &mut WeekView) -> Buffer {
        let area = Rect::new(0, 0, 70, 6);
        let mut buf = Buffer::empty(area);
        WeekStrip.render(area, &mut buf, view);
        buf
    }

    fn state_of(view: &WeekView, date: Date) -> Option<DayState> {
        view.slots
            .iter()
            .find(|s| s.day.date() == date)
            .map(|s| s.day.state())
    }

    impl WeekView {
        pub(crate) fn cell(&self, date: Date) -> Option<&DayCell> {
            self.slots
                .iter()
                .find(|s| s.day.date() == date)
                .map(|s| &s.cell)
        }
    }

    #[test]
    fn test_new_marks_other_months_out() {
        let view = week(date!(2025 - 01 - 01));
        assert_eq!(state_of(&view, date!(2024 - 12 - 29)), Some(DayState::Out));
        assert_eq!(state_of(&view, date!(2024 - 12 - 31)), Some(DayState::Out));
        assert_eq!(
            state_of(&view, date!(2025 - 01 - 01)),
            Some(DayState::Available)
        );
        assert_eq!(view.focused(), Some(date!(2025 - 01 - 01)));
    }

    #[test]
    fn test_unavailable() {
        let view = week(date!(2023 - 11 - 16)).unavailable(&[date!(2023 - 11 - 17)]);
        assert_eq!(
            state_of(&view, date!(2023 - 11 - 17)),
            Some(DayState::Unavailable)
        );
    }

    #[test]
    fn test_tap_selects_and_moves_selection() {
        let mut view = week(date!(2023 - 11 - 16));
        assert!(view.tap_focused());
        assert_eq!(view.selected(), Some(date!(2023 - 11 - 16)));
        assert!(view.focus_next());
        assert!(view.tap_focused());
        assert_eq!(view.selected(), Some(date!(2023 - 11 - 17)));
        assert_eq!(
            state_of(&view, date!(2023 - 11 - 16)),
            Some(DayState::Available)
        );
        assert!(view.tap_focused());
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_tap_on_out_day_is_ignored() {
        let mut view = week(date!(2025 - 01 - 01));
        assert!(view.focus_previous());
        assert_eq!(view.focused(), Some(date!(2024 - 12 - 31)));
        assert!(!view.tap_focused());
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_focus_stops_at_ends() {
        let mut view = week(date!(2023 - 11 - 18));
        assert!(!view.focus_next());
        for _ in 0..6 {
            assert!(view.focus_previous());
        }
        assert!(!view.focus_previous());
        assert_eq!(view.focused(), Some(date!(2023 - 11 - 12)));
    }

    #[test]
    fn test_tap_at() {
        let mut view = week(date!(2023 - 11 - 16));
        render(&mut view);
        // Columns are 10 wide; Monday the 13th is the second
        assert!(view.tap_at(14, 3));
        assert_eq!(view.selected(), Some(date!(2023 - 11 - 13)));
        assert_eq!(view.focused(), Some(date!(2023 - 11 - 13)));
        // The header line belongs to no cell
        assert!(!view.tap_at(14, 0));
        assert!(!view.tap_at(75, 3));
    }

    #[test]
    fn test_render_header_and_labels() {
        let mut view = week(date!(2023 - 11 - 16));
        let buf = render(&mut view);
        let header = (0..70)
            .filter_map(|x| buf.cell((x, 0)).map(ratatui::buffer::Cell::symbol))
            .collect::<String>();
        let expected = [
            "    Su    ",
            "    Mo    ",
            "    Tu    ",
            "    We    ",
            "   [Th]   ",
            "    Fr    ",
            "    Sa    ",
        ]
        .concat();
        assert_eq!(header, expected);
        // Label of Sunday the 12th: 4x4 square at (3, 1), text on row 3
        let text = (3..7)
            .filter_map(|x| buf.cell((x, 3)).map(ratatui::buffer::Cell::symbol))
            .collect::<String>();
        assert_eq!(text, " 12 ");
    }

    #[test]
    fn test_cycle_dots() {
        let mut view = week(date!(2023 - 11 - 16));
        render(&mut view);
        let markers = |view: &WeekView| {
            view.slots[view.focus]
                .cell
                .markers()
                .iter()
                .map(|r| r.dots.len())
                .sum::<usize>()
        };
        for expected in [1, 2, 3, 0, 1] {
            view.cycle_dots();
            assert_eq!(markers(&view), expected);
        }
    }
}
