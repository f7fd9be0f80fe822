use crate::calendar::{WeekStrip, WeekView};
use crate::help::Help;
use crate::theme::{BASE_STYLE, WEEKDAY_STYLE};
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::Date;

/// Lines given to the week: the weekday header plus the day cells
const WEEK_LINES: u16 = 8;

#[derive(Debug)]
pub(crate) struct App {
    week: WeekView,
    state: AppState,
}

impl App {
    pub(crate) fn new(week: WeekView) -> App {
        App {
            week,
            state: AppState::Calendar,
        }
    }

    /// Runs until the user quits, then returns the selected date, if any
    pub(crate) fn run<B: Backend>(
        mut self,
        mut terminal: Terminal<B>,
    ) -> io::Result<Option<Date>> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(self.week.selected())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        match read()? {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                    self.state = AppState::Quitting;
                } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                    self.beep()?;
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                if !self.handle_click(column, row) {
                    self.beep()?;
                }
            }
            // Redraw on resize, and we might as well redraw on other stuff
            // too
            _ => (),
        }
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key or tried to select a
    // day that cannot be selected
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.week.focus_previous(),
                KeyCode::Char('l') | KeyCode::Right => self.week.focus_next(),
                KeyCode::Char(' ') | KeyCode::Enter => self.week.tap_focused(),
                KeyCode::Char('d') => {
                    self.week.cycle_dots();
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Quitting => false,
        }
    }

    // Returns `false` if the click missed every day or landed on one that
    // cannot be selected
    fn handle_click(&mut self, column: u16, row: u16) -> bool {
        match self.state {
            AppState::Calendar => self.week.tap_at(column, row),
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [title, _, week] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(WEEK_LINES),
        ])
        .areas(area);
        if let Some(date) = self.week.focused() {
            Line::styled(format!("{} {}", date.month(), date.year()), WEEKDAY_STYLE)
                .alignment(Alignment::Center)
                .render(title, buf);
        }
        WeekStrip.render(week, buf, &mut self.week);
        if self.state == AppState::Helping {
            Help.render(area, buf);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use std::rc::Rc;
    use time::macros::date;

    fn app() -> App {
        let week = WeekView::new(date!(2025 - 01 - 01), Rc::new(Theme::default()))
            .today(date!(2025 - 01 - 02));
        App::new(week)
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(ratatui::buffer::Cell::symbol))
            .collect()
    }

    #[test]
    fn test_keys_select_days() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.week.selected(), Some(date!(2025 - 01 - 01)));
        assert!(app.handle_key(KeyCode::Char('l')));
        assert!(app.handle_key(KeyCode::Char(' ')));
        assert_eq!(app.week.selected(), Some(date!(2025 - 01 - 02)));
        // Back to the previous year, which is out of range
        for _ in 0..2 {
            assert!(app.handle_key(KeyCode::Left));
        }
        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.week.selected(), Some(date!(2025 - 01 - 02)));
    }

    #[test]
    fn test_invalid_key() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert!(!app.quitting());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.quitting());
    }

    #[test]
    fn test_render_title() {
        let mut app = app();
        let area = Rect::new(0, 0, 70, 12);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert_eq!(row(&buffer, 0).trim(), "January 2025");
        assert!(row(&buffer, 2).contains("[We]"));
    }

    #[test]
    fn test_click_selects_day() {
        let mut app = app();
        let area = Rect::new(0, 0, 70, 12);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        // Friday the 3rd is the sixth 10-column cell; cells start on line 3
        assert!(app.handle_click(55, 5));
        assert_eq!(app.week.selected(), Some(date!(2025 - 01 - 03)));
    }

    #[test]
    fn test_click_on_unselectable_day_is_rejected() {
        let mut app = app();
        let area = Rect::new(0, 0, 70, 12);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        // Sunday the 29th belongs to December
        assert!(!app.handle_click(5, 5));
        // The title line holds no day
        assert!(!app.handle_click(35, 0));
        assert_eq!(app.week.selected(), None);
    }

    #[test]
    fn test_help_and_dismiss() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('?')));
        let area = Rect::new(0, 0, 70, 15);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert!((0..15).any(|y| row(&buffer, y).contains("Commands")));
        assert!(app.handle_key(KeyCode::Char('z')));
        assert_eq!(app.state, AppState::Calendar);
    }
}
