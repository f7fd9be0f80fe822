use crate::calendar::{AppearanceProvider, DayShape, DayState, Font};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const FOCUS_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

/// Colors, fonts and geometry for every day state, as read from a theme file
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Theme {
    pub(crate) shape: Option<DayShape>,
    pub(crate) selected_area: Option<f32>,
    pub(crate) should_color_today: Option<bool>,
    pub(crate) today: TodayStyle,
    pub(crate) available: StateStyle,
    pub(crate) selected: StateStyle,
    pub(crate) out: StateStyle,
    pub(crate) unavailable: StateStyle,
}

impl Theme {
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Theme, ThemeError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ThemeError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&src).map_err(|source| ThemeError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    fn style(&self, state: DayState) -> &StateStyle {
        match state {
            DayState::Available => &self.available,
            DayState::Selected => &self.selected,
            DayState::Out => &self.out,
            DayState::Unavailable => &self.unavailable,
        }
    }
}

impl Default for Theme {
    fn default() -> Theme {
        Theme {
            shape: Some(DayShape::Circle),
            selected_area: None,
            should_color_today: None,
            today: TodayStyle {
                text_color: Some(Color::LightYellow),
                background_color: None,
                font: Some(Font::new(Modifier::BOLD | Modifier::UNDERLINED)),
            },
            available: StateStyle {
                font: Some(Font::default()),
                text_color: Some(Color::White),
                text_background_color: Some(Color::Black),
                background_color: Some(Color::Black),
                border_width: Some(0),
                dot_offset: Some(0),
                ..StateStyle::default()
            },
            selected: StateStyle {
                font: Some(Font::new(Modifier::BOLD)),
                text_color: Some(Color::Black),
                text_background_color: Some(Color::LightBlue),
                dot_offset: Some(0),
                ..StateStyle::default()
            },
            out: StateStyle {
                font: Some(Font::new(Modifier::DIM)),
                text_color: Some(Color::DarkGray),
                text_background_color: Some(Color::Black),
                dot_offset: Some(0),
                ..StateStyle::default()
            },
            unavailable: StateStyle {
                font: Some(Font::new(Modifier::CROSSED_OUT)),
                text_color: Some(Color::Red),
                text_background_color: Some(Color::Black),
                dot_offset: Some(0),
                ..StateStyle::default()
            },
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StateStyle {
    pub(crate) font: Option<Font>,
    pub(crate) text_color: Option<Color>,
    pub(crate) text_background_color: Option<Color>,
    pub(crate) background_color: Option<Color>,
    pub(crate) border_width: Option<u16>,
    pub(crate) border_color: Option<Color>,
    pub(crate) dot_offset: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TodayStyle {
    pub(crate) text_color: Option<Color>,
    pub(crate) background_color: Option<Color>,
    pub(crate) font: Option<Font>,
}

impl AppearanceProvider for Theme {
    fn font(&self, state: DayState) -> Option<Font> {
        self.style(state).font
    }

    fn text_color(&self, state: DayState) -> Option<Color> {
        self.style(state).text_color
    }

    fn should_color_today(&self) -> Option<bool> {
        self.should_color_today
    }

    fn text_color_for_today(&self) -> Option<Color> {
        self.today.text_color
    }

    fn font_for_today(&self) -> Option<Font> {
        self.today.font
    }

    fn background_color_for_today(&self) -> Option<Color> {
        self.today.background_color
    }

    fn text_background_color(&self, state: DayState) -> Option<Color> {
        self.style(state).text_background_color
    }

    fn background_color(&self, state: DayState) -> Option<Color> {
        self.style(state).background_color
    }

    fn border_width(&self, state: DayState) -> Option<u16> {
        self.style(state).border_width
    }

    fn border_color(&self, state: DayState) -> Option<Color> {
        self.style(state).border_color
    }

    fn dot_bottom_vertical_offset(&self, state: DayState) -> Option<u16> {
        self.style(state).dot_offset
    }

    fn shape(&self) -> Option<DayShape> {
        self.shape
    }

    fn selected_area(&self) -> Option<f32> {
        self.selected_area
    }
}

#[derive(Debug, Error)]
pub(crate) enum ThemeError {
    #[error("failed to read theme file {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse theme file {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
