use super::DayState;
use ratatui::style::{Color, Modifier};
use serde::Deserialize;
use std::fmt;

/// Fraction of the shorter side of a cell that the date label occupies when
/// the provider has no opinion
pub(crate) const DEFAULT_SELECTED_AREA: f32 = 0.8;

/// Rows between the bottom of the date label and the top of a dot row when
/// the provider has no opinion
pub(crate) const DEFAULT_DOT_OFFSET: u16 = 2;

/// Style queries a day cell makes each time it renders.
///
/// Every method is optional: returning `None` means "no opinion", and the cell
/// keeps whatever value it was already showing rather than resetting it.
pub(crate) trait AppearanceProvider: fmt::Debug {
    fn font(&self, _state: DayState) -> Option<Font> {
        None
    }

    fn text_color(&self, _state: DayState) -> Option<Color> {
        None
    }

    /// Only consulted by cells using [`TodayPolicy::ProviderDecides`]
    ///
    /// [`TodayPolicy::ProviderDecides`]: super::TodayPolicy::ProviderDecides
    fn should_color_today(&self) -> Option<bool> {
        None
    }

    fn text_color_for_today(&self) -> Option<Color> {
        None
    }

    fn font_for_today(&self) -> Option<Font> {
        None
    }

    fn background_color_for_today(&self) -> Option<Color> {
        None
    }

    fn text_background_color(&self, _state: DayState) -> Option<Color> {
        None
    }

    fn background_color(&self, _state: DayState) -> Option<Color> {
        None
    }

    fn border_width(&self, _state: DayState) -> Option<u16> {
        None
    }

    fn border_color(&self, _state: DayState) -> Option<Color> {
        None
    }

    fn dot_bottom_vertical_offset(&self, _state: DayState) -> Option<u16> {
        None
    }

    fn shape(&self) -> Option<DayShape> {
        None
    }

    /// Fraction (0 to 1) of the cell's shorter side given to the date label
    fn selected_area(&self) -> Option<f32> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DayShape {
    #[default]
    Rectangle,
    Circle,
}

/// Text treatment of a date label.  Terminals have no typefaces, so a "font"
/// is the set of text modifiers applied to the label.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(from = "Vec<FontStyle>")]
pub(crate) struct Font(Modifier);

impl Font {
    pub(crate) const fn new(modifier: Modifier) -> Font {
        Font(modifier)
    }

    pub(crate) fn modifier(self) -> Modifier {
        self.0
    }
}

impl From<Vec<FontStyle>> for Font {
    fn from(styles: Vec<FontStyle>) -> Font {
        Font(
            styles
                .into_iter()
                .fold(Modifier::empty(), |m, style| m | style.modifier()),
        )
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FontStyle {
    Bold,
    Dim,
    Italic,
    Underlined,
    Reversed,
    #[serde(alias = "strikethrough")]
    CrossedOut,
}

impl FontStyle {
    fn modifier(self) -> Modifier {
        match self {
            FontStyle::Bold => Modifier::BOLD,
            FontStyle::Dim => Modifier::DIM,
            FontStyle::Italic => Modifier::ITALIC,
            FontStyle::Underlined => Modifier::UNDERLINED,
            FontStyle::Reversed => Modifier::REVERSED,
            FontStyle::CrossedOut => Modifier::CROSSED_OUT,
        }
    }
}
