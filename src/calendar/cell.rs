use super::appearance::{
    AppearanceProvider, DayShape, Font, DEFAULT_DOT_OFFSET, DEFAULT_SELECTED_AREA,
};
use super::day::{Day, DayState, Supplementary};
use super::util::{format_day, is_today};
use log::{debug, warn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Widget},
};
use serde::{de, Deserialize, Deserializer};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};
use time::Date;

/// Width and height of a single dot marker, in terminal cells
pub(crate) const DOT_SIZE: u16 = 1;

/// Columns between consecutive dots in a row
pub(crate) const DOT_SPACING: u16 = 1;

const DOT_SYMBOL: &str = "●";

/// Whether a cell showing today's date applies the provider's "today"
/// overrides
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum TodayPolicy {
    /// Apply the overrides every time the state is rendered
    #[default]
    Always,
    /// Apply the overrides unless the provider's `should_color_today()`
    /// returns `Some(false)`
    ProviderDecides,
}

/// Sent to a cell's delegate when the user taps a selectable day.  The date
/// identifies the day within its parent.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DaySelected {
    pub(crate) date: Date,
    pub(crate) state: DayState,
}

/// Corner radius of a clipped label, counted in half rows so that the radius
/// of an odd-height label is exact
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct CornerRadius(u16);

impl CornerRadius {
    fn half_of(length: u16) -> CornerRadius {
        CornerRadius(length)
    }

    pub(crate) fn halves(self) -> u16 {
        self.0
    }
}

/// Everything a cell paints apart from its text and markers
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Visuals {
    pub(crate) background: Option<Color>,
    pub(crate) border_color: Option<Color>,
    pub(crate) border_width: u16,
    pub(crate) text_color: Option<Color>,
    pub(crate) text_background: Option<Color>,
    pub(crate) font: Font,
    /// `Some` once the label has been clipped to a circle
    pub(crate) corner_radius: Option<CornerRadius>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DotRow {
    pub(crate) area: Rect,
    pub(crate) dots: Vec<DotMarker>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DotMarker {
    pub(crate) area: Rect,
    pub(crate) color: Color,
}

/// Renders a single [`Day`] and reports taps on it.
///
/// The cell never owns its day: the parent keeps the `Day` and hands it to
/// the cell whenever the cell needs to read it.  Changes made to the day
/// through its setters are queued for the cell by the subscriptions taken out
/// in [`DayCell::new()`] and applied by [`DayCell::process_notifications()`].
#[derive(Debug)]
pub(crate) struct DayCell {
    frame: Rect,
    label: Rect,
    text: String,
    visuals: Visuals,
    markers: Vec<DotRow>,
    appearance: Option<Rc<dyn AppearanceProvider>>,
    delegate: Sender<DaySelected>,
    state_changes: Receiver<DayState>,
    supplementary_changes: Receiver<()>,
    today: Option<Date>,
    today_policy: TodayPolicy,
}

impl DayCell {
    pub(crate) fn new(
        day: &mut Day,
        appearance: Option<Rc<dyn AppearanceProvider>>,
        delegate: Sender<DaySelected>,
    ) -> DayCell {
        DayCell {
            frame: Rect::default(),
            label: Rect::default(),
            text: format_day(day.date()),
            visuals: Visuals::default(),
            markers: Vec::new(),
            appearance,
            delegate,
            state_changes: day.on_state_changed(),
            supplementary_changes: day.on_supplementaries_changed(),
            today: None,
            today_policy: TodayPolicy::default(),
        }
    }

    /// Use `date` as "today" instead of asking the system clock
    #[cfg(test)]
    pub(crate) fn today(mut self, date: Date) -> DayCell {
        self.today = Some(date);
        self
    }

    pub(crate) fn today_policy(mut self, policy: TodayPolicy) -> DayCell {
        self.today_policy = policy;
        self
    }

    pub(crate) fn frame(&self) -> Rect {
        self.frame
    }

    pub(crate) fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    /// Lays out the date label inside the current frame and renders the
    /// day's state and markers from scratch.
    pub(crate) fn setup_day(&mut self, day: &Day) {
        let area = self
            .appearance
            .as_deref()
            .and_then(AppearanceProvider::selected_area)
            .unwrap_or(DEFAULT_SELECTED_AREA);
        let side = label_side(self.frame.width.min(self.frame.height), area);
        self.label = Rect {
            x: self.frame.x + (self.frame.width - side) / 2,
            y: self.frame.y + (self.frame.height - side) / 2,
            width: side,
            height: side,
        };
        self.text = format_day(day.date());
        debug!("laid out {} with label {:?}", day.date(), self.label);
        self.set_state(day.state(), day);
    }

    /// Applies any notifications queued by the bound day since the last call.
    /// Returns `true` if there were any.
    pub(crate) fn process_notifications(&mut self, day: &Day) -> bool {
        let mut changed = false;
        while let Ok(state) = self.state_changes.try_recv() {
            self.set_state(state, day);
            changed = true;
        }
        let mut markers_changed = false;
        while self.supplementary_changes.try_recv().is_ok() {
            markers_changed = true;
        }
        if markers_changed {
            self.update_supplementary_views(day);
        }
        changed || markers_changed
    }

    /// Re-queries the appearance provider for `state`.  Queries answered with
    /// `None` leave the corresponding visual untouched.
    pub(crate) fn set_state(&mut self, state: DayState, day: &Day) {
        debug!("rendering {} as {state:?}", day.date());
        if let Some(appearance) = self.appearance.as_deref() {
            if appearance.shape() == Some(DayShape::Circle) && state == DayState::Selected {
                self.visuals.corner_radius = Some(CornerRadius::half_of(self.label.height));
            }
            let v = &mut self.visuals;
            v.background = appearance.background_color(state).or(v.background);
            v.border_color = appearance.border_color(state).or(v.border_color);
            v.border_width = appearance.border_width(state).unwrap_or(v.border_width);
            v.text_color = appearance.text_color(state).or(v.text_color);
            v.text_background = appearance.text_background_color(state).or(v.text_background);
            v.font = appearance.font(state).unwrap_or(v.font);
        }
        self.update_supplementary_views(day);
        if self.colors_today(day.date()) {
            if let Some(appearance) = self.appearance.as_deref() {
                let v = &mut self.visuals;
                v.text_color = appearance.text_color_for_today().or(v.text_color);
                v.text_background = appearance.background_color_for_today().or(v.text_background);
                v.font = appearance.font_for_today().unwrap_or(v.font);
                if appearance.shape() == Some(DayShape::Circle) {
                    v.corner_radius = Some(CornerRadius::half_of(self.label.height));
                }
            }
        }
    }

    /// Reports a tap to the delegate.  Taps on days that are out of range or
    /// unavailable are ignored, in which case `false` is returned.
    pub(crate) fn tap(&self, day: &Day) -> bool {
        let state = day.state();
        if !state.is_selectable() {
            debug!("ignoring tap on {} in state {state:?}", day.date());
            return false;
        }
        let event = DaySelected {
            date: day.date(),
            state,
        };
        if self.delegate.send(event).is_err() {
            warn!("nobody is listening for the selection of {}", day.date());
        }
        true
    }

    /// Discards every marker and builds new ones from the day's current
    /// supplementaries.
    pub(crate) fn update_supplementary_views(&mut self, day: &Day) {
        self.markers.clear();
        for supplementary in day.supplementaries() {
            match supplementary {
                Supplementary::BottomDots(colors) => {
                    if let Some(row) = self.dot_row(colors, day.state()) {
                        self.markers.push(row);
                    }
                }
            }
        }
        debug!(
            "rebuilt {} marker row(s) for {}",
            self.markers.len(),
            day.date()
        );
    }

    fn dot_row(&self, colors: &[Color], state: DayState) -> Option<DotRow> {
        let count = u16::try_from(colors.len()).ok().filter(|&n| n > 0)?;
        let width = count
            .saturating_mul(DOT_SIZE)
            .saturating_add((count - 1).saturating_mul(DOT_SPACING));
        let offset = self
            .appearance
            .as_deref()
            .and_then(|a| a.dot_bottom_vertical_offset(state))
            .unwrap_or(DEFAULT_DOT_OFFSET);
        let x = centered(self.label.x, self.label.width, width);
        let y = self.label.bottom().saturating_add(offset);
        let dots = std::iter::zip(0u16.., colors)
            .map(|(i, &color)| DotMarker {
                area: Rect::new(
                    x.saturating_add(i.saturating_mul(DOT_SIZE + DOT_SPACING)),
                    y,
                    DOT_SIZE,
                    DOT_SIZE,
                ),
                color,
            })
            .collect();
        Some(DotRow {
            area: Rect::new(x, y, width, DOT_SIZE),
            dots,
        })
    }

    fn colors_today(&self, date: Date) -> bool {
        let is_today = match self.today {
            Some(today) => date == today,
            None => is_today(date),
        };
        is_today
            && match self.today_policy {
                TodayPolicy::Always => true,
                TodayPolicy::ProviderDecides => self
                    .appearance
                    .as_deref()
                    .and_then(AppearanceProvider::should_color_today)
                    .unwrap_or(true),
            }
    }

    fn is_clipped_corner(&self, x: u16, y: u16) -> bool {
        self.visuals
            .corner_radius
            .is_some_and(|r| r.halves() >= 2 && self.label.width >= 3 && self.label.height >= 3)
            && (x == self.label.left() || x == self.label.right() - 1)
            && (y == self.label.top() || y == self.label.bottom() - 1)
    }

    fn render_label(&self, clip: Rect, buf: &mut Buffer) {
        let label = self.label.intersection(clip);
        if label.is_empty() {
            return;
        }
        if let Some(bg) = self.visuals.text_background {
            for y in label.top()..label.bottom() {
                for x in label.left()..label.right() {
                    if self.is_clipped_corner(x, y) {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_bg(bg);
                    }
                }
            }
        }
        let mut style = Style::new().add_modifier(self.visuals.font.modifier());
        if let Some(fg) = self.visuals.text_color {
            style = style.fg(fg);
        }
        let text_row = Rect {
            y: self.label.y + self.label.height / 2,
            height: 1,
            ..self.label
        }
        .intersection(clip);
        if !text_row.is_empty() {
            // Same rounding as the dot rows, so a lone dot sits under the text
            let width = u16::try_from(self.text.chars().count()).unwrap_or(u16::MAX);
            let x = centered(self.label.x, self.label.width, width).max(text_row.x);
            buf.set_stringn(
                x,
                text_row.y,
                &self.text,
                usize::from(text_row.right().saturating_sub(x)),
                style,
            );
        }
    }
}

impl Widget for &DayCell {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let clip = self.frame.intersection(area).intersection(buf.area);
        if clip.is_empty() {
            return;
        }
        if let Some(bg) = self.visuals.background {
            buf.set_style(clip, Style::new().bg(bg));
        }
        if self.visuals.border_width > 0 {
            let mut border_style = Style::new();
            if let Some(color) = self.visuals.border_color {
                border_style = border_style.fg(color);
            }
            Block::bordered()
                .border_type(if self.visuals.border_width > 1 {
                    BorderType::Thick
                } else {
                    BorderType::Plain
                })
                .border_style(border_style)
                .render(clip, buf);
        }
        self.render_label(clip, buf);
        for row in self.markers.iter().filter(|row| row.area.intersects(clip)) {
            for dot in &row.dots {
                let pos = dot.area.as_position();
                if !clip.contains(pos) {
                    continue;
                }
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_symbol(DOT_SYMBOL).set_fg(dot.color);
                }
            }
        }
    }
}

/// Day cells are only ever built from a live [`Day`]; restoring one from
/// serialized data always fails.
impl<'de> Deserialize<'de> for DayCell {
    fn deserialize<D>(_deserializer: D) -> Result<DayCell, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(de::Error::custom(
            "day cells cannot be restored from serialized data; build one from a Day",
        ))
    }
}

// The result is at most `shortest`, so the cast cannot truncate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn label_side(shortest: u16, area: f32) -> u16 {
    let area = if area.is_nan() { 0.0 } else { area.clamp(0.0, 1.0) };
    (f32::from(shortest) * area).floor() as u16
}

/// Returns the leftmost column of a span of `width` columns centered on the
/// span of `length` columns starting at `start`
fn centered(start: u16, length: u16, width: u16) -> u16 {
    let doubled_center = u32::from(start) * 2 + u32::from(length);
    u16::try_from(doubled_center.saturating_sub(u32::from(width)) / 2).unwrap_or(u16::MAX)
}
