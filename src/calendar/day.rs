use ratatui::style::Color;
use std::sync::mpsc::{channel, Receiver, Sender};
use time::Date;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum DayState {
    #[default]
    Available,
    Selected,
    /// The date lies outside the range the parent is currently showing, e.g.,
    /// it belongs to an adjacent month
    Out,
    Unavailable,
}

impl DayState {
    #[cfg(test)]
    pub(crate) const ALL: [DayState; 4] = [
        DayState::Available,
        DayState::Selected,
        DayState::Out,
        DayState::Unavailable,
    ];

    /// Whether a tap on a day in this state should be reported
    pub(crate) fn is_selectable(self) -> bool {
        !matches!(self, DayState::Out | DayState::Unavailable)
    }
}

/// Auxiliary marker drawn beneath a day's label
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Supplementary {
    BottomDots(Vec<Color>),
}

/// A calendar date together with its selection state and markers.
///
/// Views bound to a day learn about changes by subscribing with
/// [`Day::on_state_changed()`] and [`Day::on_supplementaries_changed()`];
/// every mutation through the setters is pushed to all live subscribers.
#[derive(Debug)]
pub(crate) struct Day {
    date: Date,
    state: DayState,
    supplementaries: Vec<Supplementary>,
    state_observers: Vec<Sender<DayState>>,
    supplementary_observers: Vec<Sender<()>>,
}

impl Day {
    pub(crate) fn new(date: Date) -> Day {
        Day {
            date,
            state: DayState::default(),
            supplementaries: Vec::new(),
            state_observers: Vec::new(),
            supplementary_observers: Vec::new(),
        }
    }

    pub(crate) fn with_state(mut self, state: DayState) -> Day {
        self.state = state;
        self
    }

    pub(crate) fn date(&self) -> Date {
        self.date
    }

    pub(crate) fn state(&self) -> DayState {
        self.state
    }

    pub(crate) fn supplementaries(&self) -> &[Supplementary] {
        &self.supplementaries
    }

    pub(crate) fn set_state(&mut self, state: DayState) {
        self.state = state;
        self.state_observers.retain(|tx| tx.send(state).is_ok());
    }

    pub(crate) fn set_supplementaries(&mut self, supplementaries: Vec<Supplementary>) {
        self.supplementaries = supplementaries;
        self.supplementary_observers.retain(|tx| tx.send(()).is_ok());
    }

    pub(crate) fn on_state_changed(&mut self) -> Receiver<DayState> {
        let (tx, rx) = channel();
        self.state_observers.push(tx);
        rx
    }

    pub(crate) fn on_supplementaries_changed(&mut self) -> Receiver<()> {
        let (tx, rx) = channel();
        self.supplementary_observers.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_state_change_notifies_subscribers() {
        let mut day = Day::new(date!(2024 - 03 - 14));
        let first = day.on_state_changed();
        let second = day.on_state_changed();
        day.set_state(DayState::Selected);
        day.set_state(DayState::Available);
        let expected = [DayState::Selected, DayState::Available];
        assert_eq!(first.try_iter().collect::<Vec<_>>(), expected);
        assert_eq!(second.try_iter().collect::<Vec<_>>(), expected);
        assert_eq!(day.state(), DayState::Available);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut day = Day::new(date!(2024 - 03 - 14));
        let rx = day.on_supplementaries_changed();
        drop(day.on_supplementaries_changed());
        day.set_supplementaries(vec![Supplementary::BottomDots(vec![Color::Red])]);
        assert_eq!(day.supplementary_observers.len(), 1);
        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(
            day.supplementaries(),
            [Supplementary::BottomDots(vec![Color::Red])]
        );
    }

    #[test]
    fn test_selectable_states() {
        assert!(DayState::Available.is_selectable());
        assert!(DayState::Selected.is_selectable());
        assert!(!DayState::Out.is_selectable());
        assert!(!DayState::Unavailable.is_selectable());
    }
}
