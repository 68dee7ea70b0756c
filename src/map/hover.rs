//! Pointer hover bookkeeping
//!
//! Pointer motion arrives for every cell the mouse crosses; the dashboard
//! only wants to hear about it when the country under the pointer changes.

use crate::api::types::CountryMood;

/// What the hover callback receives
#[derive(Clone, Debug, PartialEq)]
pub struct HoverEvent {
    /// Feature code under the pointer, `None` when nothing is hovered
    pub code: Option<String>,
    /// Data for that feature, if the API reported it
    pub country: Option<CountryMood>,
    /// Pointer position in screen cells
    pub point: Option<(u16, u16)>,
}

impl HoverEvent {
    pub fn cleared() -> Self {
        Self {
            code: None,
            country: None,
            point: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverChange {
    Entered(String),
    Cleared,
}

#[derive(Debug, Default)]
pub struct HoverTracker {
    hovered: Option<String>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Feed the code under the pointer; returns a change only on transitions
    pub fn moved(&mut self, code: Option<&str>) -> Option<HoverChange> {
        match code {
            Some(code) if self.hovered.as_deref() != Some(code) => {
                self.hovered = Some(code.to_string());
                Some(HoverChange::Entered(code.to_string()))
            }
            Some(_) => None,
            None if self.hovered.is_some() => {
                self.hovered = None;
                Some(HoverChange::Cleared)
            }
            None => None,
        }
    }

    /// The pointer left the map; always reports a clear
    pub fn left(&mut self) -> HoverChange {
        self.hovered = None;
        HoverChange::Cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_on_transitions() {
        let mut t = HoverTracker::new();
        assert_eq!(t.moved(Some("FR")), Some(HoverChange::Entered("FR".into())));
        assert_eq!(t.moved(Some("FR")), None);
        assert_eq!(t.moved(Some("FR")), None);
        assert_eq!(t.moved(Some("DE")), Some(HoverChange::Entered("DE".into())));
        assert_eq!(t.hovered(), Some("DE"));
    }

    #[test]
    fn ocean_clears_once() {
        let mut t = HoverTracker::new();
        assert_eq!(t.moved(None), None);
        t.moved(Some("BR"));
        assert_eq!(t.moved(None), Some(HoverChange::Cleared));
        assert_eq!(t.moved(None), None);
        assert_eq!(t.hovered(), None);
    }

    #[test]
    fn leaving_always_clears() {
        let mut t = HoverTracker::new();
        assert_eq!(t.left(), HoverChange::Cleared);
        t.moved(Some("JP"));
        assert_eq!(t.left(), HoverChange::Cleared);
        // re-entering the same country fires again
        assert_eq!(t.moved(Some("JP")), Some(HoverChange::Entered("JP".into())));
    }
}
