//! Lookback range selector
//!
//! A fixed, ordered set of six range tabs mapping a short label to a
//! lookback duration in days. The first tab is active by default; selecting
//! an unknown or disabled tab leaves the active selection untouched.

/// One selectable lookback range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeTab {
    /// Short label shown on the tab bar
    pub id: &'static str,
    /// Lookback duration in days
    pub duration_days: u32,
    /// Disabled tabs render but cannot be selected
    pub disabled: bool,
}

/// The fixed tab set, in display order
pub const RANGE_TABS: [RangeTab; 6] = [
    RangeTab { id: "1d", duration_days: 1, disabled: false },
    RangeTab { id: "3d", duration_days: 3, disabled: false },
    RangeTab { id: "1m", duration_days: 30, disabled: false },
    RangeTab { id: "6m", duration_days: 180, disabled: false },
    RangeTab { id: "1y", duration_days: 365, disabled: false },
    RangeTab { id: "max", duration_days: 3650, disabled: false },
];

/// Tracks which range tab is active
///
/// Selection is transient UI state; the only ordering rule is that the last
/// successful selection wins.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    tabs: &'static [RangeTab],
    active: usize,
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeSelector {
    /// Creates a selector with the first tab active
    pub fn new() -> Self {
        Self {
            tabs: &RANGE_TABS,
            active: 0,
        }
    }

    /// The full tab set, for rendering the tab bar
    pub fn tabs(&self) -> &[RangeTab] {
        self.tabs
    }

    /// The currently active tab
    pub fn active_tab(&self) -> &RangeTab {
        &self.tabs[self.active]
    }

    /// Index of the active tab within the tab set
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Lookback duration of the active tab, in days
    pub fn duration_days(&self) -> u32 {
        self.active_tab().duration_days
    }

    /// Selects a tab by label
    ///
    /// Returns the new duration when the active selection changed. Unknown
    /// labels, disabled tabs, and re-selecting the active tab all return
    /// `None` and leave the selection as it was.
    pub fn select(&mut self, id: &str) -> Option<u32> {
        let index = self.tabs.iter().position(|tab| tab.id == id)?;
        self.select_index(index)
    }

    /// Selects a tab by position, with the same change semantics as
    /// [`select`](Self::select)
    pub fn select_index(&mut self, index: usize) -> Option<u32> {
        let tab = self.tabs.get(index)?;
        if tab.disabled || index == self.active {
            return None;
        }
        self.active = index;
        Some(tab.duration_days)
    }

    /// Moves the selection one tab to the right, wrapping around
    pub fn select_next(&mut self) -> Option<u32> {
        self.step(1)
    }

    /// Moves the selection one tab to the left, wrapping around
    pub fn select_previous(&mut self) -> Option<u32> {
        self.step(self.tabs.len() - 1)
    }

    fn step(&mut self, offset: usize) -> Option<u32> {
        let mut index = self.active;
        // Skip over disabled tabs; give up after a full cycle
        for _ in 0..self.tabs.len() {
            index = (index + offset) % self.tabs.len();
            if !self.tabs[index].disabled {
                return self.select_index(index);
            }
        }
        None
    }
}
