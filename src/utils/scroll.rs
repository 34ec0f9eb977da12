/// A page of a longer list, plus where the selection lands inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    /// Index of the first list item shown on the page.
    pub start: usize,
    /// Row of the selected item relative to `start`.
    pub selected: usize,
}

/// Handles page/selection calculations shared by the chat and message panes.
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Keep the selection at least `threshold` rows away from the bottom edge.
    ///
    /// While the selection fits on the first page it is shown at its raw
    /// offset; past that point the page scrolls forward so the selection stays
    /// pinned `threshold` rows above the bottom.
    pub fn visible_window(current: usize, page_size: usize, threshold: usize) -> VisibleWindow {
        let limit = page_size.saturating_sub(threshold);
        if current < limit {
            VisibleWindow {
                start: 0,
                selected: current,
            }
        } else {
            VisibleWindow {
                start: current - limit,
                selected: limit,
            }
        }
    }

    /// Move `current` by `step` within `[0, len - 1]`; returns `None` when nothing moves.
    pub fn step(current: usize, step: Step, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = len - 1;
        let target = match step {
            Step::Forward(n) => current.saturating_add(n),
            Step::Back(n) => current.saturating_sub(n),
        }
        .min(last);
        (target != current).then_some(target)
    }
}

/// A cursor move of some number of rows, toward the end or the start of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward(usize),
    Back(usize),
}
