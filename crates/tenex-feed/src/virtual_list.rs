//! Windowing for long thread lists.
//!
//! Only the rows intersecting the viewport, plus an overscan margin on each
//! side, are materialized. Short lists skip windowing entirely.

use std::ops::Range;

use crate::config::ListConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualList {
    pub row_height: u32,
    pub overscan: usize,
    /// Lists with at most this many rows render directly
    pub threshold: usize,
}

/// Which rows to render and where to place them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    /// Render every row, no spacer.
    All { count: usize },
    Window {
        rows: Range<usize>,
        /// Offset of the first rendered row from the top of the list
        offset: u64,
        /// Height of the full list, for the scroll container
        total_height: u64,
    },
}

impl RenderPlan {
    pub fn rows(&self) -> Range<usize> {
        match self {
            Self::All { count } => 0..*count,
            Self::Window { rows, .. } => rows.clone(),
        }
    }

    pub fn is_virtualized(&self) -> bool {
        matches!(self, Self::Window { .. })
    }
}

impl VirtualList {
    pub fn new(row_height: u32, overscan: usize, threshold: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            overscan,
            threshold,
        }
    }

    pub fn from_config(config: &ListConfig) -> Self {
        Self::new(config.row_height, config.overscan, config.virtualization_threshold)
    }

    pub fn plan(&self, total: usize, scroll_offset: u64, viewport_height: u64) -> RenderPlan {
        if total <= self.threshold {
            return RenderPlan::All { count: total };
        }

        let row_height = u64::from(self.row_height.max(1));
        let first_visible = usize::try_from(scroll_offset / row_height)
            .unwrap_or(usize::MAX)
            .min(total);
        // One past the last row touching the bottom edge of the viewport
        let last_visible_end = usize::try_from(
            scroll_offset
                .saturating_add(viewport_height)
                .div_ceil(row_height),
        )
        .unwrap_or(usize::MAX);

        let start = first_visible.saturating_sub(self.overscan);
        let end = last_visible_end.saturating_add(self.overscan).min(total);

        RenderPlan::Window {
            rows: start..end,
            offset: start as u64 * row_height,
            total_height: total as u64 * row_height,
        }
    }

    /// The slice of `items` to materialize for this scroll position.
    pub fn visible<'a, T>(&self, items: &'a [T], scroll_offset: u64, viewport_height: u64) -> &'a [T] {
        &items[self.plan(items.len(), scroll_offset, viewport_height).rows()]
    }
}

impl Default for VirtualList {
    fn default() -> Self {
        Self::from_config(&ListConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> VirtualList {
        VirtualList::new(10, 2, 20)
    }

    #[test]
    fn test_small_lists_render_everything() {
        let plan = list().plan(20, 500, 30);
        assert_eq!(plan, RenderPlan::All { count: 20 });
        assert!(!plan.is_virtualized());
    }

    #[test]
    fn test_window_at_top() {
        let plan = list().plan(100, 0, 50);
        assert_eq!(
            plan,
            RenderPlan::Window {
                rows: 0..7,
                offset: 0,
                total_height: 1000
            }
        );
    }

    #[test]
    fn test_window_in_middle_includes_overscan() {
        // Pixels 305..355 touch rows 30 through 35
        let plan = list().plan(100, 305, 50);
        assert_eq!(plan.rows(), 28..38);
        match plan {
            RenderPlan::Window { offset, .. } => assert_eq!(offset, 280),
            other => panic!("expected window, got {:?}", other),
        }
    }

    #[test]
    fn test_unaligned_scroll_keeps_partial_last_row() {
        let list = VirtualList::new(10, 0, 0);
        assert_eq!(list.plan(100, 305, 50).rows(), 30..36);
        assert_eq!(list.plan(100, 300, 50).rows(), 30..35);
    }

    #[test]
    fn test_window_clamped_at_end() {
        let plan = list().plan(100, 10_000, 50);
        assert_eq!(plan.rows(), 98..100);
    }

    #[test]
    fn test_zero_row_height_is_clamped() {
        let list = VirtualList::new(0, 0, 0);
        assert_eq!(list.plan(10, 3, 2).rows(), 3..5);
    }

    #[test]
    fn test_visible_slice() {
        let items: Vec<usize> = (0..100).collect();
        let visible = list().visible(&items, 0, 20);
        assert_eq!(visible, &[0, 1, 2, 3]);
    }
}
