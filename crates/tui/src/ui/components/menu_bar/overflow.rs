//! Greedy overflow classification.
//!
//! Items are packed left to right. The first item whose cumulative width
//! exceeds the available space starts the overflowed suffix; items are never
//! reordered. Space for the "More" toggle is reserved only when something
//! actually overflows, so a bar where everything fits uses the full width and
//! hides the toggle.

use std::ops::Range;

/// Result of one classification: items `[0, split)` stay inline, items
/// `[split, len)` move into the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowSplit {
    pub split: usize,
    pub len: usize,
}

impl OverflowSplit {
    /// Everything inline.
    pub fn all_visible(len: usize) -> Self {
        Self { split: len, len }
    }

    pub fn visible(&self) -> Range<usize> {
        0..self.split
    }

    pub fn overflowed(&self) -> Range<usize> {
        self.split..self.len
    }

    pub fn has_overflow(&self) -> bool {
        self.split < self.len
    }

    /// The toggle is shown exactly when the overflow set is non-empty.
    pub fn toggle_visible(&self) -> bool {
        self.has_overflow()
    }
}

/// Splits `widths` into a visible prefix and an overflowed suffix.
///
/// An item that exactly fills the remaining space stays visible. A single
/// item wider than the container overflows on its own rather than being
/// truncated inline.
pub fn classify_overflow(widths: &[u16], container_width: u16, reserved_control_width: u16) -> OverflowSplit {
    let len = widths.len();
    let total: u32 = widths.iter().map(|w| u32::from(*w)).sum();
    if total <= u32::from(container_width) {
        return OverflowSplit::all_visible(len);
    }

    let budget = u32::from(container_width.saturating_sub(reserved_control_width));
    let mut used = 0u32;
    for (index, width) in widths.iter().enumerate() {
        used += u32::from(*width);
        if used > budget {
            return OverflowSplit { split: index, len };
        }
    }
    // total > container >= budget, so the loop has already returned.
    OverflowSplit::all_visible(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trailing_item_overflows_when_sum_exceeds_container() {
        let split = classify_overflow(&[50, 50, 50], 140, 0);
        assert_eq!(split.visible(), 0..2);
        assert_eq!(split.overflowed(), 2..3);
        assert!(split.toggle_visible());
    }

    #[test]
    fn single_item_wider_than_container_overflows() {
        let split = classify_overflow(&[200], 100, 0);
        assert_eq!(split.visible(), 0..0);
        assert_eq!(split.overflowed(), 0..1);
    }

    #[test]
    fn everything_fits_hides_toggle() {
        let split = classify_overflow(&[30, 30, 30, 30], 1000, 0);
        assert!(!split.has_overflow());
        assert!(!split.toggle_visible());
        assert_eq!(split.visible(), 0..4);
    }

    #[test]
    fn empty_list_has_no_overflow() {
        let split = classify_overflow(&[], 10, 4);
        assert_eq!(split, OverflowSplit { split: 0, len: 0 });
        assert!(!split.toggle_visible());
    }

    #[test]
    fn exact_fill_stays_visible() {
        // 40 + 40 + 20 == 100 - 0: fits without reserving the toggle.
        assert!(!classify_overflow(&[40, 40, 20], 100, 30).has_overflow());
        // Once overflow is needed the budget is 100 - 30 = 70; 30 + 40 == 70 stays.
        let split = classify_overflow(&[30, 40, 40], 100, 30);
        assert_eq!(split.split, 2);
    }

    #[test]
    fn reserved_width_only_applies_when_something_overflows() {
        // Full width fits: reserved control width is ignored.
        assert!(!classify_overflow(&[45, 45], 90, 20).has_overflow());
        // 91 cells needed: now reserve 20, leaving 70 for the inline prefix.
        assert_eq!(classify_overflow(&[45, 46], 90, 20).split, 1);
    }

    #[test]
    fn reserved_wider_than_container_overflows_everything_measurable() {
        let split = classify_overflow(&[0, 5, 5], 8, 12);
        assert_eq!(split.split, 1);
    }

    proptest! {
        #[test]
        fn overflow_is_a_contiguous_suffix(
            widths in proptest::collection::vec(0u16..200, 0..24),
            container in 0u16..2000,
            reserved in 0u16..60,
        ) {
            let split = classify_overflow(&widths, container, reserved);
            prop_assert!(split.split <= widths.len());
            prop_assert_eq!(split.len, widths.len());

            let prefix: u32 = widths[..split.split].iter().map(|w| u32::from(*w)).sum();
            if split.has_overflow() {
                let budget = u32::from(container.saturating_sub(reserved));
                prop_assert!(prefix <= budget);
                prop_assert!(prefix + u32::from(widths[split.split]) > budget);
            } else {
                prop_assert!(prefix <= u32::from(container));
            }
        }

        #[test]
        fn classification_is_idempotent(
            widths in proptest::collection::vec(0u16..200, 0..24),
            container in 0u16..2000,
            reserved in 0u16..60,
        ) {
            prop_assert_eq!(
                classify_overflow(&widths, container, reserved),
                classify_overflow(&widths, container, reserved)
            );
        }

        #[test]
        fn fitting_sum_never_overflows(
            widths in proptest::collection::vec(0u16..50, 0..16),
            reserved in 0u16..60,
        ) {
            let total: u32 = widths.iter().map(|w| u32::from(*w)).sum();
            let container = u16::try_from(total).unwrap_or(u16::MAX);
            prop_assert!(!classify_overflow(&widths, container, reserved).toggle_visible());
        }
    }
}
