//! Selection cursor and visible window
//!
//! Pure arithmetic, no locking. The navigator keeps one [`Cursor`] for the
//! current page and builds a throwaway one for an overlay page.

/// Maximum number of child rows drawn under the page label
pub const ROW_BUDGET: usize = 6;

/// Half-open range `[start, end)` of child indices currently drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// Window at the top of a list of `count` children
    pub fn reset(count: usize) -> Self {
        Self {
            start: 0,
            end: count.min(ROW_BUDGET),
        }
    }

    /// Number of rows in the window
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window holds no rows
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `index` is drawn
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// Selected child plus the window around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Index of the selected child
    pub option: usize,
    /// Drawn children
    pub window: Window,
}

impl Cursor {
    /// First child selected, window at the top
    pub fn reset(count: usize) -> Self {
        Self {
            option: 0,
            window: Window::reset(count),
        }
    }

    /// Select the previous child, sliding the window when it leaves the top
    ///
    /// Returns false at the first child.
    pub fn move_up(&mut self) -> bool {
        if self.option == 0 {
            return false;
        }
        self.option -= 1;
        if self.option < self.window.start {
            self.window.start -= 1;
            self.window.end -= 1;
        }
        true
    }

    /// Select the next of `count` children, sliding the window when the
    /// selection reaches its end
    ///
    /// Returns false at the last child.
    pub fn move_down(&mut self, count: usize) -> bool {
        if self.option + 1 >= count {
            return false;
        }
        self.option += 1;
        if self.option >= self.window.end {
            self.window.start += 1;
            self.window.end += 1;
        }
        true
    }

    /// Pull the cursor back inside a child list that changed length
    ///
    /// Dynamic pages can shrink or grow between renders. The selection is
    /// clamped to the last child and the window is rebuilt around it with
    /// full height where possible.
    pub fn fit(&mut self, count: usize) {
        let rows = count.min(ROW_BUDGET);
        if count == 0 {
            *self = Self::reset(0);
            return;
        }

        self.option = self.option.min(count - 1);
        if self.window.len() == rows && self.window.end <= count && self.window.contains(self.option)
        {
            return;
        }

        // Keep the old start if it still works, else end the window on the selection
        let start = if self.window.start <= self.option && self.window.start + rows <= count {
            self.window.start
        } else {
            (self.option + 1).saturating_sub(rows)
        };
        let start = if self.option >= start + rows {
            self.option + 1 - rows
        } else {
            start
        };
        self.window = Window {
            start,
            end: start + rows,
        };
    }

    /// Whether the window invariant holds for `count` children
    pub fn is_valid(&self, count: usize) -> bool {
        self.window.len() == count.min(ROW_BUDGET)
            && self.window.end <= count
            && (count == 0 || self.window.contains(self.option))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reset() {
        assert_eq!(Cursor::reset(2).window, Window { start: 0, end: 2 });
        assert_eq!(Cursor::reset(10).window, Window { start: 0, end: 6 });
        assert!(Cursor::reset(0).window.is_empty());
    }

    #[test]
    fn test_move_within_window() {
        let mut cursor = Cursor::reset(2);
        assert!(cursor.move_down(2));
        assert_eq!(cursor.option, 1);
        assert!(!cursor.move_down(2));
        assert_eq!(cursor.option, 1);
        assert!(cursor.move_up());
        assert!(!cursor.move_up());
        assert_eq!(cursor, Cursor::reset(2));
    }

    #[test]
    fn test_window_slides() {
        let mut cursor = Cursor::reset(8);
        for _ in 0..6 {
            cursor.move_down(8);
        }
        assert_eq!(cursor.option, 6);
        assert_eq!(cursor.window, Window { start: 1, end: 7 });

        cursor.move_down(8);
        assert_eq!(cursor.window, Window { start: 2, end: 8 });
        assert!(!cursor.move_down(8));

        for _ in 0..7 {
            cursor.move_up();
        }
        assert_eq!(cursor.option, 0);
        assert_eq!(cursor.window, Window { start: 0, end: 6 });
    }

    #[test]
    fn test_fit_after_shrink() {
        let mut cursor = Cursor::reset(10);
        for _ in 0..9 {
            cursor.move_down(10);
        }
        cursor.fit(3);
        assert_eq!(cursor.option, 2);
        assert_eq!(cursor.window, Window { start: 0, end: 3 });
        assert!(cursor.is_valid(3));
    }

    #[test]
    fn test_fit_after_grow() {
        let mut cursor = Cursor::reset(2);
        cursor.move_down(2);
        cursor.fit(9);
        assert_eq!(cursor.option, 1);
        assert_eq!(cursor.window, Window { start: 0, end: 6 });
    }

    #[test]
    fn test_fit_to_empty() {
        let mut cursor = Cursor::reset(4);
        cursor.move_down(4);
        cursor.fit(0);
        assert_eq!(cursor, Cursor::reset(0));
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Up,
        Down,
    }

    fn steps() -> impl Strategy<Value = Vec<Step>> {
        prop::collection::vec(prop_oneof![Just(Step::Up), Just(Step::Down)], 0..64)
    }

    proptest! {
        #[test]
        fn prop_window_invariant_holds(count in 1usize..20, moves in steps()) {
            let mut cursor = Cursor::reset(count);
            for step in moves {
                match step {
                    Step::Up => { cursor.move_up(); }
                    Step::Down => { cursor.move_down(count); }
                }
                prop_assert!(cursor.is_valid(count), "{:?} for {}", cursor, count);
            }
        }

        #[test]
        fn prop_down_then_up_restores(count in 2usize..20, moves in steps()) {
            let mut cursor = Cursor::reset(count);
            for step in moves {
                match step {
                    Step::Up => { cursor.move_up(); }
                    Step::Down => { cursor.move_down(count); }
                }
            }
            // Only a move that stays inside the window is undone exactly;
            // a slide at the bottom edge is not mirrored by the next move up.
            prop_assume!(cursor.option + 1 < count);
            prop_assume!(cursor.option + 1 < cursor.window.end);

            let before = cursor;
            prop_assert!(cursor.move_down(count));
            prop_assert!(cursor.move_up());
            prop_assert_eq!(cursor, before);
        }

        #[test]
        fn prop_fit_restores_invariant(
            count in 1usize..20,
            moves in steps(),
            new_count in 0usize..20,
        ) {
            let mut cursor = Cursor::reset(count);
            for step in moves {
                match step {
                    Step::Up => { cursor.move_up(); }
                    Step::Down => { cursor.move_down(count); }
                }
            }
            cursor.fit(new_count);
            prop_assert!(cursor.is_valid(new_count));
        }
    }
}
