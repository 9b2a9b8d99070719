//! Navigation engine
//!
//! State machine over two implicit modes: normal, where the current page and
//! its children are drawn, and overlay, where the front of the notification
//! queue is drawn instead. The mode is decided afresh on every render.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use pillminder_display::{wrap_line, DisplayBackend, DisplayError, DISPLAY_COLS, DISPLAY_ROWS};

use super::window::Cursor;
use crate::effects::Effects;
use crate::overlay::{LoadFn, Notification, NotificationQueue};
use crate::page::PageRef;

/// Character drawn in front of the selected row
pub const MARKER: char = '*';

/// Context handed to a page's `on_visit` callback
///
/// Callbacks run with the navigation lock held. They may queue
/// notifications but must not call back into the [`Navigator`]; the
/// enclosing operation renders once they return.
pub struct Visit<'a> {
    page: &'a PageRef,
    current: &'a PageRef,
    overlay: &'a NotificationQueue,
}

impl<'a> Visit<'a> {
    /// Page being visited
    pub fn page(&self) -> &PageRef {
        self.page
    }

    /// Page whose children were on screen when the visit started
    pub fn current_page(&self) -> &PageRef {
        self.current
    }

    /// Queue an overlay page, drawn when this operation renders
    pub fn notify(&mut self, on_load: Option<LoadFn>, page: PageRef) {
        info!("overlay queued: {}", page.label());
        self.overlay.push(Notification::new(on_load, page));
    }
}

/// State guarded by the navigation lock
struct NavState {
    /// Page whose children are listed
    current: PageRef,
    /// Ancestors of `current`, root first
    ///
    /// Parent links are weak; this keeps produced pages alive while they
    /// are on the path back to the root.
    trail: Vec<PageRef>,
    /// Selection within `current`
    cursor: Cursor,
    /// Whether the last render drew an overlay
    showing_overlay: bool,
    /// Output device
    display: Box<dyn DisplayBackend + Send>,
}

/// Navigation engine
pub struct Navigator {
    state: Mutex<NavState>,
    overlay: NotificationQueue,
    effects: Arc<Effects>,
}

impl Navigator {
    /// Create a navigator showing `root`
    ///
    /// Nothing is drawn until the first [`render`](Self::render).
    pub fn new(root: PageRef, display: Box<dyn DisplayBackend + Send>, effects: Arc<Effects>) -> Self {
        let cursor = Cursor::reset(root.children().len());
        Self {
            state: Mutex::new(NavState {
                current: root,
                trail: Vec::new(),
                cursor,
                showing_overlay: false,
                display,
            }),
            overlay: NotificationQueue::new(),
            effects,
        }
    }

    /// Select the highlighted row, or acknowledge the active overlay
    pub fn select_current(&self) {
        self.effects.ack_tone();
        let mut state = self.lock();

        if state.showing_overlay {
            if let Some(entry) = self.overlay.front() {
                if let Some(visit) = entry.page.on_visit() {
                    let current = state.current.clone();
                    visit(&mut Visit {
                        page: &entry.page,
                        current: &current,
                        overlay: &self.overlay,
                    });
                }
                self.overlay.pop_front();
                info!("overlay acknowledged: {}", entry.page.label());
            }
        } else {
            let children = state.current.children();
            state.cursor.fit(children.len());
            let Some(option) = children.get(state.cursor.option).cloned() else {
                debug!("select on empty page {}", state.current.label());
                self.draw(&mut state);
                return;
            };

            if let Some(visit) = option.on_visit() {
                let current = state.current.clone();
                visit(&mut Visit {
                    page: &option,
                    current: &current,
                    overlay: &self.overlay,
                });
            }

            let count = option.children().len();
            if count > 0 {
                debug!("entering {}", option.label());
                let previous = std::mem::replace(&mut state.current, option);
                state.trail.push(previous);
                state.cursor = Cursor::reset(count);
            }
        }

        self.draw(&mut state);
    }

    /// Highlight the previous row
    pub fn move_up(&self) {
        self.effects.ack_tone();
        let mut state = self.lock();
        let count = state.current.children().len();
        state.cursor.fit(count);
        state.cursor.move_up();
        self.draw(&mut state);
    }

    /// Highlight the next row
    pub fn move_down(&self) {
        self.effects.ack_tone();
        let mut state = self.lock();
        let count = state.current.children().len();
        state.cursor.fit(count);
        state.cursor.move_down(count);
        self.draw(&mut state);
    }

    /// Return to the containing page; no-op at the root
    pub fn go_back(&self) {
        self.effects.ack_tone();
        let mut state = self.lock();

        if let Some(parent) = state.current.parent() {
            debug!("back to {}", parent.label());
            state.trail.pop();
            state.cursor = Cursor::reset(parent.children().len());
            state.current = parent;
        }

        self.draw(&mut state);
    }

    /// Redraw the screen
    pub fn render(&self) {
        let mut state = self.lock();
        self.draw(&mut state);
    }

    /// Queue an overlay page and redraw
    ///
    /// The overlay lock is released before the navigation lock is taken.
    /// The new page is drawn only if nothing else was pending.
    pub fn push_notification(&self, on_load: Option<LoadFn>, page: PageRef) {
        info!("overlay pushed: {}", page.label());
        self.overlay.push(Notification::new(on_load, page));
        self.render();
    }

    /// Clear the screen and write newline-separated text, one line per row
    pub fn print_text(&self, text: &str) {
        let mut state = self.lock();
        let display = &mut state.display;
        let result = (|| -> Result<(), DisplayError> {
            display.clear()?;
            for (row, line) in text.lines().take(DISPLAY_ROWS).enumerate() {
                display.set_cursor(row, 0)?;
                display.write_text(line)?;
            }
            display.flush()
        })();
        if let Err(e) = result {
            warn!("print failed: {}", e);
        }
    }

    /// Release the display
    pub fn close(&self) {
        let mut state = self.lock();
        if let Err(e) = state.display.close() {
            warn!("display close failed: {}", e);
        }
    }

    /// Page whose children are listed
    pub fn current_page(&self) -> PageRef {
        self.lock().current.clone()
    }

    /// Selection within the current page
    pub fn cursor(&self) -> Cursor {
        self.lock().cursor
    }

    /// Current page and cursor, read together
    pub fn position(&self) -> (PageRef, Cursor) {
        let state = self.lock();
        (state.current.clone(), state.cursor)
    }

    /// Whether the last render drew an overlay
    pub fn is_showing_overlay(&self) -> bool {
        self.lock().showing_overlay
    }

    /// Number of queued overlay pages
    pub fn pending_notifications(&self) -> usize {
        self.overlay.len()
    }

    fn lock(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draw the active page; called with the navigation lock held
    fn draw(&self, state: &mut NavState) {
        // Overlay front wins over the current page
        let (page, cursor) = match self.overlay.front() {
            Some(entry) => {
                if let Some(on_load) = &entry.on_load {
                    on_load();
                }
                state.showing_overlay = true;
                let count = entry.page.children().len();
                (entry.page, Cursor::reset(count))
            }
            None => {
                state.showing_overlay = false;
                let count = state.current.children().len();
                state.cursor.fit(count);
                (state.current.clone(), state.cursor)
            }
        };

        let children = page.children();
        let display = &mut state.display;
        let result = (|| -> Result<(), DisplayError> {
            display.clear()?;
            display.set_cursor(0, 0)?;
            display.write_text(page.label())?;

            let mut row = 1;
            for index in cursor.window.start..cursor.window.end.min(children.len()) {
                let label = children[index].label();
                let line = if page.prefix_marker() {
                    let mark = if index == cursor.option { MARKER } else { ' ' };
                    format!(" {} {}", mark, label)
                } else {
                    label.to_string()
                };

                for piece in wrap_line(&line, DISPLAY_COLS) {
                    if row >= DISPLAY_ROWS {
                        break;
                    }
                    display.set_cursor(row, 0)?;
                    display.write_text(piece)?;
                    row += 1;
                }
            }
            display.flush()
        })();

        if let Err(e) = result {
            warn!("render failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use pillminder_display::SharedScreen;
    use pillminder_hal_linux::SimBuzzer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn navigator(root: PageRef) -> (Navigator, SharedScreen) {
        let screen = SharedScreen::new();
        let effects = Arc::new(Effects::new(Arc::new(SimBuzzer::new()), "beep.wav"));
        let nav = Navigator::new(root, Box::new(screen.clone()), effects);
        (nav, screen)
    }

    fn home() -> PageRef {
        Page::builder("Home")
            .children(vec![Page::leaf("A"), Page::leaf("B")])
            .build()
    }

    #[test]
    fn test_initial_render_marks_first() {
        let (nav, screen) = navigator(home());
        nav.render();
        assert_eq!(screen.line(0), "Home");
        assert_eq!(screen.line(1), " * A");
        assert_eq!(screen.line(2), "   B");
    }

    #[test]
    fn test_move_down_marks_second() {
        let (nav, screen) = navigator(home());
        nav.move_down();
        assert_eq!(screen.line(1), "   A");
        assert_eq!(screen.line(2), " * B");

        nav.move_down();
        assert_eq!(nav.cursor().option, 1);
    }

    #[test]
    fn test_go_back_at_root_is_noop() {
        let root = home();
        let (nav, _) = navigator(root.clone());
        nav.go_back();
        assert!(Arc::ptr_eq(&nav.current_page(), &root));
        assert_eq!(nav.cursor().option, 0);
    }

    #[test]
    fn test_select_descends_and_back_returns() {
        let inner = Page::builder("Inner")
            .children(vec![Page::leaf("x"), Page::leaf("y")])
            .build();
        let root = Page::builder("Home").children(vec![Page::leaf("A"), inner.clone()]).build();
        let (nav, screen) = navigator(root.clone());

        nav.move_down();
        nav.select_current();
        assert!(Arc::ptr_eq(&nav.current_page(), &inner));
        assert_eq!(screen.line(0), "Inner");

        nav.move_down();
        nav.go_back();
        assert!(Arc::ptr_eq(&nav.current_page(), &root));
        assert_eq!(nav.cursor(), Cursor::reset(2));
    }

    #[test]
    fn test_select_leaf_runs_callback_only() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let leaf = Page::builder("Go")
            .on_visit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();
        let root = Page::builder("Home").children(vec![leaf]).build();
        let (nav, _) = navigator(root.clone());

        nav.select_current();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&nav.current_page(), &root));
    }

    #[test]
    fn test_dynamic_page_survives_descent() {
        let list = Page::builder("List")
            .dynamic(|| {
                vec![Page::builder("Item")
                    .children(vec![Page::leaf("detail")])
                    .build()]
            })
            .build();
        let root = Page::builder("Home").children(vec![list.clone()]).build();
        let (nav, screen) = navigator(root);

        nav.select_current();
        nav.select_current();
        assert_eq!(screen.line(0), "Item");

        nav.go_back();
        assert!(Arc::ptr_eq(&nav.current_page(), &list));
    }

    #[test]
    fn test_long_label_wraps() {
        let root = Page::builder("Home")
            .children(vec![Page::leaf("Take 2 tablets of Paracetamol")])
            .build();
        let (nav, screen) = navigator(root);
        nav.render();
        assert_eq!(screen.line(1), " * Take 2 tablets of");
        assert_eq!(screen.line(2), "Paracetamol");
    }

    #[test]
    fn test_rows_past_display_dropped() {
        let children = (0..6)
            .map(|i| Page::leaf(format!("entry {} with a long label", i)))
            .collect();
        let root = Page::builder("Home").children(children).build();
        let (nav, screen) = navigator(root);
        nav.render();
        // Each entry takes two rows; the fourth only gets its first
        assert_eq!(screen.line(5), "   entry 2 with a");
        assert_eq!(screen.line(7), "   entry 3 with a");
    }

    #[test]
    fn test_window_scrolls_rows() {
        let children = (0..8).map(|i| Page::leaf(format!("item {}", i))).collect();
        let root = Page::builder("Home").children(children).build();
        let (nav, screen) = navigator(root);
        for _ in 0..6 {
            nav.move_down();
        }
        assert_eq!(screen.line(1), "   item 1");
        assert_eq!(screen.line(6), " * item 6");
    }

    #[test]
    fn test_overlay_replaces_page_until_acknowledged() {
        let acked = Arc::new(AtomicUsize::new(0));
        let counter = acked.clone();
        let note = Page::builder("Notification")
            .children(vec![Page::leaf("Take 1 of X")])
            .no_prefix()
            .on_visit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();
        let (nav, screen) = navigator(home());

        nav.push_notification(None, note);
        assert!(nav.is_showing_overlay());
        assert_eq!(screen.line(0), "Notification");
        assert_eq!(screen.line(1), "Take 1 of X");

        nav.select_current();
        assert_eq!(acked.load(Ordering::SeqCst), 1);
        assert!(!nav.is_showing_overlay());
        assert_eq!(screen.line(0), "Home");
    }

    #[test]
    fn test_on_load_runs_each_render() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let (nav, _) = navigator(home());
        nav.push_notification(
            Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            Page::leaf("Alert"),
        );
        nav.render();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_print_text() {
        let (nav, screen) = navigator(home());
        nav.print_text("Scanning...\nPress Back when done");
        assert_eq!(screen.line(0), "Scanning...");
        assert_eq!(screen.line(1), "Press Back when done");
        assert_eq!(screen.line(2), "");
    }

    #[test]
    fn test_close_then_render_is_harmless() {
        let (nav, screen) = navigator(home());
        nav.close();
        nav.render();
        nav.move_down();
        assert!(screen.snapshot().is_closed());
        assert_eq!(nav.cursor().option, 1);
    }
}
