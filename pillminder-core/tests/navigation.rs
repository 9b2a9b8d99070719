//! Navigation scenarios against an in-memory screen

use std::sync::Arc;
use std::thread;

use pillminder_core::navigation::ROW_BUDGET;
use pillminder_core::{Effects, Navigator, Page, PageRef};
use pillminder_display::SharedScreen;
use pillminder_hal_linux::SimBuzzer;

struct Rig {
    nav: Arc<Navigator>,
    screen: SharedScreen,
    buzzer: SimBuzzer,
}

fn rig(root: PageRef) -> Rig {
    let screen = SharedScreen::new();
    let buzzer = SimBuzzer::new();
    let effects = Arc::new(Effects::new(Arc::new(buzzer.clone()), "beep.wav"));
    let nav = Arc::new(Navigator::new(root, Box::new(screen.clone()), effects));
    Rig { nav, screen, buzzer }
}

fn marked_row(screen: &SharedScreen) -> Option<usize> {
    (1..8).find(|&row| screen.line(row).starts_with(" * "))
}

#[test]
fn test_home_a_b_scenario() {
    let root = Page::builder("Home")
        .children(vec![Page::leaf("A"), Page::leaf("B")])
        .build();
    let rig = rig(root.clone());

    rig.nav.render();
    assert_eq!(rig.screen.line(1), " * A");

    rig.nav.move_down();
    rig.nav.render();
    assert_eq!(rig.screen.line(2), " * B");

    // B is last
    rig.nav.move_down();
    assert_eq!(rig.nav.cursor().option, 1);
    assert_eq!(rig.screen.line(2), " * B");

    // Root has no parent
    rig.nav.go_back();
    assert!(Arc::ptr_eq(&rig.nav.current_page(), &root));
}

#[test]
fn test_select_then_back_restores_page() {
    let sub = Page::builder("Sub")
        .children(vec![Page::leaf("1"), Page::leaf("2"), Page::leaf("3")])
        .build();
    let root = Page::builder("Home")
        .children(vec![Page::leaf("A"), Page::leaf("B"), sub])
        .build();
    let rig = rig(root.clone());

    rig.nav.move_down();
    rig.nav.move_down();
    rig.nav.select_current();
    assert_eq!(rig.nav.current_page().label(), "Sub");
    rig.nav.move_down();

    rig.nav.go_back();
    assert!(Arc::ptr_eq(&rig.nav.current_page(), &root));
    assert_eq!(rig.nav.cursor().option, 0);
    assert_eq!(marked_row(&rig.screen), Some(1));
}

#[test]
fn test_every_operation_but_render_beeps() {
    let root = Page::builder("Home")
        .children(vec![Page::leaf("A"), Page::leaf("B")])
        .build();
    let rig = rig(root);

    rig.nav.render();
    rig.nav.move_down();
    rig.nav.move_up();
    rig.nav.select_current();
    rig.nav.go_back();

    // Tones play on detached threads
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while rig.buzzer.plays() < 4 && std::time::Instant::now() < deadline {
        thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(rig.buzzer.plays(), 4);
}

#[test]
fn test_dynamic_children_follow_source() {
    let items = Arc::new(std::sync::Mutex::new(vec!["x".to_string(), "y".to_string()]));
    let source = items.clone();
    let list = Page::builder("List")
        .dynamic(move || {
            source
                .lock()
                .unwrap()
                .iter()
                .map(|label| Page::leaf(label.clone()))
                .collect()
        })
        .build();
    let rig = rig(Page::builder("Home").children(vec![list]).build());

    rig.nav.select_current();
    rig.nav.move_down();
    assert_eq!(rig.screen.line(2), " * y");

    items.lock().unwrap().pop();
    rig.nav.render();
    assert_eq!(rig.screen.line(1), " * x");
    assert_eq!(rig.screen.line(2), "");
    assert_eq!(rig.nav.cursor().option, 0);
}

#[test]
fn test_concurrent_navigation_keeps_window_valid() {
    let leaves: Vec<PageRef> = (0..12).map(|i| Page::leaf(format!("item {}", i))).collect();
    let nested = Page::builder("Nested").children(leaves.clone()).build();
    let mut children = leaves;
    children.push(nested);
    let root = Page::builder("Home").children(children).build();
    let rig = rig(root);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let nav = rig.nav.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    match (worker + i) % 5 {
                        0 | 1 => nav.move_down(),
                        2 => nav.move_up(),
                        3 => nav.select_current(),
                        _ => nav.go_back(),
                    }
                    let (page, cursor) = nav.position();
                    let count = page.children().len();
                    assert!(cursor.window.start <= cursor.option);
                    assert!(cursor.option < cursor.window.end);
                    assert!(cursor.window.len() <= ROW_BUDGET);
                    assert!(cursor.window.end <= count);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    let (page, cursor) = rig.nav.position();
    assert!(cursor.is_valid(page.children().len()));
}
