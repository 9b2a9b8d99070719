//! Notification overlay ordering

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pillminder_core::{Effects, Navigator, Page, PageRef};
use pillminder_display::SharedScreen;
use pillminder_hal_linux::SimBuzzer;

fn navigator(root: PageRef) -> (Arc<Navigator>, SharedScreen) {
    let screen = SharedScreen::new();
    let effects = Arc::new(Effects::new(Arc::new(SimBuzzer::new()), "beep.wav"));
    let nav = Arc::new(Navigator::new(root, Box::new(screen.clone()), effects));
    (nav, screen)
}

fn home() -> PageRef {
    Page::builder("Home")
        .children(vec![Page::leaf("Record"), Page::leaf("Sound options")])
        .build()
}

fn counted(label: &str, hits: &Arc<AtomicUsize>) -> PageRef {
    let hits = hits.clone();
    Page::builder(label)
        .children(vec![Page::leaf("Ok")])
        .on_visit(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .build()
}

#[test]
fn test_push_shows_page_and_ack_returns() {
    let (nav, screen) = navigator(home());
    nav.move_down();

    let hits = Arc::new(AtomicUsize::new(0));
    nav.push_notification(None, counted("Alert", &hits));
    nav.render();
    assert_eq!(screen.line(0), "Alert");
    assert_eq!(screen.line(1), " * Ok");

    nav.select_current();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Back to the page and selection that were on screen before
    assert_eq!(screen.line(0), "Home");
    assert_eq!(screen.line(2), " * Sound options");
    assert_eq!(nav.pending_notifications(), 0);
}

#[test]
fn test_second_push_queues_behind_first() {
    let (nav, screen) = navigator(home());
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));

    nav.push_notification(None, counted("First", &first_hits));
    nav.push_notification(None, counted("Second", &second_hits));
    assert_eq!(screen.line(0), "First");
    assert_eq!(nav.pending_notifications(), 2);

    nav.select_current();
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
    assert_eq!(screen.line(0), "Second");

    nav.select_current();
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    assert_eq!(screen.line(0), "Home");
}

#[test]
fn test_navigation_keys_do_not_move_overlay() {
    let (nav, screen) = navigator(home());
    let hits = Arc::new(AtomicUsize::new(0));
    nav.push_notification(None, counted("Alert", &hits));

    nav.move_down();
    nav.go_back();
    assert_eq!(screen.line(0), "Alert");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ack_callback_can_queue_follow_up() {
    let (nav, screen) = navigator(home());
    let follow_up = Page::leaf("Schedule empty!");
    let page = Page::builder("Done")
        .on_visit(move |visit| visit.notify(None, follow_up.clone()))
        .build();

    nav.push_notification(None, page);
    nav.select_current();
    assert_eq!(screen.line(0), "Schedule empty!");
    assert_eq!(nav.pending_notifications(), 1);
}

#[test]
fn test_concurrent_pushes_all_queue() {
    // The queue is unbounded: a burst of triggers grows it without limit
    let (nav, _) = navigator(home());
    let workers: Vec<_> = (0..8)
        .map(|w| {
            let nav = nav.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    nav.push_notification(None, Page::leaf(format!("n{}-{}", w, i)));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(nav.pending_notifications(), 200);
    assert!(nav.is_showing_overlay());
}
