//! End-to-end scenarios straight out of the container tree / event
//! distributor contract: a full `ContainerTree` built from a `Spec`,
//! drawn onto a `TestTerminal`, and inspected cell by cell, plus the
//! event-distribution fan-out/throttle behaviors exercised through a
//! bare `Distributor`.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use termgrid::{
    Align, BorderStyle, Canvas, CellOptions, ContainerOptions, ContainerTree, Distributor, Event,
    EventKind, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseScope, Point, Rect,
    Result, Size, Spec, SplitPosition, TermGridError, TestTerminal, TreeOptions, Widget,
    WidgetMeta, WidgetOptions,
};

/// A leaf widget that draws its own single-line border around whatever
/// rectangle it's given, plus a `"(w,h)"` label two cells in from the
/// top-left corner.
struct Placeholder {
    min_size: Size,
}

impl Widget for Placeholder {
    fn draw(&mut self, canvas: &mut Canvas, _meta: WidgetMeta) -> Result<()> {
        let size = canvas.size();
        if size.width >= 2 && size.height >= 2 {
            let (w, h) = (size.width, size.height);
            canvas.set(Point::new(0, 0), '┌', CellOptions::new())?;
            canvas.set(Point::new(w - 1, 0), '┐', CellOptions::new())?;
            canvas.set(Point::new(0, h - 1), '└', CellOptions::new())?;
            canvas.set(Point::new(w - 1, h - 1), '┘', CellOptions::new())?;
            for x in 1..w - 1 {
                canvas.set(Point::new(x, 0), '─', CellOptions::new())?;
                canvas.set(Point::new(x, h - 1), '─', CellOptions::new())?;
            }
            for y in 1..h - 1 {
                canvas.set(Point::new(0, y), '│', CellOptions::new())?;
                canvas.set(Point::new(w - 1, y), '│', CellOptions::new())?;
            }
        }
        let label = format!("({},{})", size.width, size.height);
        for (i, ch) in label.chars().enumerate() {
            canvas.set(Point::new(2 + i as u16, 2), ch, CellOptions::new())?;
        }
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new().min_size(self.min_size)
    }
}

/// A leaf widget that records the absolute rectangle its canvas was
/// bound to on the last draw pass, for asserting split geometry.
#[derive(Clone, Default)]
struct RectRecorder {
    slot: Arc<Mutex<Option<Rect>>>,
}

impl Widget for RectRecorder {
    fn draw(&mut self, canvas: &mut Canvas, _meta: WidgetMeta) -> Result<()> {
        *self.slot.lock().unwrap() = Some(canvas.bounds());
        Ok(())
    }
}

/// A leaf widget with a capped size (so it negotiates smaller than its
/// containing leaf once centered) that records every mouse event it
/// receives, for asserting `MouseScope::Widget` vs `MouseScope::Container`
/// delivery against the widget's *negotiated* rectangle rather than the
/// leaf's content rectangle.
#[derive(Clone, Default)]
struct MouseRecorder {
    scope: MouseScope,
    seen: Arc<Mutex<Vec<MouseEvent>>>,
}

impl Widget for MouseRecorder {
    fn draw(&mut self, _canvas: &mut Canvas, _meta: WidgetMeta) -> Result<()> {
        Ok(())
    }

    fn mouse(&mut self, event: &MouseEvent, _meta: WidgetMeta) -> Result<()> {
        self.seen.lock().unwrap().push(*event);
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new()
            .max_size(Size::new(2, 2))
            .mouse_scope(self.scope)
    }
}

/// Scenario 1: a 9x5 terminal, a single-border container with no
/// margin or padding, and a solo widget whose minimum size (2,2) fits
/// comfortably inside the negotiated 7x3 content rectangle. The widget
/// draws its own inner border and a size label that lands on, and
/// partially overwrites, its own bottom border row.
#[tokio::test]
async fn scenario_1_solo_widget_draws_inside_its_negotiated_rect() {
    let spec = Spec::leaf(ContainerOptions::new().border(BorderStyle::Single))
        .with_widget(Placeholder {
            min_size: Size::new(2, 2),
        });
    let tree = ContainerTree::build(spec, TreeOptions::new(), Size::new(9, 5)).unwrap();
    let mut terminal = TestTerminal::new(Size::new(9, 5));

    let failures = tree.draw(&mut terminal).await.unwrap();
    assert!(failures.is_empty());

    let buffer = terminal.buffer();

    // outer container border spans the full 9x5
    assert_eq!(buffer.get(Point::new(0, 0)).unwrap().rune(), Some('┌'));
    assert_eq!(buffer.get(Point::new(8, 0)).unwrap().rune(), Some('┐'));
    assert_eq!(buffer.get(Point::new(0, 4)).unwrap().rune(), Some('└'));
    assert_eq!(buffer.get(Point::new(8, 4)).unwrap().rune(), Some('┘'));

    // widget's own border, offset by the outer border into content rect (1,1,7,3)
    assert_eq!(buffer.get(Point::new(1, 1)).unwrap().rune(), Some('┌'));
    assert_eq!(buffer.get(Point::new(7, 1)).unwrap().rune(), Some('┐'));
    assert_eq!(buffer.get(Point::new(1, 3)).unwrap().rune(), Some('└'));
    assert_eq!(buffer.get(Point::new(7, 3)).unwrap().rune(), Some('┘'));

    // label at widget-local (2,2) -> absolute (3,3), overwriting the bottom border there
    let label: String = (3..8)
        .map(|x| buffer.get(Point::new(x, 3)).unwrap().rune().unwrap())
        .collect();
    assert_eq!(label, "(7,3)");
}

/// Scenario 2: the same layout on a 5x5 terminal with a widget whose
/// minimum size (10,10) can never fit. `draw` still returns `Ok`, but
/// reports exactly one failure, and the only thing drawn inside the
/// border is the resize-needed glyph.
#[tokio::test]
async fn scenario_2_undersized_widget_reports_a_size_underflow() {
    let spec = Spec::leaf(ContainerOptions::new().border(BorderStyle::Single))
        .with_widget(Placeholder {
            min_size: Size::new(10, 10),
        });
    let tree = ContainerTree::build(spec, TreeOptions::new(), Size::new(5, 5)).unwrap();
    let mut terminal = TestTerminal::new(Size::new(5, 5));

    let failures = tree.draw(&mut terminal).await.unwrap();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].error, TermGridError::SizeUnderflow));

    let buffer = terminal.buffer();
    assert_eq!(buffer.get(Point::new(0, 0)).unwrap().rune(), Some('┌'));
    assert_eq!(buffer.get(Point::new(4, 4)).unwrap().rune(), Some('┘'));
    assert_eq!(buffer.get(Point::new(1, 1)).unwrap().rune(), Some('⇄'));
    assert!(buffer.get(Point::new(2, 2)).unwrap().is_blank());
    assert!(buffer.get(Point::new(3, 3)).unwrap().is_blank());
}

fn four_way_split(
    top_left: RectRecorder,
    bottom_left: RectRecorder,
    right_left: RectRecorder,
    right_right: RectRecorder,
) -> Spec {
    let left = Spec::split_horizontal(
        ContainerOptions::new(),
        SplitPosition::Percentage(50),
        Spec::leaf(ContainerOptions::new()).with_widget(top_left),
        Spec::leaf(ContainerOptions::new()).with_widget(bottom_left),
    );
    let right = Spec::split_vertical(
        ContainerOptions::new(),
        SplitPosition::Percentage(50),
        Spec::leaf(ContainerOptions::new()).with_widget(right_left),
        Spec::leaf(ContainerOptions::new()).with_widget(right_right),
    );
    Spec::split_vertical(ContainerOptions::new(), SplitPosition::Percentage(50), left, right)
}

/// Scenarios 3 and 4: a vertical split of a horizontal-then-vertical
/// tree, checked both at the original terminal size and after a
/// resize-down, reusing the same live tree across both draws the way
/// a real resize event would.
#[tokio::test]
async fn scenario_3_and_4_split_geometry_before_and_after_resize() {
    let top_left = RectRecorder::default();
    let bottom_left = RectRecorder::default();
    let right_left = RectRecorder::default();
    let right_right = RectRecorder::default();

    let spec = four_way_split(
        top_left.clone(),
        bottom_left.clone(),
        right_left.clone(),
        right_right.clone(),
    );

    let tree = ContainerTree::build(spec, TreeOptions::new(), Size::new(60, 10)).unwrap();
    let mut terminal = TestTerminal::new(Size::new(60, 10));
    tree.draw(&mut terminal).await.unwrap();

    assert_eq!(*top_left.slot.lock().unwrap(), Some(Rect::new(0, 0, 30, 5)));
    assert_eq!(*bottom_left.slot.lock().unwrap(), Some(Rect::new(0, 5, 30, 5)));
    assert_eq!(*right_left.slot.lock().unwrap(), Some(Rect::new(30, 0, 15, 10)));
    assert_eq!(*right_right.slot.lock().unwrap(), Some(Rect::new(45, 0, 15, 10)));

    terminal.resize(Size::new(50, 10));
    tree.draw(&mut terminal).await.unwrap();

    assert_eq!(*top_left.slot.lock().unwrap(), Some(Rect::new(0, 0, 25, 5)));
    assert_eq!(*bottom_left.slot.lock().unwrap(), Some(Rect::new(0, 5, 25, 5)));
    assert_eq!(*right_left.slot.lock().unwrap(), Some(Rect::new(25, 0, 12, 10)));
    assert_eq!(*right_right.slot.lock().unwrap(), Some(Rect::new(37, 0, 13, 10)));
}

/// Scenario 5: two keyboard-only subscribers on the same distributor,
/// one of which never returns from its callback. The slow subscriber
/// never backs up delivery to the fast one, and mouse events (outside
/// either subscriber's filter) never reach either of them, while error
/// events deliver regardless of filter.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scenario_5_a_blocked_subscriber_never_stalls_the_others() {
    let dist = Distributor::new();

    let fast_seen = Arc::new(Mutex::new(Vec::new()));
    let fast_store = fast_seen.clone();
    let fast = dist
        .subscribe(vec![EventKind::Key], move |event| {
            fast_store.lock().unwrap().push(event);
        })
        .await;

    let slow_completed = Arc::new(AtomicUsize::new(0));
    let slow_completed_cb = slow_completed.clone();
    let slow = dist
        .subscribe(vec![EventKind::Key], move |_event| {
            std::thread::sleep(Duration::from_secs(3600));
            slow_completed_cb.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    dist.dispatch(Event::Key(KeyEvent::plain(KeyCode::Enter))).await;
    dist.dispatch(Event::Key(KeyEvent::plain(KeyCode::Escape))).await;
    dist.dispatch(Event::Mouse(MouseEvent {
        x: 0,
        y: 0,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    }))
    .await;
    dist.dispatch(Event::Error("x".into())).await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        *fast_seen.lock().unwrap(),
        vec![
            Event::Key(KeyEvent::plain(KeyCode::Enter)),
            Event::Key(KeyEvent::plain(KeyCode::Escape)),
            Event::Error("x".into()),
        ]
    );
    // the blocked subscriber's callback is still parked in its first
    // (never-returning) invocation
    assert_eq!(slow_completed.load(Ordering::SeqCst), 0);

    fast.stop().await;
    slow.stop().await;
}

/// Scenario 6: a throttled subscriber with `max_repeats = 2` forwards
/// the first occurrence of a run plus two repeats, then drops the
/// rest of the run.
#[tokio::test]
async fn scenario_6_throttle_caps_a_repeated_run() {
    let dist = Distributor::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();
    let handle = dist.subscribe_throttled(vec![], 2, move |event| {
        seen_cb.lock().unwrap().push(event);
    }).await;

    let e = Event::Error("a".into());
    for _ in 0..4 {
        dist.dispatch(e.clone()).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Event::Error("a".into()),
            Event::Error("a".into()),
            Event::Error("a".into()),
        ]
    );
    handle.stop().await;
}

/// `MouseScope::Widget` must gate on the widget's own negotiated
/// rectangle, not the leaf's (larger) content rectangle: a widget
/// capped to 2x2 and centered in a 6x6 leaf only sees clicks that land
/// in its centered 2x2 box, translated to widget-local coordinates,
/// while `MouseScope::Container` on an identically-shrunk widget sees
/// every click anywhere in the 6x6 leaf.
#[tokio::test]
async fn widget_scope_gates_on_negotiated_rect_not_content_rect() {
    let widget_scoped = MouseRecorder {
        scope: MouseScope::Widget,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let container_scoped = MouseRecorder {
        scope: MouseScope::Container,
        seen: Arc::new(Mutex::new(Vec::new())),
    };

    let left = Spec::leaf(
        ContainerOptions::new()
            .align_horizontal(Align::Center)
            .align_vertical(Align::Center),
    )
    .with_widget(widget_scoped.clone());
    let right = Spec::leaf(
        ContainerOptions::new()
            .align_horizontal(Align::Center)
            .align_vertical(Align::Center),
    )
    .with_widget(container_scoped.clone());
    let spec = Spec::split_vertical(ContainerOptions::new(), SplitPosition::Percentage(50), left, right);

    let tree = ContainerTree::build(spec, TreeOptions::new(), Size::new(12, 6)).unwrap();
    let mut terminal = TestTerminal::new(Size::new(12, 6));
    tree.draw(&mut terminal).await.unwrap();

    // left leaf spans x in [0,6), y in [0,6); the 2x2 widget centers at (2,2)-(4,4).
    // a click at (0,0) is inside the leaf but outside the negotiated widget rect.
    tree.route_mouse(MouseEvent {
        x: 0,
        y: 0,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    })
    .await;
    assert!(widget_scoped.seen.lock().unwrap().is_empty());

    // a click at (2,2), the widget's negotiated top-left, is inside it and
    // translates to widget-local (0,0).
    tree.route_mouse(MouseEvent {
        x: 2,
        y: 2,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    })
    .await;
    assert_eq!(
        widget_scoped.seen.lock().unwrap().last().map(|e| (e.x, e.y)),
        Some((0, 0))
    );

    // right leaf spans x in [6,12), y in [0,6); container scope sees a click
    // anywhere in that leaf, translated relative to the leaf's own origin,
    // even well outside the centered 2x2 widget rectangle.
    tree.route_mouse(MouseEvent {
        x: 6,
        y: 0,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    })
    .await;
    assert_eq!(
        container_scoped.seen.lock().unwrap().last().map(|e| (e.x, e.y)),
        Some((0, 0))
    );
}
