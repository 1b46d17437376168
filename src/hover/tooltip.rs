//! Tooltip surface and delayed display.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Vertical gap between the cursor and the tooltip.
pub const CURSOR_OFFSET: i32 = 20;

/// Distance from the viewport edge that triggers flipping.
pub const VIEWPORT_MARGIN: i32 = 20;

/// Smallest distance kept between the tooltip and the top/left edges.
pub const MIN_EDGE_DISTANCE: i32 = 10;

/// Viewport coordinates in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of a tooltip of `size` shown for a cursor at `anchor`.
///
/// The tooltip sits below the cursor. It moves to the left of the cursor
/// when it would cross the right margin, above the cursor when it would
/// cross the bottom margin, and never closer than 10 px to the top/left
/// edges.
#[must_use]
pub fn place_tooltip(anchor: Point, size: Size, viewport: Size) -> Point {
    let mut x = anchor.x;
    let mut y = anchor.y + CURSOR_OFFSET;

    if x + size.width > viewport.width - VIEWPORT_MARGIN {
        x = anchor.x - size.width;
    }
    if y + size.height > viewport.height - VIEWPORT_MARGIN {
        y = anchor.y - size.height - CURSOR_OFFSET;
    }

    Point::new(x.max(MIN_EDGE_DISTANCE), y.max(MIN_EDGE_DISTANCE))
}

/// Host-side tooltip widget.
pub trait TooltipSurface: Send + 'static {
    fn show(&mut self, text: &str, anchor: Point);

    fn hide(&mut self);

    fn reposition(&mut self, anchor: Point);

    fn is_visible(&self) -> bool;
}

/// Shows a tooltip after a delay, cancelling any display still pending.
///
/// Must be used inside a tokio runtime.
#[derive(Debug)]
pub struct DelayedTooltip<T> {
    /// Surface shared with the pending display task
    surface: Arc<Mutex<T>>,
    /// Display task waiting for its delay
    pending: Option<JoinHandle<()>>,
}

impl<T: TooltipSurface> DelayedTooltip<T> {
    pub fn new(surface: T) -> Self {
        Self { surface: Arc::new(Mutex::new(surface)), pending: None }
    }

    pub fn surface(&self) -> Arc<Mutex<T>> {
        Arc::clone(&self.surface)
    }

    /// Shows `text` after `delay`. A display scheduled earlier and not yet
    /// shown is dropped.
    pub fn schedule(&mut self, text: String, anchor: Point, delay: Duration) {
        self.cancel();

        let surface = Arc::clone(&self.surface);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            surface.lock().await.show(&text, anchor);
        }));
    }

    /// Drops the pending display, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
    }

    pub async fn hide(&mut self) {
        self.cancel();
        self.surface.lock().await.hide();
    }

    /// Moves the tooltip if it is visible.
    pub async fn reposition(&self, anchor: Point) {
        let mut surface = self.surface.lock().await;
        if surface.is_visible() {
            surface.reposition(anchor);
        }
    }
}

impl<T> Drop for DelayedTooltip<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{
        RecordingTooltip,
        TooltipEvent,
    };

    const VIEWPORT: Size = Size::new(800, 600);

    #[rstest]
    #[case::below_cursor(Point::new(100, 100), Point::new(100, 120))]
    #[case::flip_left(Point::new(750, 100), Point::new(550, 120))]
    #[case::flip_up(Point::new(100, 560), Point::new(100, 490))]
    #[case::flip_both(Point::new(750, 560), Point::new(550, 490))]
    fn places_tooltip(#[case] anchor: Point, #[case] expected: Point) {
        assert_that!(place_tooltip(anchor, Size::new(200, 50), VIEWPORT), eq(expected));
    }

    #[rstest]
    fn clamps_to_minimum_edge_distance() {
        let placed = place_tooltip(Point::new(150, 30), Size::new(400, 580), VIEWPORT);

        assert_that!(placed, eq(Point::new(150, MIN_EDGE_DISTANCE)));
    }

    #[rstest]
    fn wide_tooltip_is_clamped_left() {
        let placed = place_tooltip(Point::new(700, 100), Size::new(760, 50), VIEWPORT);

        assert_that!(placed.x, eq(MIN_EDGE_DISTANCE));
    }

    #[tokio::test(start_paused = true)]
    async fn shows_after_delay() {
        let mut tooltip = DelayedTooltip::new(RecordingTooltip::default());

        tooltip.schedule("chat".to_string(), Point::new(1, 2), Duration::from_millis(300));
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(tooltip.surface().lock().await.events.is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            tooltip.surface().lock().await.events,
            vec![TooltipEvent::Show("chat".to_string(), Point::new(1, 2))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn new_schedule_replaces_pending() {
        let mut tooltip = DelayedTooltip::new(RecordingTooltip::default());

        tooltip.schedule("first".to_string(), Point::default(), Duration::from_millis(300));
        tokio::time::sleep(Duration::from_millis(100)).await;
        tooltip.schedule("second".to_string(), Point::default(), Duration::from_millis(300));
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(
            tooltip.surface().lock().await.events,
            vec![TooltipEvent::Show("second".to_string(), Point::default())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hide_cancels_pending() {
        let mut tooltip = DelayedTooltip::new(RecordingTooltip::default());

        tooltip.schedule("chat".to_string(), Point::default(), Duration::from_millis(300));
        tooltip.hide().await;
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(!tooltip.has_pending());
        assert_eq!(tooltip.surface().lock().await.events, vec![TooltipEvent::Hide]);
    }

    #[tokio::test(start_paused = true)]
    async fn reposition_only_when_visible() {
        let mut tooltip = DelayedTooltip::new(RecordingTooltip::default());

        tooltip.reposition(Point::new(5, 5)).await;
        tooltip.schedule("chat".to_string(), Point::default(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1)).await;
        tooltip.reposition(Point::new(7, 7)).await;

        assert_eq!(
            tooltip.surface().lock().await.events,
            vec![
                TooltipEvent::Show("chat".to_string(), Point::default()),
                TooltipEvent::Move(Point::new(7, 7)),
            ]
        );
    }
}
