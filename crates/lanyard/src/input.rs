//! Pointer events, the queue they wait in until the next tick, and hover state.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

pub type PointerId = u32;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Down { pointer: PointerId, ndc: Vec2 },
    Move { pointer: PointerId, ndc: Vec2 },
    Up { pointer: PointerId, ndc: Vec2 },
}

impl PointerEvent {
    #[must_use]
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerEvent::Down { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Up { pointer, .. } => pointer,
        }
    }

    #[must_use]
    pub fn ndc(&self) -> Vec2 {
        match *self {
            PointerEvent::Down { ndc, .. } | PointerEvent::Move { ndc, .. } | PointerEvent::Up { ndc, .. } => ndc,
        }
    }
}

/// Cloneable sender side of the scene's input queue.
///
/// Input callbacks push here at any time; the scene drains the whole queue at
/// the start of a tick, so a frame only ever sees complete drag transitions.
#[derive(Clone, Debug, Default)]
pub struct PointerQueue {
    events: Arc<Mutex<VecDeque<PointerEvent>>>,
}

impl PointerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: PointerEvent) {
        self.events.lock().push_back(event);
    }

    /// Takes every pending event in arrival order.
    #[must_use]
    pub fn drain(&self) -> Vec<PointerEvent> {
        self.events.lock().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    pub hovered: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    #[default]
    Default,
    Grab,
    Grabbing,
}

impl CursorStyle {
    #[must_use]
    pub fn for_card(hover: HoverState, dragging: bool) -> Self {
        match (dragging, hover.hovered) {
            (true, _) => CursorStyle::Grabbing,
            (false, true) => CursorStyle::Grab,
            (false, false) => CursorStyle::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties_queue() {
        let queue = PointerQueue::new();
        let producer = queue.clone();
        producer.push(PointerEvent::Down { pointer: 1, ndc: Vec2::ZERO });
        producer.push(PointerEvent::Move { pointer: 1, ndc: Vec2::X });
        assert_eq!(queue.len(), 2);
        let events = queue.drain();
        assert_eq!(events[0].pointer(), 1);
        assert_eq!(events[1].ndc(), Vec2::X);
        assert!(queue.is_empty());
    }

    #[test]
    fn cursor_prefers_grabbing_while_dragging() {
        let hovered = HoverState { hovered: true };
        assert_eq!(CursorStyle::for_card(hovered, true), CursorStyle::Grabbing);
        assert_eq!(CursorStyle::for_card(hovered, false), CursorStyle::Grab);
        assert_eq!(CursorStyle::for_card(HoverState::default(), false), CursorStyle::Default);
    }
}
