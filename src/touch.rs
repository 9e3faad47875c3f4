//! Touch event records consumed by the trackers
//!
//! A [`TouchEvent`] carries the action that caused it, the index of the
//! pointer that action refers to, and a position sample for every finger
//! currently on the surface.

use serde::{Deserialize, Serialize};

/// Stable identity of one finger for the duration of its contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

impl std::fmt::Display for PointerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// What happened to the acting pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    /// First finger touched the surface
    Down,
    /// Another finger joined while others are down
    PointerDown,
    /// One or more fingers moved
    Move,
    /// Last finger left the surface
    Up,
    /// A finger left while others remain
    PointerUp,
}

impl TouchAction {
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Down | Self::PointerDown)
    }

    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up | Self::PointerUp)
    }
}

/// Position of one pointer within an event
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub const fn new(id: PointerId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// One multi-touch event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    /// Index into `pointers` of the pointer the action refers to
    pub action_index: usize,
    pub pointers: Vec<PointerSample>,
}

impl TouchEvent {
    pub fn new(action: TouchAction, action_index: usize, pointers: Vec<PointerSample>) -> Self {
        Self { action, action_index, pointers }
    }

    /// Single-finger event, handy for tests and scripts
    pub fn single(action: TouchAction, id: u32, x: f32, y: f32) -> Self {
        Self::new(action, 0, vec![PointerSample::new(PointerId(id), x, y)])
    }

    /// Sample of the pointer the action refers to.
    ///
    /// Falls back to the first sample if `action_index` is out of range.
    pub fn action_pointer(&self) -> Option<&PointerSample> {
        self.pointers.get(self.action_index).or_else(|| self.pointers.first())
    }

    /// Sample for a specific pointer id, if it is part of this event
    pub fn find(&self, id: PointerId) -> Option<&PointerSample> {
        self.pointers.iter().find(|p| p.id == id)
    }
}

/// Builds well-formed [`TouchEvent`]s from individual finger updates.
///
/// Keeps every live finger so each emitted event carries all samples, and
/// picks `Down`/`PointerDown` and `Up`/`PointerUp` based on how many fingers
/// remain on the surface.
#[derive(Debug, Clone, Default)]
pub struct ActivePointers {
    pointers: Vec<PointerSample>,
}

impl ActivePointers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a finger down. Re-pressing a live id just moves it.
    pub fn press(&mut self, id: PointerId, x: f32, y: f32) -> TouchEvent {
        if self.pointers.iter().any(|p| p.id == id) {
            return self.move_to(id, x, y);
        }
        let action = if self.pointers.is_empty() {
            TouchAction::Down
        } else {
            TouchAction::PointerDown
        };
        self.pointers.push(PointerSample::new(id, x, y));
        TouchEvent::new(action, self.pointers.len() - 1, self.pointers.clone())
    }

    /// Move a live finger; unknown ids produce a move event with no change
    pub fn move_to(&mut self, id: PointerId, x: f32, y: f32) -> TouchEvent {
        let index = match self.pointers.iter().position(|p| p.id == id) {
            Some(index) => {
                self.pointers[index].x = x;
                self.pointers[index].y = y;
                index
            }
            None => 0,
        };
        TouchEvent::new(TouchAction::Move, index, self.pointers.clone())
    }

    /// Lift a finger. Returns `None` if it was not down.
    ///
    /// The emitted event still contains the lifted finger's last sample.
    pub fn release(&mut self, id: PointerId) -> Option<TouchEvent> {
        let index = self.pointers.iter().position(|p| p.id == id)?;
        let action = if self.pointers.len() == 1 {
            TouchAction::Up
        } else {
            TouchAction::PointerUp
        };
        let event = TouchEvent::new(action, index, self.pointers.clone());
        self.pointers.remove(index);
        Some(event)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn get(&self, id: PointerId) -> Option<&PointerSample> {
        self.pointers.iter().find(|p| p.id == id)
    }
}
