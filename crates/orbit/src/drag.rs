use crate::geometry::{Point, Size, Viewport};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};

pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;
/// Assumed element size until the host has measured the anchor.
pub const DEFAULT_ELEMENT_SIZE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum MouseButton {
    #[strum(serialize = "primary", serialize = "left", serialize = "1")]
    Primary,
    #[strum(serialize = "middle", serialize = "2")]
    Middle,
    #[strum(serialize = "secondary", serialize = "right", serialize = "3")]
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse(MouseButton),
    Touch { finger: u32 },
}

impl PointerKind {
    /// Only the left mouse button and the first touch point may start a drag.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            PointerKind::Mouse(MouseButton::Primary) | PointerKind::Touch { finger: 0 }
        )
    }
}

/// Mouse and touch input normalized by the host into one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerKind::Mouse(MouseButton::Primary),
        }
    }

    pub fn touch(x: f64, y: f64, finger: u32) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerKind::Touch { finger },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Start(PointerEvent),
    Move(PointerEvent),
    End(PointerEvent),
    ViewportResized,
}

/// Where the pointer grabbed the element, kept for the duration of one drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    /// Pointer position relative to the element's top-left corner.
    pub offset: Point,
    pub origin: Point,
    /// The pointer that owns the drag; other pointers are ignored until release.
    pub kind: PointerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AnchorState {
    /// Top-left corner of the anchor.
    pub position: Point,
    pub dragging: bool,
    pub moved_beyond_threshold: bool,
    #[serde(skip)]
    pub grab: Option<Grab>,
}

impl AnchorState {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn is_grabbed_by(&self, kind: PointerKind) -> bool {
        self.dragging && self.grab.is_some_and(|g| g.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragController {
    pub threshold: f64,
    /// `None` until the host measures the anchor.
    pub element_size: Option<f64>,
}

impl Default for DragController {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DRAG_THRESHOLD,
            element_size: None,
        }
    }
}

impl DragController {
    pub fn new(threshold: f64, element_size: Option<f64>) -> Self {
        Self {
            threshold,
            element_size,
        }
    }

    pub fn element_size(&self) -> f64 {
        self.element_size
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_ELEMENT_SIZE)
    }

    pub fn anchor_center(&self, state: &AnchorState) -> Point {
        let half = self.element_size() / 2.0;
        state.position.offset(half, half)
    }

    pub fn reduce(
        &self,
        state: AnchorState,
        event: DragEvent,
        viewport: Option<Viewport>,
    ) -> AnchorState {
        match event {
            DragEvent::Start(e) => self.start(state, e),
            DragEvent::Move(e) => self.drag_to(state, e, viewport),
            DragEvent::End(e) => self.release(state, e),
            DragEvent::ViewportResized => self.reclamp(state, viewport),
        }
    }

    pub fn start(&self, state: AnchorState, event: PointerEvent) -> AnchorState {
        if !event.kind.is_primary() {
            return state;
        }
        let offset = Point::new(
            event.position.x - state.position.x,
            event.position.y - state.position.y,
        );
        AnchorState {
            position: state.position,
            dragging: true,
            moved_beyond_threshold: false,
            grab: Some(Grab {
                offset,
                origin: event.position,
                kind: event.kind,
            }),
        }
    }

    pub fn drag_to(
        &self,
        state: AnchorState,
        event: PointerEvent,
        viewport: Option<Viewport>,
    ) -> AnchorState {
        let Some(grab) = state
            .grab
            .filter(|g| state.dragging && g.kind == event.kind)
        else {
            return state;
        };

        let candidate = Point::new(
            event.position.x - grab.offset.x,
            event.position.y - grab.offset.y,
        );
        let moved = event.position.distance(grab.origin) > self.threshold;

        AnchorState {
            position: self.clamp(candidate, viewport),
            moved_beyond_threshold: state.moved_beyond_threshold || moved,
            ..state
        }
    }

    /// Ends the drag if `event` comes from the pointer that started it.
    pub fn release(&self, state: AnchorState, event: PointerEvent) -> AnchorState {
        if state.is_grabbed_by(event.kind) {
            self.end(state)
        } else {
            state
        }
    }

    /// Leaves `moved_beyond_threshold` in place for the arbiter to read.
    pub fn end(&self, state: AnchorState) -> AnchorState {
        AnchorState {
            dragging: false,
            grab: None,
            ..state
        }
    }

    pub fn reclamp(&self, state: AnchorState, viewport: Option<Viewport>) -> AnchorState {
        AnchorState {
            position: self.clamp(state.position, viewport),
            ..state
        }
    }

    fn clamp(&self, top_left: Point, viewport: Option<Viewport>) -> Point {
        match viewport.filter(Viewport::is_known) {
            Some(v) => v.clamp_top_left(top_left, Size::square(self.element_size())),
            None => top_left,
        }
    }
}
