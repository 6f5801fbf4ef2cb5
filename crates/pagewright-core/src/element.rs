//! Element references and rendered-state snapshots.
//!
//! These types are backend independent: a driver hands out
//! [`ElementHandle`]s and reports [`ElementState`] for them, and the
//! façade decides what counts as present, visible or clickable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque reference to a DOM node issued by a driver.
///
/// Handles go stale when the page re-renders the node; using a stale handle
/// yields [`DriverError::StaleElement`](crate::driver::DriverError::StaleElement).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The bounding box of an element in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// The x-coordinate of the element's top-left corner.
    pub x: f64,
    /// The y-coordinate of the element's top-left corner.
    pub y: f64,
    /// The width of the element.
    pub width: f64,
    /// The height of the element.
    pub height: f64,
}

impl Rect {
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Rendered state of an element at the moment it was probed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Whether the browser reports the element as displayed.
    pub displayed: bool,
    /// Whether the element accepts interaction (not `disabled`).
    pub enabled: bool,
    /// The element's bounding box, when the backend reports one.
    pub rect: Option<Rect>,
}

impl ElementState {
    /// Rendered and occupying a non-zero area.
    ///
    /// A missing rect is treated as visible when the element is displayed,
    /// since some backends cannot report geometry.
    pub fn is_visible(&self) -> bool {
        self.displayed && self.rect.map_or(true, |r| r.has_area())
    }

    /// Visible and enabled. Obstruction by overlays is only detectable at
    /// click time and is reported by the driver.
    pub fn is_clickable(&self) -> bool {
        self.is_visible() && self.enabled
    }
}

/// How far along the render pipeline an element must be before an action
/// may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Attached to the DOM; rendering not required (reading text, file inputs).
    Attached,
    /// Displayed with a non-zero size.
    Visible,
    /// Visible and enabled.
    Clickable,
}

impl Presence {
    pub fn name(&self) -> &'static str {
        match self {
            Presence::Attached => "attached",
            Presence::Visible => "visible",
            Presence::Clickable => "clickable",
        }
    }

    /// Whether a probed state satisfies this requirement.
    pub fn satisfied_by(&self, state: &ElementState) -> bool {
        match self {
            Presence::Attached => true,
            Presence::Visible => state.is_visible(),
            Presence::Clickable => state.is_clickable(),
        }
    }
}
