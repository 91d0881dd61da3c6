//! Property sinks
//!
//! The animated element is anything that exposes one setter per physical
//! property. Jobs only hold weak references to elements, so a torn-down
//! element silently absorbs every later write.

use crate::kind::AnimationKind;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// An element whose visual properties can be animated
pub trait PropertySink {
    /// Horizontal offset in pixels
    fn set_translation_x(&mut self, value: f32);

    /// Vertical offset in pixels
    fn set_translation_y(&mut self, value: f32);

    /// 3D tilt around the X axis, in degrees
    fn set_rotation_x(&mut self, value: f32);

    /// 3D tilt around the Y axis, in degrees
    fn set_rotation_y(&mut self, value: f32);

    /// In-plane rotation around the Z axis, in degrees
    fn set_rotation(&mut self, value: f32);

    fn set_scale_x(&mut self, value: f32);

    fn set_scale_y(&mut self, value: f32);

    /// Opacity in 0..1
    fn set_alpha(&mut self, value: f32);

    fn set_visible(&mut self, visible: bool);
}

/// An element shared with the animation engine
pub type SharedSink = Arc<Mutex<dyn PropertySink + Send>>;

/// Weak reference to an animated element
///
/// Writes through a dead reference are no-ops.
#[derive(Clone)]
pub struct ElementRef {
    inner: Weak<Mutex<dyn PropertySink + Send>>,
}

impl ElementRef {
    pub fn new<S: PropertySink + Send + 'static>(element: &Arc<Mutex<S>>) -> Self {
        let shared: SharedSink = element.clone();
        Self::from_shared(&shared)
    }

    pub fn from_shared(element: &SharedSink) -> Self {
        Self {
            inner: Arc::downgrade(element),
        }
    }

    /// Check if the element is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Run `f` against the element if it is still alive
    ///
    /// Returns false when the element has been dropped.
    pub fn write<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut dyn PropertySink),
    {
        match self.inner.upgrade() {
            Some(element) => {
                let mut guard = element.lock();
                f(&mut *guard);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Plain in-memory element
///
/// Useful for headless drivers and tests. Starts at the identity pose:
/// no offset or rotation, unit scale, fully opaque and visible.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewProperties {
    pub translation_x: f32,
    pub translation_y: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
    pub visible: bool,
}

impl ViewProperties {
    pub fn new() -> Self {
        Self {
            translation_x: 0.0,
            translation_y: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
            visible: true,
        }
    }

    /// A hidden element, as used for items waiting on a staggered reveal
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::new()
        }
    }

    /// Wrap into a shareable element
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// Read back the property driven by `kind`
    ///
    /// `ScaleXY` reports the horizontal scale.
    pub fn get(&self, kind: AnimationKind) -> f32 {
        match kind {
            AnimationKind::TranslateX => self.translation_x,
            AnimationKind::TranslateY => self.translation_y,
            AnimationKind::RotateX => self.rotation_x,
            AnimationKind::RotateY => self.rotation_y,
            AnimationKind::Rotation => self.rotation,
            AnimationKind::ScaleX | AnimationKind::ScaleXY => self.scale_x,
            AnimationKind::ScaleY => self.scale_y,
            AnimationKind::Alpha => self.alpha,
        }
    }
}

impl Default for ViewProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySink for ViewProperties {
    fn set_translation_x(&mut self, value: f32) {
        self.translation_x = value;
    }

    fn set_translation_y(&mut self, value: f32) {
        self.translation_y = value;
    }

    fn set_rotation_x(&mut self, value: f32) {
        self.rotation_x = value;
    }

    fn set_rotation_y(&mut self, value: f32) {
        self.rotation_y = value;
    }

    fn set_rotation(&mut self, value: f32) {
        self.rotation = value;
    }

    fn set_scale_x(&mut self, value: f32) {
        self.scale_x = value;
    }

    fn set_scale_y(&mut self, value: f32) {
        self.scale_y = value;
    }

    fn set_alpha(&mut self, value: f32) {
        self.alpha = value;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_reaches_live_element() {
        let view = ViewProperties::new().shared();
        let element = ElementRef::new(&view);

        assert!(element.is_alive());
        assert!(element.write(|sink| sink.set_alpha(0.25)));
        assert_eq!(view.lock().alpha, 0.25);
    }

    #[test]
    fn test_write_to_dropped_element_is_noop() {
        let view = ViewProperties::new().shared();
        let element = ElementRef::new(&view);
        drop(view);

        assert!(!element.is_alive());
        let mut called = false;
        assert!(!element.write(|_| called = true));
        assert!(!called);
    }

    #[test]
    fn test_from_shared_sink() {
        let view = ViewProperties::hidden().shared();
        let shared: SharedSink = view.clone();
        let element = ElementRef::from_shared(&shared);
        drop(shared);

        element.write(|sink| sink.set_visible(true));
        assert!(view.lock().visible);
    }
}
