//! The observer seam: whatever the world streams around.
//!
//! Movement, physics and input live outside the engine. The streaming
//! scheduler only ever asks for the current position.

use cgmath::Point3;

use crate::core::MtResource;

/// Source of the position the world is streamed around.
pub trait Observer: Send + Sync {
    /// Current position in world space.
    fn position(&self) -> Point3<f32>;
}

/// An observer whose position is set from outside, for example by the game's
/// camera each frame.
#[derive(Clone)]
pub struct SharedObserver {
    position: MtResource<Point3<f32>>,
}

impl SharedObserver {
    pub fn new(position: Point3<f32>) -> Self {
        SharedObserver {
            position: MtResource::new(position),
        }
    }

    pub fn set_position(&self, position: Point3<f32>) {
        *self.position.get_mut() = position;
    }
}

impl Observer for SharedObserver {
    fn position(&self) -> Point3<f32> {
        *self.position.get()
    }
}
