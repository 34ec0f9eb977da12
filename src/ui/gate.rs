use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ui::surface::Surface;

/// The one lock every screen-touching operation goes through.
///
/// The input loop and the update task both draw; holding the guard for the
/// whole of a render keeps their draw calls from interleaving. The guard is a
/// plain mutex guard and must never be held across an `.await`.
pub struct RenderGate<S> {
    surface: Mutex<S>,
}

impl<S: Surface> RenderGate<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Mutex::new(surface),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
