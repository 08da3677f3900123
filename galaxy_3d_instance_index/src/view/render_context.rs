/// RenderContext: what a visibility query needs to know about the view.
///
/// A context without a frustum disables spatial culling: visibility
/// then degrades to each instance's should-render flag.

use glam::Mat4;
use super::frustum::Frustum;

/// Source of the frustum used by `InstanceContainer::visible_instances`.
pub trait RenderContext {
    /// Frustum to cull against, or `None` to skip spatial culling.
    fn frustum(&self) -> Option<&Frustum>;
}

impl RenderContext for Frustum {
    fn frustum(&self) -> Option<&Frustum> {
        Some(self)
    }
}

/// Passive view description: matrices plus the frustum derived from them.
///
/// Computes the frustum once at construction; nothing else.
#[derive(Debug, Clone)]
pub struct ViewContext {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Option<Frustum>,
}

impl ViewContext {
    /// Build a context from view and projection matrices.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            frustum: Some(Frustum::from_view_projection(&(projection * view))),
        }
    }

    /// Context with no frustum (e.g. shadow or pick passes that want
    /// every renderable instance).
    pub fn unculled() -> Self {
        Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            frustum: None,
        }
    }

    /// View matrix.
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix.
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Override the frustum (e.g. a frozen culling frustum while debugging).
    pub fn set_frustum(&mut self, frustum: Option<Frustum>) {
        self.frustum = frustum;
    }
}

impl RenderContext for ViewContext {
    fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
