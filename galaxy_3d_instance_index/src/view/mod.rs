//! View module: frustum planes and the render context handed to
//! visibility queries.
//!
//! The index never owns a camera: the caller builds a context for each
//! query and passes it by reference.

mod frustum;
mod render_context;

pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use render_context::{RenderContext, ViewContext};
