use glam::{Mat4, Vec3};
use super::*;

fn test_matrices() -> (Mat4, Mat4) {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
    (view, projection)
}

#[test]
fn test_new_derives_frustum_from_matrices() {
    let (view, projection) = test_matrices();
    let ctx = ViewContext::new(view, projection);

    let expected = Frustum::from_view_projection(&(projection * view));
    assert_eq!(ctx.frustum(), Some(&expected));
    assert_eq!(ctx.view_projection_matrix(), projection * view);
    assert_eq!(*ctx.view_matrix(), view);
    assert_eq!(*ctx.projection_matrix(), projection);
}

#[test]
fn test_unculled_has_no_frustum() {
    let ctx = ViewContext::unculled();
    assert!(ctx.frustum().is_none());
}

#[test]
fn test_set_frustum_overrides() {
    let (view, projection) = test_matrices();
    let mut ctx = ViewContext::new(view, projection);
    ctx.set_frustum(None);
    assert!(ctx.frustum().is_none());

    let frozen = Frustum::from_view_projection(&Mat4::IDENTITY);
    ctx.set_frustum(Some(frozen));
    assert_eq!(ctx.frustum(), Some(&frozen));
}

#[test]
fn test_frustum_is_its_own_context() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);
    let ctx: &dyn RenderContext = &frustum;
    assert_eq!(ctx.frustum(), Some(&frustum));
}
