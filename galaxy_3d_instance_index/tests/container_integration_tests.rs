//! Integration tests for the container strategies
//!
//! Drives every strategy through the public API only.
//!
//! Run with: cargo test --test container_integration_tests


use galaxy_3d_instance_index::galaxy3d::container::{Container, ContainerType, InstanceContainer};
use galaxy_3d_instance_index::galaxy3d::instance::{GraphicsInstance, InstanceId, RenderParameter};
use galaxy_3d_instance_index::galaxy3d::view::ViewContext;
use galaxy_3d_instance_index::galaxy3d::{ContainerFactory, Error, OctreeConfig, AABB};
use galaxy_3d_instance_index::glam::{Mat4, Vec3};
use instance_test_utils::{sorted_ids, EventCounter, SceneObject};

const KINDS: [ContainerType; 4] = [
    ContainerType::AabbTree,
    ContainerType::Octree,
    ContainerType::Priority,
    ContainerType::Queue,
];

fn camera_looking_down_negative_z() -> ViewContext {
    ViewContext::new(
        Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, 0.1, 500.0),
    )
}

fn populated(kind: ContainerType) -> Container {
    let factory = ContainerFactory::new(OctreeConfig {
        world_bounds: AABB::new(Vec3::splat(-1000.0), Vec3::splat(1000.0)),
        max_depth: 6,
        split_threshold: 4,
    })
    .unwrap();
    let mut container = factory.create(kind, RenderParameter(1)).unwrap();

    // A ring of objects around the camera: half in front, half behind
    for i in 0..64u64 {
        let angle = i as f32 / 64.0 * std::f32::consts::TAU;
        let center = Vec3::new(angle.sin() * 50.0, 0.0, angle.cos() * 50.0);
        container.add(SceneObject::new(i, center)).unwrap();
    }
    container
}

// ============================================================================
// VISIBILITY
// ============================================================================

#[test]
fn test_integration_spatial_strategies_agree_on_visible_set() {
    let view = camera_looking_down_negative_z();
    let tree = sorted_ids(&populated(ContainerType::AabbTree).visible_instances(&view));
    let octree = sorted_ids(&populated(ContainerType::Octree).visible_instances(&view));

    assert!(!tree.is_empty());
    assert!(tree.len() < 64);
    assert_eq!(tree, octree);
}

#[test]
fn test_integration_unculled_view_returns_every_renderable() {
    for kind in KINDS {
        let container = populated(kind);
        let visible = sorted_ids(&container.visible_instances(&ViewContext::unculled()));
        assert_eq!(visible, (0..64).collect::<Vec<u64>>());
    }
}

#[test]
fn test_integration_hidden_objects_never_visible() {
    for kind in KINDS {
        let mut container = populated(kind);
        let hidden = SceneObject::new(500, Vec3::new(0.0, 0.0, -20.0));
        hidden.set_visible(false);
        container.add(hidden).unwrap();

        let view = camera_looking_down_negative_z();
        assert!(!sorted_ids(&container.visible_instances(&view)).contains(&500));
        assert!(!sorted_ids(&container.visible_instances(&ViewContext::unculled())).contains(&500));
        assert!(container.contains(InstanceId(500)));
    }
}

// ============================================================================
// CHURN
// ============================================================================

#[test]
fn test_integration_add_remove_round_trip() {
    for kind in KINDS {
        let mut container = populated(kind);
        let view = camera_looking_down_negative_z();
        let before_all = sorted_ids(&container.all_instances());
        let before_visible = sorted_ids(&container.visible_instances(&view));

        container.add(SceneObject::new(1000, Vec3::new(1.0, 2.0, -30.0))).unwrap();
        assert!(container.remove(InstanceId(1000)).is_some());

        assert_eq!(sorted_ids(&container.all_instances()), before_all);
        assert_eq!(sorted_ids(&container.visible_instances(&view)), before_visible);
    }
}

#[test]
fn test_integration_listener_sees_full_lifecycle() {
    for kind in KINDS {
        let mut container = populated(kind);
        let counter = EventCounter::new();
        container.add_listener(counter.clone());

        let object = SceneObject::new(77, Vec3::new(0.0, 0.0, -10.0));
        container.add(object.clone()).unwrap();
        assert!(!container.add(SceneObject::new(77, Vec3::ZERO)).unwrap());
        object.discard();
        container.swap_data();
        container.clear();

        assert_eq!(counter.counts(), (1, 1, 0));
        assert_eq!(*counter.last_type.lock().unwrap(), Some(kind));
        assert!(container.is_empty());
    }
}

#[test]
fn test_integration_spatial_strategies_reject_unbounded_instances() {
    struct Marker;
    impl GraphicsInstance for Marker {
        fn identifier(&self) -> InstanceId {
            InstanceId(1)
        }
        fn should_render(&self) -> bool {
            true
        }
        fn should_discard(&self) -> bool {
            false
        }
        fn is_batch_dirty(&self) -> bool {
            false
        }
        fn clear_batch_dirty_flags(&self) {}
    }

    let factory = ContainerFactory::default();
    for kind in KINDS {
        let mut container = factory.create(kind, RenderParameter(0)).unwrap();
        let result = container.add(std::sync::Arc::new(Marker));
        if kind.is_spatial() {
            assert!(matches!(result, Err(Error::InvalidInstance(_))));
            assert!(container.is_empty());
        } else {
            assert_eq!(result, Ok(true));
        }
    }
}
