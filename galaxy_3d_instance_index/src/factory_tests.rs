use std::sync::Arc;
use glam::Vec3;
use crate::bounds::AABB;
use crate::container::InstanceContainer;
use crate::error::Error;
use crate::instance::mock_instance::MockInstance;
use crate::instance::{GraphicsInstance, InstanceId, SharedInstance};
use super::*;

#[test]
fn test_default_factory_builds_every_strategy() {
    let factory = ContainerFactory::default();
    for kind in [
        ContainerType::AabbTree,
        ContainerType::Octree,
        ContainerType::Priority,
        ContainerType::Queue,
    ] {
        let container = factory.create(kind, RenderParameter(5)).unwrap();
        assert_eq!(container.container_type(), kind);
        assert_eq!(container.render_parameter(), RenderParameter(5));
        assert!(container.is_empty());
    }
}

#[test]
fn test_factory_rejects_invalid_octree_config() {
    let config = OctreeConfig::with_world_bounds(AABB::new(Vec3::ONE, Vec3::ZERO));
    assert!(matches!(ContainerFactory::new(config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_octree_uses_factory_config() {
    let bounds = AABB::new(Vec3::splat(-4.0), Vec3::splat(4.0));
    let factory = ContainerFactory::new(OctreeConfig::with_world_bounds(bounds)).unwrap();
    assert_eq!(factory.octree_config().world_bounds, bounds);

    match factory.create(ContainerType::Octree, RenderParameter(0)).unwrap() {
        Container::Octree(octree) => assert_eq!(octree.storage().config().world_bounds, bounds),
        _ => panic!("expected an octree container"),
    }
}

#[test]
fn test_priority_containers_share_factory_order() {
    let descending: PriorityOrder = Arc::new(|a: &dyn GraphicsInstance, b: &dyn GraphicsInstance| {
        b.identifier().cmp(&a.identifier())
    });
    let factory = ContainerFactory::default().with_priority_order(descending);

    let mut first = factory.create(ContainerType::Priority, RenderParameter(0)).unwrap();
    let mut second = factory.create(ContainerType::Priority, RenderParameter(1)).unwrap();
    for id in [1, 3, 2] {
        first.add(MockInstance::unbounded(id)).unwrap();
        second.add(MockInstance::unbounded(id)).unwrap();
    }

    let order = |c: &Container| -> Vec<InstanceId> {
        c.all_instances().iter().map(|i: &SharedInstance| i.identifier()).collect()
    };
    assert_eq!(order(&first), vec![InstanceId(3), InstanceId(2), InstanceId(1)]);
    assert_eq!(order(&second), order(&first));
}
