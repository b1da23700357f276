//! Batch updates with a shared delta, and identical-change detection.

use chronoshape_core::Point;
use chronoshape_store::StoreError;

use crate::common::{service_with_triangle, t, triangle_points};

#[test]
fn shared_delta_translates_the_polygon() {
    let (service, pid) = service_with_triangle();
    service
        .update_vertices_with_same_delta(pid, &[0, 1, 2], (5.0, 5.0), t(100))
        .unwrap();

    let translated: Vec<Point> = triangle_points()
        .iter()
        .map(|p| Point::new(p.x + 5.0, p.y + 5.0))
        .collect();
    assert_eq!(service.get_polygon_at(pid, t(100)).unwrap(), translated);
    // The original shape is preserved before the change.
    assert_eq!(
        service.get_polygon_at(pid, t(99)).unwrap(),
        triangle_points()
    );
}

#[test]
fn first_listed_vertex_owns_the_group_tag() {
    let (service, pid) = service_with_triangle();
    service
        .update_vertices_with_same_delta(pid, &[0, 1, 2], (5.0, 5.0), t(100))
        .unwrap();

    let polygon = service.get_polygon(pid).unwrap();
    let owner = polygon.vertex(0).unwrap().state_at(t(100)).unwrap();
    assert_eq!(owner.grouped_vertex_ids, Some(vec![1, 2]));

    for vid in [1, 2] {
        let member = polygon.vertex(vid).unwrap().state_at(t(100)).unwrap();
        assert_eq!(member.grouped_vertex_ids, None);
        assert!(member.equivalent_to(&owner));
    }
}

#[test]
fn batch_members_are_detected_as_identical() {
    let (service, pid) = service_with_triangle();
    service
        .update_vertices_with_same_delta(pid, &[1, 2], (3.0, 0.0), t(50))
        .unwrap();

    let groups = service.detect_identical_changes(pid, t(50)).unwrap();
    assert_eq!(groups, vec![vec![1, 2]]);

    // Before the batch, the absolute creation states all differ.
    assert!(service.detect_identical_changes(pid, t(0)).unwrap().is_empty());
}

#[test]
fn partial_batches_leave_other_vertices_alone() {
    let (service, pid) = service_with_triangle();
    service
        .update_vertices_with_same_delta(pid, &[2], (1.0, 1.0), t(10))
        .unwrap();

    let ring = service.get_polygon_at(pid, t(10)).unwrap();
    assert_eq!(ring[0], Point::new(0.0, 0.0));
    assert_eq!(ring[1], Point::new(10.0, 0.0));
    assert_eq!(ring[2], Point::new(6.0, 11.0));

    // A single-member batch has no group to tag.
    let polygon = service.get_polygon(pid).unwrap();
    let state = polygon.vertex(2).unwrap().state_at(t(10)).unwrap();
    assert_eq!(state.grouped_vertex_ids, None);
}

#[test]
fn invalid_batches_fail_atomically() {
    let (service, pid) = service_with_triangle();

    let err = service
        .update_vertices_with_same_delta(pid, &[0, 99], (1.0, 1.0), t(10))
        .unwrap_err();
    assert!(matches!(err, StoreError::VertexNotFound { vertex_id: 99, .. }));

    // Nothing was applied, not even to the valid vertex.
    let polygon = service.get_polygon(pid).unwrap();
    assert_eq!(polygon.vertex(0).unwrap().state_count(), 1);

    assert!(matches!(
        service
            .update_vertices_with_same_delta(pid, &[], (1.0, 1.0), t(10))
            .unwrap_err(),
        StoreError::InvalidArgument(_)
    ));
}
