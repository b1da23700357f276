//! Polygon lifecycle: creation, vertex updates under the delta policy,
//! removal, and change notifications.

use std::sync::{Arc, Mutex};

use chronoshape_core::{CoordinateSystem, Point, StateKind};
use chronoshape_store::{
    ChangeKind, ChangeListener, PolygonChanged, StoreError, TemporalPolygonService, VertexChanged,
};

use crate::common::{service_with_square, square_points, t, HOUR};

#[test]
fn static_square_reconstructs_identically_over_time() {
    let (service, pid) = service_with_square();

    println!("=== STATIC RECONSTRUCTION TEST ===");
    let at_creation = service.get_polygon_at(pid, t(0)).unwrap();
    assert_eq!(at_creation, square_points());

    let an_hour_later = service.get_polygon_at(pid, t(HOUR)).unwrap();
    println!("VERIFY: shape unchanged after one hour with no updates");
    assert_eq!(an_hour_later, square_points());
    println!("RESULT: PASSED");
}

#[test]
fn small_update_is_stored_as_delta() {
    let (service, pid) = service_with_square();
    service
        .update_vertex(pid, 0, Point::new(2.0, 2.0), t(HOUR))
        .unwrap();

    // The appended state is a delta under the default threshold of 100.
    let polygon = service.get_polygon(pid).unwrap();
    let state = polygon.vertex(0).unwrap().state_at(t(HOUR)).unwrap();
    assert!(matches!(state.kind, StateKind::Delta { dx, dy } if dx == 2.0 && dy == 2.0));

    // New position after, original before.
    assert_eq!(
        service.get_polygon_at(pid, t(HOUR)).unwrap()[0],
        Point::new(2.0, 2.0)
    );
    assert_eq!(
        service.get_polygon_at(pid, t(0)).unwrap()[0],
        Point::new(0.0, 0.0)
    );
}

#[test]
fn large_update_re_anchors_as_absolute() {
    let (service, pid) = service_with_square();
    service
        .update_vertex(pid, 0, Point::new(500.0, 500.0), t(HOUR))
        .unwrap();

    let polygon = service.get_polygon(pid).unwrap();
    let state = polygon.vertex(0).unwrap().state_at(t(HOUR)).unwrap();
    assert!(state.is_absolute());
    assert_eq!(
        service.get_polygon_at(pid, t(HOUR)).unwrap()[0],
        Point::new(500.0, 500.0)
    );
}

#[test]
fn updated_position_is_exact_and_sticky() {
    // After update_vertex(v, p, t): position_at(t) == p exactly, and it
    // stays p for every later time with no further updates.
    let (service, pid) = service_with_square();
    let target = Point::new(3.25, -1.75);
    service.update_vertex(pid, 2, target, t(100)).unwrap();

    assert_eq!(service.get_vertex_position(pid, 2, t(100)).unwrap(), target);
    for later in [t(101), t(10_000), t(1_000_000)] {
        assert_eq!(service.get_polygon_at(pid, later).unwrap()[2], target);
    }
}

#[test]
fn reconstruction_length_always_matches_vertex_count() {
    let (service, pid) = service_with_square();
    for secs in [0, 50, 3_600, 86_400] {
        assert_eq!(service.get_polygon_at(pid, t(secs)).unwrap().len(), 4);
    }
}

#[test]
fn consecutive_updates_close_previous_intervals() {
    let (service, pid) = service_with_square();
    service.update_vertex(pid, 1, Point::new(11.0, 1.0), t(10)).unwrap();
    service.update_vertex(pid, 1, Point::new(12.0, 2.0), t(20)).unwrap();

    let polygon = service.get_polygon(pid).unwrap();
    let history = polygon.vertex(1).unwrap().history_snapshot();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].interval.end, Some(t(10)));
    assert_eq!(history[1].interval.end, Some(t(20)));
    assert!(history[2].interval.is_open_ended());
    // Seamless chain: the integrity validator finds nothing.
    assert!(service.validate_polygon_integrity(pid).unwrap().is_empty());
}

#[test]
fn degenerate_polygons_are_rejected_at_creation() {
    let service = TemporalPolygonService::new();

    let too_few = service.create_polygon(
        &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
        t(0),
        CoordinateSystem::Cartesian,
    );
    assert!(matches!(
        too_few.unwrap_err(),
        StoreError::Core(chronoshape_core::CoreError::InvalidPolygon { .. })
    ));

    let bowtie = service.create_polygon(
        &[
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ],
        t(0),
        CoordinateSystem::Cartesian,
    );
    assert!(bowtie.is_err());
    assert!(service.get_all_polygons().is_empty());
}

#[test]
fn removal_forgets_the_polygon_and_its_caches() {
    let (service, pid) = service_with_square();
    service.get_polygon_at(pid, t(10)).unwrap();
    service.mark_time_for_precomputation(pid, t(10)).unwrap();
    service.precompute_marked_times(pid).unwrap();

    service.remove_polygon(pid).unwrap();
    assert!(matches!(
        service.get_polygon(pid).unwrap_err(),
        StoreError::PolygonNotFound(_)
    ));
    assert_eq!(service.cache_stats().len, 0);
    // A fresh registration of the same shape is unrelated.
    assert!(service.get_all_polygons().is_empty());
}

#[derive(Default)]
struct RecordingListener {
    polygon_events: Mutex<Vec<ChangeKind>>,
    vertex_events: Mutex<Vec<VertexChanged>>,
}

impl ChangeListener for RecordingListener {
    fn on_polygon_changed(&self, event: &PolygonChanged) {
        self.polygon_events.lock().unwrap().push(event.kind);
    }

    fn on_vertex_changed(&self, event: &VertexChanged) {
        self.vertex_events.lock().unwrap().push(*event);
    }
}

#[test]
fn listeners_observe_the_full_lifecycle() {
    let service = TemporalPolygonService::new();
    let listener = Arc::new(RecordingListener::default());
    service.add_listener(listener.clone());

    let pid = service
        .create_polygon(&square_points(), t(0), CoordinateSystem::Cartesian)
        .unwrap();
    service
        .update_vertex(pid, 0, Point::new(1.0, 1.0), t(10))
        .unwrap();
    service.remove_polygon(pid).unwrap();

    let kinds = listener.polygon_events.lock().unwrap().clone();
    assert_eq!(
        kinds,
        vec![
            ChangeKind::Created,
            ChangeKind::VertexChanged,
            ChangeKind::Deleted
        ]
    );

    let vertex_events = listener.vertex_events.lock().unwrap();
    assert_eq!(vertex_events.len(), 1);
    assert_eq!(vertex_events[0].vertex_id, 0);
    assert_eq!(vertex_events[0].change_time, t(10));
    assert_eq!(vertex_events[0].new_position, Point::new(1.0, 1.0));
}
