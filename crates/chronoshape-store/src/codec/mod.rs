//! JSON persistence codec for temporal polygons.
//!
//! Converts between the in-memory model and the camelCase document
//! DTOs, serialized with `serde_json`. Opaque temporal functions are
//! written as descriptors with an absolute fallback position sampled at
//! the state's interval start; deserializing an opaque slot yields an
//! absolute state at that fallback.

mod document;
pub mod range_encoding;

pub use document::{FunctionDocument, PolygonDocument, StateDocument, VertexDocument};

use std::collections::HashMap;

use chronoshape_core::{
    CoordinateSystem, Point, StateKind, TemporalFunction, TemporalPolygon, TimeInterval, Vertex,
    VertexState,
};

use crate::error::{StoreError, StoreResult};

/// Convert a polygon into its persisted document form.
pub fn to_document(polygon: &TemporalPolygon) -> PolygonDocument {
    let ids = polygon.vertex_ids();
    let (vertex_ids, vertex_ids_encoded) = if range_encoding::is_natural_order(ids) {
        (None, Some(range_encoding::encode(ids)))
    } else {
        (Some(ids.to_vec()), None)
    };

    let vertices = polygon
        .vertices_in_order()
        .map(|vertex| VertexDocument {
            id: vertex.id(),
            states: vertex
                .history_snapshot()
                .iter()
                .map(state_to_document)
                .collect(),
        })
        .collect();

    PolygonDocument {
        id: polygon.id(),
        vertex_ids,
        vertex_ids_encoded,
        coordinate_system: Some(polygon.coordinate_system()),
        vertices,
    }
}

/// Rebuild a polygon from its persisted document form.
pub fn from_document(document: &PolygonDocument) -> StoreResult<TemporalPolygon> {
    let vertex_ids = match (&document.vertex_ids, &document.vertex_ids_encoded) {
        (Some(ids), None) => ids.clone(),
        (None, Some(encoded)) => range_encoding::decode(encoded)?,
        (Some(_), Some(_)) => {
            return Err(StoreError::serialization(
                "document carries both vertexIds and vertexIdsEncoded",
            ))
        }
        (None, None) => {
            return Err(StoreError::serialization(
                "document carries neither vertexIds nor vertexIdsEncoded",
            ))
        }
    };

    let mut vertices = HashMap::with_capacity(document.vertices.len());
    for vertex_doc in &document.vertices {
        let states = vertex_doc
            .states
            .iter()
            .map(state_from_document)
            .collect::<StoreResult<Vec<_>>>()?;
        vertices.insert(vertex_doc.id, Vertex::from_states(vertex_doc.id, states));
    }

    let coordinate_system = document
        .coordinate_system
        .unwrap_or(CoordinateSystem::Cartesian);
    TemporalPolygon::from_parts(document.id, vertex_ids, vertices, coordinate_system)
        .map_err(StoreError::from)
}

/// Serialize a polygon to a JSON string.
pub fn to_json_string(polygon: &TemporalPolygon) -> StoreResult<String> {
    Ok(serde_json::to_string(&to_document(polygon))?)
}

/// Deserialize a polygon from a JSON string.
pub fn from_json_str(json: &str) -> StoreResult<TemporalPolygon> {
    let document: PolygonDocument = serde_json::from_str(json)?;
    from_document(&document)
}

fn state_to_document(state: &VertexState) -> StateDocument {
    let mut doc = StateDocument {
        delta_x: 0.0,
        delta_y: 0.0,
        is_absolute: false,
        absolute_x: None,
        absolute_y: None,
        interval_start: state.interval.start,
        interval_end: state.interval.end,
        grouped_vertex_ids: state.grouped_vertex_ids.clone(),
        temporal_function: None,
    };
    match &state.kind {
        StateKind::Absolute(point) => {
            doc.is_absolute = true;
            doc.absolute_x = Some(point.x);
            doc.absolute_y = Some(point.y);
        }
        StateKind::Delta { dx, dy } => {
            doc.delta_x = *dx;
            doc.delta_y = *dy;
        }
        StateKind::Function(function) => {
            // The fallback an opaque descriptor deserializes to; written
            // for every function so foreign readers need no evaluator.
            let fallback = function.position_at(state.interval.start);
            doc.absolute_x = Some(fallback.x);
            doc.absolute_y = Some(fallback.y);
            doc.temporal_function = Some(function_to_document(function));
        }
    }
    doc
}

fn function_to_document(function: &TemporalFunction) -> FunctionDocument {
    match function {
        TemporalFunction::Linear {
            reference_point,
            reference_time,
            velocity_x,
            velocity_y,
        } => FunctionDocument {
            function_type: "Linear".to_string(),
            reference_point_x: reference_point.x,
            reference_point_y: reference_point.y,
            reference_time: *reference_time,
            parameters: vec![*velocity_x, *velocity_y],
        },
        TemporalFunction::Circular {
            center,
            reference_time,
            radius,
            angular_velocity,
            phase,
        } => FunctionDocument {
            function_type: "Circular".to_string(),
            reference_point_x: center.x,
            reference_point_y: center.y,
            reference_time: *reference_time,
            parameters: vec![*radius, *angular_velocity, *phase],
        },
        TemporalFunction::Opaque {
            reference_point,
            reference_time,
            ..
        } => FunctionDocument {
            function_type: "Opaque".to_string(),
            reference_point_x: reference_point.x,
            reference_point_y: reference_point.y,
            reference_time: *reference_time,
            parameters: Vec::new(),
        },
    }
}

fn state_from_document(doc: &StateDocument) -> StoreResult<VertexState> {
    let interval = TimeInterval::new(doc.interval_start, doc.interval_end)?;

    let kind = if let Some(function_doc) = &doc.temporal_function {
        match function_from_document(function_doc)? {
            Some(function) => StateKind::Function(function),
            // Opaque: fall back to the absolute position stored
            // alongside the descriptor.
            None => StateKind::Absolute(absolute_fallback(doc)?),
        }
    } else if doc.is_absolute {
        StateKind::Absolute(absolute_fallback(doc)?)
    } else {
        StateKind::Delta {
            dx: doc.delta_x,
            dy: doc.delta_y,
        }
    };

    Ok(VertexState {
        interval,
        kind,
        grouped_vertex_ids: doc.grouped_vertex_ids.clone(),
    })
}

fn absolute_fallback(doc: &StateDocument) -> StoreResult<Point> {
    match (doc.absolute_x, doc.absolute_y) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => Err(StoreError::serialization(format!(
            "state starting {} needs absoluteX/absoluteY",
            doc.interval_start
        ))),
    }
}

/// Decode a function descriptor; `Ok(None)` marks an opaque slot that
/// must fall back to the stored absolute position.
fn function_from_document(doc: &FunctionDocument) -> StoreResult<Option<TemporalFunction>> {
    let reference_point = Point::new(doc.reference_point_x, doc.reference_point_y);
    match doc.function_type.as_str() {
        "Linear" => match doc.parameters.as_slice() {
            [velocity_x, velocity_y] => Ok(Some(TemporalFunction::Linear {
                reference_point,
                reference_time: doc.reference_time,
                velocity_x: *velocity_x,
                velocity_y: *velocity_y,
            })),
            other => Err(StoreError::serialization(format!(
                "Linear function needs 2 parameters, got {}",
                other.len()
            ))),
        },
        "Circular" => match doc.parameters.as_slice() {
            [radius, angular_velocity, phase] => Ok(Some(TemporalFunction::Circular {
                center: reference_point,
                reference_time: doc.reference_time,
                radius: *radius,
                angular_velocity: *angular_velocity,
                phase: *phase,
            })),
            other => Err(StoreError::serialization(format!(
                "Circular function needs 3 parameters, got {}",
                other.len()
            ))),
        },
        "Opaque" => Ok(None),
        other => Err(StoreError::serialization(format!(
            "unknown function type {other:?}"
        ))),
    }
}
