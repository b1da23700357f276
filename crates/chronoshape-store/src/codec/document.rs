//! Wire DTOs for polygon persistence.
//!
//! Field names are camelCase and the shapes match the persisted
//! document format exactly; conversion logic lives in the codec module
//! so these stay plain data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronoshape_core::{CoordinateSystem, Timestamp, VertexId};

/// Top-level persisted polygon.
///
/// Exactly one of `vertex_ids` and `vertex_ids_encoded` is non-null:
/// the encoded form is written only for the natural order
/// `0, 1, …, n-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonDocument {
    pub id: Uuid,
    pub vertex_ids: Option<Vec<VertexId>>,
    pub vertex_ids_encoded: Option<String>,
    pub coordinate_system: Option<CoordinateSystem>,
    pub vertices: Vec<VertexDocument>,
}

/// One vertex and its full state history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexDocument {
    pub id: VertexId,
    pub states: Vec<StateDocument>,
}

/// One vertex state.
///
/// The flavor is encoded positionally: `temporal_function` present
/// means a function state (with `absolute_x`/`absolute_y` carrying the
/// sampled fallback an opaque function deserializes to), otherwise
/// `is_absolute` picks between the absolute point and the delta pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub delta_x: f64,
    pub delta_y: f64,
    pub is_absolute: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_y: Option<f64>,
    pub interval_start: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_end: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_vertex_ids: Option<Vec<VertexId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_function: Option<FunctionDocument>,
}

/// Serialized descriptor of a temporal function.
///
/// Parameters by type: `Linear` is `[velocity_x, velocity_y]` with the
/// motion's starting point as reference; `Circular` is
/// `[radius, angular_velocity, phase]` with the center as reference;
/// `Opaque` carries no parameters and deserializes to the absolute
/// fallback stored on its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDocument {
    pub function_type: String,
    pub reference_point_x: f64,
    pub reference_point_y: f64,
    pub reference_time: Timestamp,
    pub parameters: Vec<f64>,
}
