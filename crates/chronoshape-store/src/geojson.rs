//! GeoJSON emission for reconstructed polygons.
//!
//! Reconstruction rings are open; GeoJSON linear rings are closed, so
//! emission appends the first point after the last. Only output shapes
//! are modeled, no parsing of foreign GeoJSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use chronoshape_core::{Point, PolygonId, Timestamp};

use crate::error::{StoreError, StoreResult};

/// A GeoJSON Polygon geometry with a single linear ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// A GeoJSON Feature wrapping one geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

/// Build a Polygon geometry from an open reconstruction ring.
///
/// Fails when the ring has fewer than three distinct points; the
/// closing vertex is appended so the output ring has `n + 1` entries.
pub fn geometry_from_ring(ring: &[Point]) -> StoreResult<Geometry> {
    let distinct: HashSet<_> = ring.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect();
    if distinct.len() < 3 {
        return Err(StoreError::invalid_argument(format!(
            "GeoJSON polygon needs at least 3 distinct points, got {}",
            distinct.len()
        )));
    }

    let mut coordinates: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
    coordinates.push(coordinates[0]);
    Ok(Geometry {
        geometry_type: "Polygon".to_string(),
        coordinates: vec![coordinates],
    })
}

/// Wrap a geometry in a Feature tagged with its polygon id and the
/// reconstruction time.
pub fn feature_from_ring(
    ring: &[Point],
    polygon_id: PolygonId,
    time: Timestamp,
) -> StoreResult<Feature> {
    let geometry = geometry_from_ring(ring)?;
    let mut properties = Map::new();
    properties.insert("polygonId".to_string(), Value::String(polygon_id.to_string()));
    properties.insert("timestamp".to_string(), Value::String(time.to_rfc3339()));
    Ok(Feature {
        feature_type: "Feature".to_string(),
        geometry,
        properties,
    })
}

/// Collect features into a FeatureCollection.
pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        collection_type: "FeatureCollection".to_string(),
        features,
    }
}
