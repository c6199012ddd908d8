#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Planar geometry primitives for risk analysis and evacuation planning.
//!
//! All geometries are assumed to be in a projected CRS measured in meters.
//! Provides area, intersection, buffer, centroid and distance helpers over
//! `geo` types, `GeoJSON` conversion for the text columns the store keeps
//! geometries in, and an R-tree [`PointIndex`] for point-in-polygon
//! lookups.

use geo::{
    Area, BooleanOps, BoundingRect, Buffer, Centroid, Contains, Distance, Euclidean, Geometry,
    Intersects, LineString, MultiPolygon, Point,
};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};

/// Square meters per square kilometer.
pub const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;

/// Meters per kilometer.
pub const METERS_PER_KM: f64 = 1000.0;

/// Planar area of a polygon in square meters.
#[must_use]
pub fn area_sq_m(polygon: &MultiPolygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// Planar area of a polygon in square kilometers.
#[must_use]
pub fn area_sqkm(polygon: &MultiPolygon<f64>) -> f64 {
    polygon.unsigned_area() / SQ_METERS_PER_SQ_KM
}

/// Whether two polygons share any point.
#[must_use]
pub fn intersects(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.intersects(b)
}

/// Area in square meters of the overlap between two polygons.
///
/// Returns `0.0` without running the boolean overlay when the polygons do
/// not touch.
#[must_use]
pub fn intersection_area(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    if !a.intersects(b) {
        return 0.0;
    }
    a.intersection(b).unsigned_area()
}

/// Buffers any geometry (line, point or polygon) by `distance_m` meters.
#[must_use]
pub fn buffer(geometry: &Geometry<f64>, distance_m: f64) -> MultiPolygon<f64> {
    geometry.buffer(distance_m)
}

/// Geometric centroid of a polygon, or `None` for an empty geometry.
#[must_use]
pub fn centroid(polygon: &MultiPolygon<f64>) -> Option<Point<f64>> {
    polygon.centroid()
}

/// Straight-line planar distance in meters.
#[must_use]
pub fn planar_distance_m(from: Point<f64>, to: Point<f64>) -> f64 {
    Euclidean.distance(from, to)
}

/// Converts meters to kilometers.
#[must_use]
pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

/// Two-vertex line from `from` to `to`.
#[must_use]
pub fn straight_line(from: Point<f64>, to: Point<f64>) -> LineString<f64> {
    LineString::from(vec![from.0, to.0])
}

/// Parse a `GeoJSON` string into any [`Geometry`].
#[must_use]
pub fn parse_geojson_geometry(geojson_str: &str) -> Option<Geometry<f64>> {
    let geojson: GeoJson = geojson_str.parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        geom.try_into().ok()
    } else {
        None
    }
}

/// Parse a `GeoJSON` string into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
#[must_use]
pub fn parse_geojson_to_multipolygon(geojson_str: &str) -> Option<MultiPolygon<f64>> {
    match parse_geojson_geometry(geojson_str)? {
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Serializes a geometry as a `GeoJSON` geometry string.
#[must_use]
pub fn to_geojson_string(geometry: &Geometry<f64>) -> String {
    GeoJson::Geometry(geojson::Geometry::new(geojson::Value::from(geometry))).to_string()
}

/// A point stored in the R-tree, pointing back into [`PointIndex::items`].
struct PointEntry {
    coords: [f64; 2],
    slot: usize,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

/// R-tree over point-located items for fast "which items fall inside this
/// polygon" queries.
pub struct PointIndex<T> {
    tree: RTree<PointEntry>,
    items: Vec<T>,
}

impl<T> PointIndex<T> {
    /// Bulk-loads the index from `(location, item)` pairs.
    #[must_use]
    pub fn new(entries: Vec<(Point<f64>, T)>) -> Self {
        let mut points = Vec::with_capacity(entries.len());
        let mut items = Vec::with_capacity(entries.len());

        for (slot, (point, item)) in entries.into_iter().enumerate() {
            points.push(PointEntry {
                coords: [point.x(), point.y()],
                slot,
            });
            items.push(item);
        }

        Self {
            tree: RTree::bulk_load(points),
            items,
        }
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items located inside `polygon`, in their original insertion order.
    #[must_use]
    pub fn within(&self, polygon: &MultiPolygon<f64>) -> Vec<&T> {
        let envelope = compute_envelope(polygon);

        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| polygon.contains(&Point::new(entry.coords[0], entry.coords[1])))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();

        log::trace!(
            "Point index matched {} of {} items",
            slots.len(),
            self.items.len()
        );

        slots.into_iter().map(|slot| &self.items[slot]).collect()
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use geo::{Rect, coord, line_string};

    use super::*;

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(
                coord! { x: min_x, y: min_y },
                coord! { x: min_x + size, y: min_y + size },
            )
            .to_polygon(),
        ])
    }

    #[test]
    fn area_in_sq_km() {
        let polygon = square(0.0, 0.0, 1000.0);
        assert!((area_sqkm(&polygon) - 1.0).abs() < 1e-9);
        assert!((area_sq_m(&polygon) - 1_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_area_of_offset_squares() {
        let a = square(0.0, 0.0, 100.0);
        let b = square(50.0, 50.0, 100.0);
        assert!((intersection_area(&a, &b) - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_squares_have_no_overlap() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(100.0, 100.0, 10.0);
        assert!(!intersects(&a, &b));
        assert!(intersection_area(&a, &b).abs() < f64::EPSILON);
    }

    #[test]
    fn centroid_of_square() {
        let c = centroid(&square(-10.0, -10.0, 20.0)).unwrap();
        assert!(c.x().abs() < 1e-9);
        assert!(c.y().abs() < 1e-9);
    }

    #[test]
    fn distance_is_planar_meters() {
        let d = planar_distance_m(Point::new(0.0, 0.0), Point::new(300.0, 400.0));
        assert!((d - 500.0).abs() < 1e-9);
        assert!((meters_to_km(d) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn buffered_line_reaches_nearby_square() {
        let river = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]);
        let nearby = square(0.0, 50.0, 100.0);
        let far = square(0.0, 400.0, 100.0);
        let zone = buffer(&river, 100.0);
        assert!(intersects(&zone, &nearby));
        assert!(!intersects(&zone, &far));
    }

    #[test]
    fn geojson_round_trip_polygon() {
        let polygon = square(0.0, 0.0, 10.0);
        let text = to_geojson_string(&Geometry::MultiPolygon(polygon.clone()));
        let parsed = parse_geojson_to_multipolygon(&text).unwrap();
        assert!((area_sq_m(&parsed) - area_sq_m(&polygon)).abs() < 1e-9);
    }

    #[test]
    fn geojson_polygon_is_promoted_to_multipolygon() {
        let text = r#"{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}"#;
        let parsed = parse_geojson_to_multipolygon(text).unwrap();
        assert_eq!(parsed.0.len(), 1);
    }

    #[test]
    fn invalid_geojson_is_none() {
        assert!(parse_geojson_geometry("not json").is_none());
        let point = r#"{"type":"Point","coordinates":[1,2]}"#;
        assert!(parse_geojson_to_multipolygon(point).is_none());
    }

    #[test]
    fn point_index_preserves_insertion_order() {
        let index = PointIndex::new(vec![
            (Point::new(5.0, 5.0), "first"),
            (Point::new(50.0, 50.0), "outside"),
            (Point::new(1.0, 1.0), "second"),
        ]);
        let hits = index.within(&square(0.0, 0.0, 10.0));
        assert_eq!(hits, vec![&"first", &"second"]);
        assert_eq!(index.len(), 3);
    }
}
