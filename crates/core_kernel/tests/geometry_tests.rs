//! Comprehensive unit tests for the Geometry module
//!
//! Covers GeoJSON serialization, structural validation, planar area and
//! centroid math, bounding-box prefiltering, and polygon overlap.

use core_kernel::{GeoPoint, Geometry, GeometryError};

/// Closed square ring anchored at (min_lon, min_lat)
fn square(min_lon: f64, min_lat: f64, side: f64) -> Geometry {
    Geometry::polygon(vec![
        GeoPoint::new(min_lon, min_lat),
        GeoPoint::new(min_lon + side, min_lat),
        GeoPoint::new(min_lon + side, min_lat + side),
        GeoPoint::new(min_lon, min_lat + side),
        GeoPoint::new(min_lon, min_lat),
    ])
}

mod serialization_tests {
    use super::*;

    #[test]
    fn test_polygon_serializes_as_geojson() {
        let parcel = square(77.0, 23.0, 0.01);
        let json = serde_json::to_value(&parcel).unwrap();
        assert_eq!(json["type"], "Polygon");
        let exterior = json["coordinates"][0].as_array().unwrap();
        assert_eq!(exterior.len(), 5);
        assert_eq!(exterior[0][0], 77.0);
        assert_eq!(exterior[0][1], 23.0);
    }

    #[test]
    fn test_point_serializes_as_geojson() {
        let point = Geometry::point(80.25, 18.5);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 80.25);
        assert_eq!(json["coordinates"][1], 18.5);
    }

    #[test]
    fn test_deserialize_geojson_polygon() {
        let json = r#"{
            "type": "Polygon",
            "coordinates": [[[77.0, 23.0], [77.1, 23.0], [77.1, 23.1], [77.0, 23.1], [77.0, 23.0]]]
        }"#;
        let parcel: Geometry = serde_json::from_str(json).unwrap();
        assert!(parcel.validate().is_ok());
        assert!(parcel.area() > 0.0);
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let json = r#"{"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}"#;
        let result: Result<Geometry, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip() {
        let original = square(-10.0, -10.0, 2.0);
        let json = serde_json::to_string(&original).unwrap();
        let back: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_polygon_passes() {
        assert!(square(77.0, 23.0, 0.5).validate().is_ok());
    }

    #[test]
    fn test_empty_polygon_fails() {
        let empty = Geometry::Polygon(vec![]);
        assert_eq!(empty.validate(), Err(GeometryError::EmptyPolygon));
    }

    #[test]
    fn test_triangle_without_closure_fails() {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(0.5, 1.0),
        ];
        assert_eq!(
            Geometry::polygon(ring).validate(),
            Err(GeometryError::RingTooShort(3))
        );
    }

    #[test]
    fn test_unclosed_ring_fails() {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 1.0),
        ];
        assert_eq!(
            Geometry::polygon(ring).validate(),
            Err(GeometryError::OpenRing)
        );
    }

    #[test]
    fn test_longitude_out_of_range_fails() {
        let point = Geometry::point(181.0, 0.0);
        assert!(matches!(
            point.validate(),
            Err(GeometryError::CoordinateOutOfRange {
                axis: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn test_nan_coordinate_fails() {
        let point = Geometry::point(f64::NAN, 0.0);
        assert!(point.validate().is_err());
    }

    #[test]
    fn test_hole_rings_are_validated_too() {
        let exterior = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(4.0, 0.0),
            GeoPoint::new(4.0, 4.0),
            GeoPoint::new(0.0, 4.0),
            GeoPoint::new(0.0, 0.0),
        ];
        let bad_hole = vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 1.0)];
        let geometry = Geometry::Polygon(vec![exterior, bad_hole]);
        assert_eq!(geometry.validate(), Err(GeometryError::RingTooShort(2)));
    }
}

mod area_tests {
    use super::*;

    #[test]
    fn test_point_has_zero_area() {
        assert_eq!(Geometry::point(1.0, 1.0).area(), 0.0);
    }

    #[test]
    fn test_square_area() {
        let sq = square(0.0, 0.0, 3.0);
        assert!((sq.area() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_is_winding_independent() {
        let ccw = square(0.0, 0.0, 2.0);
        let cw = Geometry::polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(2.0, 2.0),
            GeoPoint::new(2.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ]);
        assert!((ccw.area() - cw.area()).abs() < 1e-9);
    }

    #[test]
    fn test_hole_is_subtracted() {
        let exterior = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(4.0, 0.0),
            GeoPoint::new(4.0, 4.0),
            GeoPoint::new(0.0, 4.0),
            GeoPoint::new(0.0, 0.0),
        ];
        let hole = vec![
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(2.0, 1.0),
            GeoPoint::new(2.0, 2.0),
            GeoPoint::new(1.0, 2.0),
            GeoPoint::new(1.0, 1.0),
        ];
        let geometry = Geometry::Polygon(vec![exterior, hole]);
        assert!((geometry.area() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_ring_has_zero_area() {
        let line = Geometry::polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(2.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ]);
        assert_eq!(line.area(), 0.0);
    }
}

mod centroid_tests {
    use super::*;

    #[test]
    fn test_point_centroid_is_itself() {
        let centroid = Geometry::point(5.0, 7.0).centroid().unwrap();
        assert_eq!(centroid.lon(), 5.0);
        assert_eq!(centroid.lat(), 7.0);
    }

    #[test]
    fn test_square_centroid_is_center() {
        let centroid = square(0.0, 0.0, 2.0).centroid().unwrap();
        assert!((centroid.lon() - 1.0).abs() < 1e-9);
        assert!((centroid.lat() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polygon_has_no_centroid() {
        assert!(Geometry::Polygon(vec![]).centroid().is_none());
    }
}

mod bounding_box_tests {
    use super::*;

    #[test]
    fn test_bounding_box_of_square() {
        let bbox = square(1.0, 2.0, 3.0).bounding_box().unwrap();
        assert_eq!(bbox.min_lon, 1.0);
        assert_eq!(bbox.min_lat, 2.0);
        assert_eq!(bbox.max_lon, 4.0);
        assert_eq!(bbox.max_lat, 5.0);
    }

    #[test]
    fn test_point_bounding_box_is_degenerate() {
        let bbox = Geometry::point(3.0, 4.0).bounding_box().unwrap();
        assert_eq!(bbox.min_lon, bbox.max_lon);
        assert_eq!(bbox.min_lat, bbox.max_lat);
    }

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = square(0.0, 0.0, 2.0).bounding_box().unwrap();
        let b = square(1.0, 1.0, 2.0).bounding_box().unwrap();
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_disjoint_boxes_do_not_intersect() {
        let a = square(0.0, 0.0, 1.0).bounding_box().unwrap();
        let b = square(10.0, 10.0, 1.0).bounding_box().unwrap();
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = square(0.0, 0.0, 1.0).bounding_box().unwrap();
        let b = square(1.0, 0.0, 1.0).bounding_box().unwrap();
        assert!(a.intersects(&b));
    }
}

mod overlap_tests {
    use super::*;

    #[test]
    fn test_identical_squares_fully_overlap() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 0.0, 1.0);
        assert!((a.overlap_ratio(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_overlap() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.5, 1.0);
        assert!((a.intersection_area(&b) - 0.25).abs() < 1e-9);
        assert!((a.overlap_ratio(&b) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_is_relative_to_other_geometry() {
        // A small parcel entirely inside a large one covers 100% of the
        // small parcel but only a sliver of the large one.
        let large = square(0.0, 0.0, 10.0);
        let small = square(4.0, 4.0, 1.0);
        assert!((large.overlap_ratio(&small) - 1.0).abs() < 1e-9);
        assert!((small.overlap_ratio(&large) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_contained_square_intersection_is_inner_area() {
        let outer = square(0.0, 0.0, 4.0);
        let inner = square(1.0, 1.0, 2.0);
        assert!((outer.intersection_area(&inner) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_squares_have_zero_ratio() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(3.0, 3.0, 1.0);
        assert_eq!(a.overlap_ratio(&b), 0.0);
    }

    #[test]
    fn test_point_inside_parcel_counts_as_full_overlap() {
        let parcel = square(0.0, 0.0, 1.0);
        let point = Geometry::point(0.5, 0.5);
        assert_eq!(point.overlap_ratio(&parcel), 1.0);
        assert_eq!(parcel.overlap_ratio(&point), 1.0);
    }

    #[test]
    fn test_point_outside_parcel_has_zero_overlap() {
        let parcel = square(0.0, 0.0, 1.0);
        let point = Geometry::point(2.0, 2.0);
        assert_eq!(point.overlap_ratio(&parcel), 0.0);
    }

    #[test]
    fn test_clockwise_rings_clip_correctly() {
        // Winding order must not affect the clipping result
        let ccw = square(0.0, 0.0, 1.0);
        let cw = Geometry::polygon(vec![
            GeoPoint::new(0.5, 0.0),
            GeoPoint::new(0.5, 1.0),
            GeoPoint::new(1.5, 1.0),
            GeoPoint::new(1.5, 0.0),
            GeoPoint::new(0.5, 0.0),
        ]);
        assert!((ccw.intersection_area(&cw) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_contains_vertex_adjacent_regions() {
        let parcel = square(0.0, 0.0, 1.0);
        assert!(parcel.contains(GeoPoint::new(0.001, 0.001)));
        assert!(!parcel.contains(GeoPoint::new(-0.001, 0.5)));
    }
}
