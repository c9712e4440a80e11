//! Mesh slicing, caching and layer production scenarios.

use gridslice::geometry::{Point2D, Point3D};
use gridslice::grid::BooleanGridList;
use gridslice::slice::{classify, cut_triangle, stitch_segments, SliceCache, SliceProvider};
use gridslice::{
    ExtruderSettings, InFillPatterns, LayerProducer, LayerRules, MeshObject, MeshPart,
    ObjectSlicer, PrintSettings, Triangle,
};

fn settings() -> PrintSettings {
    PrintSettings::default()
        .pixel_size(0.1)
        .extruders(vec![ExtruderSettings::new("PLA").surface_layers(1)])
}

#[test]
fn test_single_triangle_slice() {
    let t = Triangle::new(
        Point3D::new(0.0, 0.0, -1.0),
        Point3D::new(1.0, 0.0, 1.0),
        Point3D::new(0.0, 1.0, 1.0),
    );
    assert_eq!(classify(&t, 0.0), 1);
    let segment = cut_triangle(&t, 0.0, "PLA").unwrap().unwrap();
    assert!(segment.a.coincides_with(&Point2D::new(0.5, 0.0), 1e-12));
    assert!(segment.b.coincides_with(&Point2D::new(0.0, 0.5), 1e-12));
    assert_eq!(segment.material, "PLA");

    // Clear of the plane in either direction
    assert!(cut_triangle(&t, 2.0, "PLA").unwrap().is_none());
    assert!(cut_triangle(&t, -2.0, "PLA").unwrap().is_none());
}

#[test]
fn test_cuboid_cut_stitches_to_one_loop() {
    let part = MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(3.0, 2.0, 1.0));
    let edges = gridslice::slice::collect_edges(&part, 0.5).unwrap();
    assert_eq!(edges.len(), 8);
    let polygons = stitch_segments(&edges);
    assert_eq!(polygons.len(), 1);
    assert!(polygons[0].is_closed());
    assert!((polygons[0].area() - 6.0).abs() < 1e-9);
}

#[test]
fn test_cache_eviction_after_ring_size_plus_one() {
    let ring = 4;
    let mut cache = SliceCache::new(ring, 2);
    for layer in 0..=ring as i32 {
        cache.set_slice(BooleanGridList::new(), layer, 0);
    }
    assert!(cache.get_slice(0, 0).is_none());
    assert!(cache.get_slice(ring as i32, 0).is_some());

    // Rewriting a resident layer does not take another slot
    cache.set_support(BooleanGridList::new(), ring as i32, 1);
    assert!(cache.get_slice(1, 0).is_some());
    assert_eq!(cache.resident_layers(), ring);
}

/// Two pads 1mm high with a slab spanning them from z = 1 to 1.4.
fn bridge_model() -> Vec<MeshObject> {
    vec![MeshObject::new(
        "bridge",
        vec![
            MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(3.0, 4.0, 1.0)),
            MeshPart::cuboid("PLA", Point3D::new(7.0, 0.0, 0.0), Point3D::new(10.0, 4.0, 1.0)),
            MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 1.0), Point3D::new(10.0, 4.0, 1.4)),
        ],
    )]
}

#[test]
fn test_bridging_heuristic() {
    let settings = settings();
    let mut slicer = ObjectSlicer::new(bridge_model(), &settings).unwrap();
    assert_eq!(slicer.layer_count(), 7);
    let rules = LayerRules::new(&settings, slicer.layer_count(), 0.0);

    // Layer 5 is the first slab layer, z = 1.1
    let hatched = InFillPatterns::new(&settings)
        .compute_hatched_polygons(&mut slicer, 0, 5, &rules)
        .unwrap();
    assert_eq!(hatched.bridges.len(), 1);
    let bridge = &hatched.bridges[0];
    assert_eq!(bridge.lands, 2);

    // Centroid-to-centroid vector runs along x, so the strands do too
    assert!(bridge.angle.sin().abs() < 1e-6);
    assert!(!hatched.bridge_hatch.is_empty());
    for line in hatched.bridge_hatch.iter() {
        assert!((line.point(0).y - line.point(1).y).abs() < 1e-9);
    }

    // The footprint is removed from both insides and surfaces
    let centre = Point2D::new(5.0, 2.0);
    assert!(bridge.footprint.get_real(&centre));
    assert!(hatched.insides.iter().all(|g| !g.get_real(&centre)));
    assert!(hatched.surfaces.iter().all(|g| !g.get_real(&centre)));
    for g in hatched.insides.iter().chain(hatched.surfaces.iter()) {
        assert_eq!(g.intersection(&bridge.footprint).pixel_count(), 0);
    }

    // Nothing bridges on the pads themselves
    let pads = InFillPatterns::new(&settings)
        .compute_hatched_polygons(&mut slicer, 0, 2, &rules)
        .unwrap();
    assert!(pads.bridges.is_empty());
}

#[test]
fn test_end_to_end_cube() {
    let objects = vec![MeshObject::new(
        "cube",
        vec![MeshPart::cuboid(
            "PLA",
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(5.0, 5.0, 2.0),
        )],
    )];
    let settings = settings().raft_layers(1).shield(true).fill_density(0.25);
    let mut producer = LayerProducer::from_objects(objects, &settings).unwrap();
    let layers = producer.produce_all().unwrap();
    assert_eq!(layers.len(), 11);

    let raft = &layers[0];
    assert_eq!(raft.model_layer, -1);
    assert!(raft.perimeters.is_empty());
    assert!(!raft.infill.is_empty());

    for layer in &layers[1..] {
        // Two shells and the shield
        assert_eq!(layer.perimeters.len(), 3);
        assert!(!layer.infill.is_empty());
        assert!(layer.z > raft.z);
    }

    // Surface layers are hatched at extrusion width, the middle sparsely
    let bottom = layers[1].infill.length();
    let middle = layers[5].infill.length();
    assert!(bottom > 2.0 * middle);

    let json = serde_json::to_string(&layers[5]).unwrap();
    assert!(json.contains("\"perimeters\""));
}
