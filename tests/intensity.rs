use std::io::Write;

use formintensity::{
    AreaRatio, BlocksCount, Count, Courtyards, Density, FailurePolicy, GeoTable, IndicatorSeries,
    IntensityConfig, IntensityError, NodeDensity, Reached, ReachedMode, SpatialWeights,
};
use geo::{line_string, point, polygon, Geometry, Rect};
use polars::df;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
    Rect::new((x0, y0), (x1, y1)).to_polygon().into()
}

/// A 3x1 strip of unit cells forming block "A", and a detached 2x2 cell forming block "B".
fn tessellation() -> GeoTable {
    let data = df!(
        "uID" => [1i64, 2, 3, 4],
        "bID" => ["A", "A", "A", "B"],
        "gfa" => [2.0, 4.0, 6.0, 8.0],
    ).unwrap();
    GeoTable::new(data, vec![
        rect(0.0, 0.0, 1.0, 1.0),
        rect(1.0, 0.0, 2.0, 1.0),
        rect(2.0, 0.0, 3.0, 1.0),
        rect(10.0, 10.0, 12.0, 12.0),
    ]).unwrap()
}

fn is_configuration_error(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<IntensityError>(), Some(IntensityError::Configuration(_)))
}

#[test]
fn aligned_indicators_preserve_row_count_and_order() {
    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();

    let results: Vec<IndicatorSeries> = vec![
        Density::new("gfa").compute(&cells, Some(&weights)).unwrap(),
        BlocksCount::new("bID").compute(&cells, Some(&weights)).unwrap(),
        Courtyards::new().compute(&cells, Some(&weights)).unwrap(),
        Count::new("bID", "bID").compute(&cells, &cells).unwrap(),
        Reached::new("uID", "uID").compute(&cells, &cells, Some(&weights)).unwrap(),
    ];
    for series in &results {
        assert!(series.is_aligned(cells.len()), "{} is not aligned", series.name());
    }

    let density = &results[0];
    assert_eq!(density.values(), &[3.0, 4.0, 5.0, 2.0]);
}

#[test]
fn higher_order_weights_widen_the_neighborhood() {
    let cells = tessellation();
    let weights = SpatialWeights::rook(cells.geometries()).unwrap().higher_order(2).unwrap();
    let density = Density::new("gfa").compute(&cells, Some(&weights)).unwrap();
    assert_eq!(density.values(), &[4.0, 4.0, 4.0, 2.0]);
}

#[test]
fn density_of_a_single_row() {
    let table = GeoTable::new(df!("v" => [10.0], "a" => [5.0]).unwrap(), vec![rect(0.0, 0.0, 1.0, 1.0)]).unwrap();
    let series = Density::new("v").with_areas("a").compute(&table, None).unwrap();
    assert_eq!(series.values(), &[2.0]);
}

#[test]
fn id_labelled_weights_align_by_unique_id() {
    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap()
        .with_ids([1i64, 2, 3, 4].map(|id| id.to_string()))
        .unwrap();

    let by_id = Density::new("gfa").with_unique_id("uID").compute(&cells, Some(&weights)).unwrap();
    assert_eq!(by_id.values(), &[3.0, 4.0, 5.0, 2.0]);

    let err = Density::new("gfa").compute(&cells, Some(&weights)).unwrap_err();
    assert!(is_configuration_error(&err));
}

#[test]
fn blocks_count_of_isolated_row_is_inverse_area() {
    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();
    let series = BlocksCount::new("bID").compute(&cells, Some(&weights)).unwrap();
    assert_eq!(series.get(3), Some(0.25));
    assert_eq!(series.get(0), Some(0.5));
}

#[test]
fn area_ratio_drops_unmatched_rows() {
    let plots = GeoTable::new(df!("uID" => [1i64, 2]).unwrap(), vec![rect(0.0, 0.0, 2.0, 2.0), rect(5.0, 5.0, 6.0, 6.0)]).unwrap();
    let buildings = GeoTable::new(df!("uID" => [1.0]).unwrap(), vec![rect(0.0, 0.0, 2.0, 2.0)]).unwrap();
    let ratio = AreaRatio::new(plots.areas(), buildings.areas())
        .with_unique_id("uID")
        .compute(&plots, &buildings).unwrap();
    assert_eq!(ratio.index(), &[0]);
    assert_eq!(ratio.values(), &[1.0]);

    let err = plots.clone().with_indicator(&ratio).unwrap_err();
    assert!(is_configuration_error(&err));
}

#[test]
fn count_weighted_by_area_and_rejecting_points() {
    let blocks = GeoTable::new(df!("bID" => ["A", "B"]).unwrap(), vec![rect(0.0, 0.0, 2.0, 2.0), rect(3.0, 0.0, 4.0, 1.0)]).unwrap();
    let buildings = GeoTable::new(
        df!("bID" => ["A", "A", "A"]).unwrap(),
        vec![Geometry::from(point!(x: 0.5, y: 0.5)); 3],
    ).unwrap();

    let unweighted = Count::new("bID", "bID").compute(&blocks, &buildings).unwrap();
    assert_eq!(unweighted.values(), &[3.0, 0.0]);

    let weighted = Count::new("bID", "bID").with_weighted(true).compute(&blocks, &buildings).unwrap();
    assert_eq!(weighted.values(), &[0.75, 0.0]);

    let err = Count::new("bID", "bID").with_weighted(true).compute(&buildings, &blocks).unwrap_err();
    assert!(matches!(err.downcast_ref::<IntensityError>(), Some(IntensityError::UnsupportedGeometry { .. })));
}

#[test]
fn reached_modes_over_street_network() {
    let streets = GeoTable::new(
        df!("nID" => [1i64, 2]).unwrap(),
        vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into(),
            line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)].into(),
        ],
    ).unwrap();
    let buildings = GeoTable::new(
        df!("nID" => [1i64, 1, 2], "height" => [10.0, 20.0, 30.0]).unwrap(),
        vec![rect(0.0, 1.0, 1.0, 2.0), rect(0.0, 1.0, 1.0, 2.0), rect(1.0, 1.0, 3.0, 2.0)],
    ).unwrap();

    let own = Reached::new("nID", "nID").compute(&streets, &buildings, None).unwrap();
    assert_eq!(own.values(), &[2.0, 1.0]);

    let weights = SpatialWeights::queen(streets.geometries()).unwrap();
    let mode: ReachedMode = "mean".parse().unwrap();
    let mean = Reached::new("nID", "nID").with_mode(mode).with_values("height")
        .compute(&streets, &buildings, Some(&weights)).unwrap();
    assert_eq!(mean.values(), &[20.0, 20.0]);

    let area = Reached::new("nID", "nID").with_mode(ReachedMode::Sum)
        .compute(&streets, &buildings, None).unwrap();
    assert_eq!(area.values(), &[2.0, 2.0]);
}

#[test]
fn node_density_guards_zero_length() {
    let nodes = GeoTable::from_geometries(vec![point!(x: 0.0, y: 0.0).into(), point!(x: 3.0, y: 4.0).into()]);
    let edges = GeoTable::new(
        df!("node_start" => [0i64], "node_end" => [1i64]).unwrap(),
        vec![line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)].into()],
    ).unwrap();

    let isolated = NodeDensity::new().compute(&nodes, &edges, None).unwrap();
    assert_eq!(isolated.values(), &[0.0, 0.0]);

    let weights = SpatialWeights::from_adjacency(&[vec![1], vec![0]]).unwrap();
    let connected = NodeDensity::new().compute(&nodes, &edges, Some(&weights)).unwrap();
    assert_eq!(connected.values(), &[0.4, 0.4]);
}

#[test]
fn courtyards_of_a_closed_ring() {
    let buildings = GeoTable::from_geometries(vec![
        rect(0.0, 0.0, 3.0, 1.0),
        rect(2.0, 1.0, 3.0, 2.0),
        polygon![
            (x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 2.0),
            (x: 3.0, y: 2.0), (x: 3.0, y: 3.0), (x: 0.0, y: 3.0),
        ].into(),
        rect(20.0, 0.0, 21.0, 1.0),
    ]);
    let series = Courtyards::new().compute(&buildings, None).unwrap();
    assert_eq!(series.values(), &[1.0, 1.0, 1.0, 0.0]);

    let table = buildings.with_indicator(&series).unwrap();
    assert_eq!(table.data().column("courtyards").unwrap().len(), 4);
}

#[test]
fn configuration_file_drives_indicators() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"parallel": true, "courtyards": {{"on_failure": "skip"}}}}"#).unwrap();
    let config = IntensityConfig::from_path(file.path()).unwrap();
    assert_eq!(config.courtyards.on_failure, FailurePolicy::Skip);

    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();
    let sequential = Density::new("gfa").compute(&cells, Some(&weights)).unwrap();
    let configured = Density::new("gfa").with_config(&config).compute(&cells, Some(&weights)).unwrap();
    assert_eq!(sequential, configured);

    let far_apart = GeoTable::from_geometries(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 6.0, 6.0)]);
    let forced = SpatialWeights::from_adjacency(&[vec![1], vec![0]]).unwrap();
    let skipped = Courtyards::new().with_config(&config).compute(&far_apart, Some(&forced)).unwrap();
    assert!(skipped.values().iter().all(|v| v.is_nan()));
}

#[test]
fn csv_attributes_pair_with_geometries() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "uID,bID,gfa\n1,A,2.0\n2,A,4.0\n3,A,6.0\n4,B,8.0").unwrap();
    let cells = GeoTable::read_csv(file.path(), tessellation().geometries().to_vec()).unwrap();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();
    let density = Density::new("gfa").compute(&cells, Some(&weights)).unwrap();
    assert_eq!(density.values(), &[3.0, 4.0, 5.0, 2.0]);
}

#[test]
fn repeated_runs_are_identical() {
    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();
    let blocks = BlocksCount::new("bID").with_weighted(false);
    assert_eq!(
        blocks.compute(&cells, Some(&weights)).unwrap(),
        blocks.compute(&cells, Some(&weights)).unwrap(),
    );
}

#[test]
fn repeated_runs_agree_for_joins_and_networks() {
    let plots = GeoTable::new(df!("uID" => [1i64, 2, 3]).unwrap(), vec![
        rect(0.0, 0.0, 3.0, 1.0), rect(3.0, 0.0, 4.0, 1.0), rect(4.0, 0.0, 7.0, 3.0),
    ]).unwrap();
    let buildings = GeoTable::new(
        df!("uID" => [1i64, 1, 3, 9], "h" => [1e16, 0.1, -1e16, 2.0]).unwrap(),
        vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0), rect(4.0, 0.0, 5.0, 1.0), rect(9.0, 9.0, 10.0, 10.0)],
    ).unwrap();
    let weights = SpatialWeights::queen(plots.geometries()).unwrap();

    let ratio = AreaRatio::new(plots.areas(), buildings.areas()).with_unique_id("uID");
    assert_eq!(ratio.compute(&plots, &buildings).unwrap(), ratio.compute(&plots, &buildings).unwrap());

    let count = Count::new("uID", "uID").with_weighted(true);
    assert_eq!(count.compute(&plots, &buildings).unwrap(), count.compute(&plots, &buildings).unwrap());

    for mode in [ReachedMode::Count, ReachedMode::Sum, ReachedMode::Mean, ReachedMode::Std] {
        let reached = Reached::new("uID", "uID").with_mode(mode).with_values("h");
        let first = reached.compute(&plots, &buildings, Some(&weights)).unwrap();
        for _ in 0..10 {
            assert_eq!(reached.compute(&plots, &buildings, Some(&weights)).unwrap(), first, "{mode} changed between runs");
        }
    }

    let nodes = GeoTable::from_geometries(vec![point!(x: 0.0, y: 0.0).into(), point!(x: 1.0, y: 0.0).into(), point!(x: 3.0, y: 0.0).into()]);
    let edges = GeoTable::new(
        df!("node_start" => [0i64, 1], "node_end" => [1i64, 2]).unwrap(),
        vec![line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into(), line_string![(x: 1.0, y: 0.0), (x: 3.0, y: 0.0)].into()],
    ).unwrap();
    let path = SpatialWeights::from_adjacency(&[vec![1], vec![0, 2], vec![1]]).unwrap();
    let density = NodeDensity::new();
    assert_eq!(
        density.compute(&nodes, &edges, Some(&path)).unwrap(),
        density.compute(&nodes, &edges, Some(&path)).unwrap(),
    );
}

#[test]
fn renamed_indicators_attach_side_by_side() {
    let cells = tessellation();
    let weights = SpatialWeights::queen(cells.geometries()).unwrap();
    let own = Density::new("gfa").compute(&cells, None).unwrap().with_name("density_own");
    let near = Density::new("gfa").compute(&cells, Some(&weights)).unwrap().with_name("density_near");
    assert_eq!(own.name(), "density_own");

    let cells = cells.with_indicator(&own).unwrap().with_indicator(&near).unwrap();
    assert!(cells.data().column("density_own").is_ok());
    assert!(cells.data().column("density_near").is_ok());
    assert!(cells.data().column("density").is_err());
}
