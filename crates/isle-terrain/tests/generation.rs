//! Whole-pipeline properties.

use std::collections::HashSet;

use isle_terrain::*;

fn params(size: Option<u32>, seed: f64) -> GenerationParams {
    GenerationParams {
        year: 2023,
        population_sizing: true,
        grid_size_override: size,
        seed: TerrainSeed(seed),
        enforce_ocean_quota: false,
        water_features: true,
        placement: PlacementMode::ExactCount,
    }
}

#[test]
fn test_every_coordinate_exactly_once() {
    for size in [Some(51), Some(141), None, Some(500)] {
        let out = run_generation(&params(size, 5.0)).unwrap();
        let grid = *out.assignment.grid();
        let n = grid.tile_count();
        assert_eq!(out.assignment.len(), n);

        let coords: HashSet<TileCoord> = out.assignment.iter().map(|(c, _)| c).collect();
        assert_eq!(coords.len(), n, "duplicate coordinates at N={}", grid.size());
        let h = grid.half_size();
        for x in [-h, 0, h] {
            for z in [-h, 0, h] {
                assert!(coords.contains(&TileCoord::new(x, z)));
            }
        }
    }
}

#[test]
fn test_clamp_extremes_produce_valid_grids() {
    for (requested, expected) in [(50, 51), (1, 51), (500, 501), (100_000, 501)] {
        let out = run_generation(&params(Some(requested), 1.0)).unwrap();
        assert_eq!(out.assignment.grid().size(), expected);
        assert_eq!(out.assignment.len(), (expected * expected) as usize);
    }
}

#[test]
fn test_identical_inputs_identical_assignments() {
    for placement in [PlacementMode::ExactCount, PlacementMode::Enforced] {
        let p = GenerationParams {
            placement,
            enforce_ocean_quota: true,
            ..params(Some(121), 314.0)
        };
        let a = run_generation(&p).unwrap();
        let b = run_generation(&p).unwrap();
        assert_eq!(a.assignment, b.assignment, "{placement:?} not deterministic");
        assert_eq!(a.report.digest, b.report.digest);
    }
}

#[test]
fn test_seed_changes_layout() {
    let a = run_generation(&params(Some(121), 1.0)).unwrap();
    let b = run_generation(&params(Some(121), 2.0)).unwrap();
    assert_ne!(a.report.digest, b.report.digest);
}

#[test]
fn test_exact_counts_without_overlay() {
    for enforce in [false, true] {
        let p = GenerationParams {
            water_features: false,
            enforce_ocean_quota: enforce,
            ..params(Some(141), 9.0)
        };
        let out = run_generation(&p).unwrap();
        for row in &out.report.rows {
            assert_eq!(
                row.actual, row.target,
                "{} placed {} of {}",
                row.biome, row.actual, row.target
            );
        }
        assert_eq!(out.quota_state.total_remaining(), 0);
    }
}

#[test]
fn test_overlay_reconciled_in_report() {
    let out = run_generation(&params(Some(141), 9.0)).unwrap();
    let report = &out.report;
    let gained = report.actual(BiomeType::Freshwater) - report.target(BiomeType::Freshwater);
    assert_eq!(gained as usize, report.water_converted);
    assert_eq!(
        report.actual(BiomeType::Saltwater),
        report.target(BiomeType::Saltwater),
        "overlay never touches the ocean"
    );
    let shortfall: i64 = report
        .rows
        .iter()
        .filter(|r| !r.biome.is_water())
        .map(|r| r.unfulfilled)
        .sum();
    assert_eq!(shortfall as usize, report.water_converted);
}

#[test]
fn test_fixed_51_scenario_ignores_year() {
    for year in [1800, 2023, 2200] {
        let p = GenerationParams {
            year,
            population_sizing: false,
            ..params(Some(51), 3.0)
        };
        let out = run_generation(&p).unwrap();
        assert_eq!(out.assignment.grid().size(), 51);
        assert_eq!(out.report.tile_count, 2601);
    }
}

#[test]
fn test_population_sizing_2023() {
    let out = run_generation(&params(None, 3.0)).unwrap();
    assert_eq!(out.assignment.grid().size(), 251);
}

#[test]
fn test_ocean_enforcement_ceiling() {
    for placement in [PlacementMode::ExactCount, PlacementMode::Enforced] {
        for size in [51, 141, 251] {
            let p = GenerationParams {
                enforce_ocean_quota: true,
                placement,
                ..params(Some(size), 77.0)
            };
            let out = run_generation(&p).unwrap();
            let ceiling = max_ocean_tiles(out.assignment.grid());
            assert_eq!(out.report.max_ocean_tiles, Some(ceiling));
            assert!(
                out.assignment.count(BiomeType::Saltwater) <= ceiling,
                "{placement:?} N={size} exceeds ocean ceiling"
            );
        }
    }
}

#[test]
fn test_absorber_deviation_bounded() {
    let out = run_generation(&GenerationParams {
        water_features: false,
        ..params(None, 1.0)
    })
    .unwrap();
    // Half a tile of rounding per non-absorber biome at most.
    assert!(out.report.absorber_deviation.abs() <= 7.0);
}

#[test]
fn test_anchor_population() {
    assert_eq!(population(2023), 8_045_311_447.0);
}

#[test]
fn test_generator_point_queries() {
    let generator = IslandGenerator::new();
    let out = generator.generate(params(Some(101), 8.0)).unwrap();
    for (coord, biome) in out.assignment.iter().step_by(97) {
        assert_eq!(generator.biome_at(coord.x, coord.z), Some(biome));
        assert_eq!(generator.elevation_at(coord.x, coord.z), Some(elevation_for(biome)));
    }
}

#[test]
fn test_png_written_to_disk() {
    let out = run_generation(&params(Some(51), 2.0)).unwrap();
    let image = render_assignment(&out.assignment, 2);
    let bytes = image.encode_png().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("island.png");
    std::fs::write(&path, &bytes).unwrap();
    let read_back = std::fs::read(&path).unwrap();
    assert_eq!(read_back, bytes);
    assert_eq!(&read_back[..4], b"\x89PNG");
}
