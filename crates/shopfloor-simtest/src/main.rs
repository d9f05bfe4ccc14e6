//! Shopfloor Headless Building Harness
//!
//! Drives building sessions against the placement engine and checks grid
//! invariants after every action. Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p shopfloor-simtest
//!   cargo run -p shopfloor-simtest -- --verbose --seed 7
//!   cargo run -p shopfloor-simtest -- --config shopfloor.json

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use shopfloor_core::grid::{footprint, GridBounds};
use shopfloor_core::prelude::*;
use shopfloor_core::states::BuildContext;

// ── Object catalog (same JSON the integration tests use) ────────────────
const CATALOG_JSON: &str = include_str!("../../../data/object_catalog.json");

const SESSIONS: u64 = 20;
const ACTIONS_PER_SESSION: usize = 400;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    config: BuildConfig,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        seed: 42,
        config: BuildConfig::default(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                options.seed = value
                    .parse()
                    .map_err(|e| format!("bad seed {:?}: {}", value, e))?;
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = BuildConfig::from_path(&path).map_err(|e| e.to_string())?;
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    let default_level = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    println!("=== Shopfloor Building Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog validation
    let catalog = match ObjectCatalog::from_json_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ catalog_parse: {}", e);
            std::process::exit(1);
        }
    };
    results.extend(validate_catalog(&catalog, options.verbose));

    // 2. Footprint geometry
    results.extend(validate_footprints(&options.config));

    // 3. Random sessions
    results.extend(validate_random_sessions(&options, &catalog));

    // 4. Edit cancellation
    results.extend(validate_edit_cancel(&options, &catalog));

    // 5. Save/load round trips
    results.extend(validate_persistence(&options, &catalog));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    if options.verbose {
        if let Ok(json) = serde_json::to_string_pretty(&results) {
            log::debug!("results: {}", json);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn new_system(config: &BuildConfig, catalog: &ObjectCatalog) -> (PlacementSystem, HeadlessPreview) {
    let preview = HeadlessPreview::new();
    let ctx = BuildContext::new(config, catalog.clone()).with_preview(preview.clone());
    (PlacementSystem::with_context(ctx, config.save_format), preview)
}

/// Every cross-structure invariant of a session, or the first one broken.
fn check_session(system: &PlacementSystem) -> Result<(), String> {
    let layers = system.layers();
    for layer in LayerId::ALL {
        layers
            .get(layer)
            .check_consistency()
            .map_err(|e| format!("{}: {}", layer, e))?;
    }

    let ctx = system.context();
    if ctx.scene.instance_count() != layers.placement_count() {
        return Err(format!(
            "{} instances for {} placements",
            ctx.scene.instance_count(),
            layers.placement_count()
        ));
    }

    // Every record has its own instance standing on its origin cell
    for layer in LayerId::ALL {
        for (_, record) in layers.get(layer).placements() {
            let Some(origin) = record.origin() else {
                return Err(format!("{}: {} has no cells", layer, record.unique_id));
            };
            let Some(entry) = ctx.catalog.get(record.type_code) else {
                continue;
            };
            let Some(entity) = ctx.scene.find_prefab_at(ctx.cell_to_world(origin), &entry.prefab) else {
                return Err(format!("{}: no {} instance at {}", record.unique_id, entry.prefab.0, origin));
            };
            let rotation = ctx.scene.transform(entity).map(|t| t.rotation_degrees);
            if rotation != Some(record.rotation_degrees) {
                return Err(format!(
                    "{}: instance rotation {:?}, record {}",
                    record.unique_id, rotation, record.rotation_degrees
                ));
            }
            if record.is_container() && ctx.scene.binding(entity).as_deref() != Some(record.unique_id.as_str()) {
                return Err(format!("{}: instance bound to {:?}", record.unique_id, ctx.scene.binding(entity)));
            }
        }
    }

    let containers: Vec<&str> = layers
        .furniture
        .placements()
        .filter(|(_, r)| r.is_container())
        .map(|(_, r)| r.unique_id.as_str())
        .collect();
    if ctx.scene.container_count() != containers.len() {
        return Err(format!(
            "{} bound instances for {} shelves",
            ctx.scene.container_count(),
            containers.len()
        ));
    }
    let stored = ctx.containers.snapshot().entries.len();
    if stored != containers.len() {
        return Err(format!("{} stored shelves for {} placed", stored, containers.len()));
    }
    if let Some(missing) = containers.iter().find(|id| ctx.containers.lookup(id).is_none()) {
        return Err(format!("shelf {} has no stored data", missing));
    }
    Ok(())
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &ObjectCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Object Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !catalog.is_empty(),
        detail: format!("{} object types loaded", catalog.len()),
    });

    let has_floor = catalog.contains(type_codes::FLOOR);
    let has_shelves = catalog.contains(type_codes::SHELF) && catalog.contains(type_codes::SHELF_WIDE);
    results.push(TestResult {
        name: "catalog_key_types".into(),
        passed: has_floor && has_shelves,
        detail: format!("floor={} shelves={}", has_floor, has_shelves),
    });

    let floor_is_single = catalog
        .get(type_codes::FLOOR)
        .map(|e| e.base_size == Size2::ONE)
        .unwrap_or(false);
    results.push(TestResult {
        name: "catalog_floor_is_1x1".into(),
        passed: floor_is_single,
        detail: "floor tiles cover one cell".into(),
    });

    let stale: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|e| e.current_size != e.base_size)
        .map(|e| e.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_sizes_reset".into(),
        passed: stale.is_empty(),
        detail: if stale.is_empty() {
            "current sizes start at base size".into()
        } else {
            format!("stale sizes: {}", stale.join(", "))
        },
    });

    if verbose {
        println!("  Catalog:");
        for e in catalog.entries() {
            println!(
                "    {:2} {:18} {}x{} {}",
                e.id,
                e.name,
                e.base_size.width,
                e.base_size.length,
                if type_codes::is_container(e.id) { "(shelf)" } else { "" }
            );
        }
    }

    results
}

// ── 2. Footprints ───────────────────────────────────────────────────────

fn validate_footprints(config: &BuildConfig) -> Vec<TestResult> {
    println!("--- Footprint Geometry ---");
    let mut results = Vec::new();
    let bounds = GridBounds::new(10, 10);
    let origin = Cell::ZERO;

    let planar = |cells: Vec<Cell>| -> Vec<(i32, i32)> { cells.iter().map(|c| (c.x, c.z)).collect() };

    let table = [
        (Size2::new(1, 2), 0, vec![(0, 0), (0, 1)]),
        (Size2::new(1, 2), 270, vec![(0, 0), (0, 1)]),
        (Size2::new(1, 2), 90, vec![(0, 0), (0, -1)]),
        (Size2::new(1, 2), 180, vec![(0, 0), (0, 1)]),
        (Size2::new(2, 1), 180, vec![(0, 0), (-1, 0)]),
    ];
    for (size, rotation, expected) in table {
        let got = planar(footprint(bounds, origin, size, rotation));
        results.push(TestResult {
            name: format!("footprint_{}x{}_rot{}", size.width, size.length, rotation),
            passed: got == expected,
            detail: format!("{:?}", got),
        });
    }

    let edge = footprint(bounds, Cell::new(4, 0), Size2::new(2, 1), 0);
    results.push(TestResult {
        name: "footprint_out_of_bounds_empty".into(),
        passed: edge.is_empty(),
        detail: format!("anchor (4,0) 2x1 gives {} cells", edge.len()),
    });

    // Area holds everywhere the footprint is valid
    let wide = GridBounds::new(config.grid_width, config.grid_length);
    let mut checked = 0;
    let mut wrong = 0;
    for x in -wide.width / 2..(wide.width + 1) / 2 {
        for z in -wide.length / 2..(wide.length + 1) / 2 {
            for rotation in [0, 90, 180, 270] {
                for size in [Size2::new(1, 1), Size2::new(2, 1), Size2::new(1, 2), Size2::new(2, 2)] {
                    let cells = footprint(wide, Cell::new(x, z), size, rotation);
                    if cells.is_empty() {
                        continue;
                    }
                    checked += 1;
                    if cells.len() as i32 != size.area() || cells[0] != Cell::new(x, z) {
                        wrong += 1;
                    }
                }
            }
        }
    }
    results.push(TestResult {
        name: "footprint_area_and_origin".into(),
        passed: wrong == 0 && checked > 0,
        detail: format!("{} valid footprints checked, {} wrong", checked, wrong),
    });

    results
}

// ── 3. Random sessions ──────────────────────────────────────────────────

fn random_cell(rng: &mut StdRng, config: &BuildConfig) -> Cell {
    // One cell of margin past each edge so out-of-bounds input is exercised
    let half_w = config.grid_width / 2 + 1;
    let half_l = config.grid_length / 2 + 1;
    Cell::new(rng.gen_range(-half_w..half_w), rng.gen_range(-half_l..half_l))
}

fn random_action(
    system: &mut PlacementSystem,
    rng: &mut StdRng,
    config: &BuildConfig,
    type_ids: &[i32],
) -> Result<String, PlacementError> {
    let roll = rng.gen_range(0..100);
    let action = if roll < 8 {
        let type_code = type_ids[rng.gen_range(0..type_ids.len())];
        system.enter_place(type_code)?;
        format!("enter_place({})", type_code)
    } else if roll < 12 {
        system.enter_remove()?;
        "enter_remove".to_string()
    } else if roll < 17 {
        system.enter_edit()?;
        "enter_edit".to_string()
    } else if roll < 20 {
        system.exit()?;
        "exit".to_string()
    } else if roll < 55 {
        let cell = random_cell(rng, config);
        system.hover(cell);
        format!("hover{}", cell)
    } else if roll < 65 {
        let delta = rng.gen_range(-1..=1);
        system.rotate(delta);
        format!("rotate({})", delta)
    } else {
        let cell = random_cell(rng, config);
        system.hover(cell);
        let changed = system.confirm(cell)?;
        format!("confirm{} -> {:?}", cell, changed)
    };
    Ok(action)
}

fn validate_random_sessions(options: &Options, catalog: &ObjectCatalog) -> Vec<TestResult> {
    println!("--- Random Sessions ---");
    let mut results = Vec::new();
    let type_ids: Vec<i32> = catalog.entries().iter().map(|e| e.id).collect();

    let mut total_actions = 0;
    let mut max_placements = 0;
    for session in 0..SESSIONS {
        let seed = options.seed.wrapping_add(session);
        let mut rng = StdRng::seed_from_u64(seed);
        // Odd sessions run on half-size cells so neighbours sit under one world unit apart
        let mut config = options.config.clone();
        if session % 2 == 1 {
            config.cell_size /= 2.0;
        }
        let (mut system, _) = new_system(&config, catalog);

        let mut failure = None;
        for step in 0..ACTIONS_PER_SESSION {
            let action = match random_action(&mut system, &mut rng, &config, &type_ids) {
                Ok(a) => a,
                Err(e) => {
                    failure = Some(format!("step {}: {}", step, e));
                    break;
                }
            };
            if let Err(e) = check_session(&system) {
                failure = Some(format!("step {} after {}: {}", step, action, e));
                break;
            }
            total_actions += 1;
        }
        if failure.is_none() {
            if let Err(e) = system.exit().map_err(|e| e.to_string()).and_then(|_| check_session(&system)) {
                failure = Some(format!("final exit: {}", e));
            }
        }
        max_placements = max_placements.max(system.layers().placement_count());
        system.log_grids();

        results.push(TestResult {
            name: format!("session_seed_{}_cell_{}", seed, config.cell_size),
            passed: failure.is_none(),
            detail: failure.unwrap_or_else(|| {
                format!(
                    "{} actions, {} placements at end",
                    ACTIONS_PER_SESSION,
                    system.layers().placement_count()
                )
            }),
        });
    }

    results.push(TestResult {
        name: "sessions_did_work".into(),
        passed: max_placements > 0,
        detail: format!("{} actions, up to {} placements", total_actions, max_placements),
    });

    results
}

// ── 4. Edit cancellation ────────────────────────────────────────────────

fn furnished_system(options: &Options, catalog: &ObjectCatalog) -> PlacementSystem {
    let (mut system, _) = new_system(&options.config, catalog);
    let mut rng = StdRng::seed_from_u64(options.seed);
    let furniture: Vec<i32> = catalog
        .entries()
        .iter()
        .map(|e| e.id)
        .filter(|id| *id != type_codes::FLOOR)
        .collect();
    if furniture.is_empty() {
        return system;
    }
    for _ in 0..60 {
        let type_code = furniture[rng.gen_range(0..furniture.len())];
        if system.enter_place(type_code).is_err() {
            continue;
        }
        for _ in 0..rng.gen_range(0..4) {
            system.rotate(-1);
        }
        let cell = random_cell(&mut rng, &options.config);
        system.hover(cell);
        let _ = system.confirm(cell);
    }
    let _ = system.exit();
    system
}

fn validate_edit_cancel(options: &Options, catalog: &ObjectCatalog) -> Vec<TestResult> {
    println!("--- Edit Cancellation ---");
    let mut results = Vec::new();
    let mut system = furnished_system(options, catalog);

    let originals: Vec<PlacementRecord> = system
        .layers()
        .furniture
        .placements()
        .map(|(_, r)| r.clone())
        .collect();

    let mut restored = 0;
    let mut problems = Vec::new();
    for record in &originals {
        let Some(origin) = record.origin() else {
            continue;
        };
        let pick = *record.occupied_cells.last().unwrap_or(&origin);
        let outcome = system
            .enter_edit()
            .and_then(|_| system.confirm(pick))
            .and_then(|_| {
                system.rotate(-1);
                system.hover(Cell::new(options.config.grid_width, 0));
                system.exit()
            });
        match outcome {
            Ok(_) => {}
            Err(e) => {
                problems.push(format!("{}: {}", record.unique_id, e));
                continue;
            }
        }
        if system.layers().furniture.record_at(origin) == Some(record) {
            restored += 1;
        } else {
            problems.push(format!("{} not restored", record.unique_id));
        }
    }
    results.push(TestResult {
        name: "edit_cancel_restores".into(),
        passed: problems.is_empty() && restored == originals.len(),
        detail: if problems.is_empty() {
            format!("{}/{} objects restored", restored, originals.len())
        } else {
            problems.join("; ")
        },
    });

    results.push(TestResult {
        name: "edit_cancel_consistent".into(),
        passed: check_session(&system).is_ok(),
        detail: check_session(&system)
            .err()
            .unwrap_or_else(|| "grid and scene agree".into()),
    });

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(options: &Options, catalog: &ObjectCatalog) -> Vec<TestResult> {
    println!("--- Save/Load ---");
    let mut results = Vec::new();
    let mut system = furnished_system(options, catalog);
    for (_, record) in system.layers().furniture.placements() {
        log::debug!("saving {}", record.unique_id);
    }
    let shelf_ids: Vec<String> = system
        .layers()
        .furniture
        .placements()
        .filter(|(_, r)| r.is_container())
        .map(|(_, r)| r.unique_id.clone())
        .collect();
    for (i, id) in shelf_ids.iter().enumerate() {
        system
            .context_mut()
            .containers
            .rebuild(id, ShelfData::new().with_item(i as i32, 0));
    }

    for format in [SaveFormat::Json, SaveFormat::Binary] {
        let mut buffer = Vec::new();
        if let Err(e) = system.save_to(&mut buffer, format) {
            results.push(TestResult {
                name: format!("save_{:?}", format).to_lowercase(),
                passed: false,
                detail: e.to_string(),
            });
            continue;
        }

        let (mut loaded, _) = new_system(&options.config, catalog);
        if let Err(e) = loaded.load_from(&buffer[..], format) {
            results.push(TestResult {
                name: format!("load_{:?}", format).to_lowercase(),
                passed: false,
                detail: e.to_string(),
            });
            continue;
        }

        let mut mismatches = 0;
        let half_w = options.config.grid_width / 2;
        let half_l = options.config.grid_length / 2;
        for layer in LayerId::ALL {
            let a = system.layers().get(layer);
            let b = loaded.layers().get(layer);
            for x in -half_w..half_w {
                for z in -half_l..half_l {
                    let cell = Cell::new(x, z);
                    if a.record_at(cell) != b.record_at(cell) {
                        mismatches += 1;
                    }
                }
            }
        }
        results.push(TestResult {
            name: format!("roundtrip_{:?}_grids", format).to_lowercase(),
            passed: mismatches == 0,
            detail: format!(
                "{} bytes, {} placements, {} mismatched cells",
                buffer.len(),
                loaded.layers().placement_count(),
                mismatches
            ),
        });

        let shelves_ok = shelf_ids.iter().enumerate().all(|(i, id)| {
            loaded.context().containers.lookup(id) == Some(ShelfData::new().with_item(i as i32, 0))
        });
        results.push(TestResult {
            name: format!("roundtrip_{:?}_shelves", format).to_lowercase(),
            passed: shelves_ok,
            detail: format!("{} shelves carried over", shelf_ids.len()),
        });

        results.push(TestResult {
            name: format!("roundtrip_{:?}_scene", format).to_lowercase(),
            passed: check_session(&loaded).is_ok(),
            detail: format!("{} instances respawned", loaded.context().scene.instance_count()),
        });
    }

    results
}
