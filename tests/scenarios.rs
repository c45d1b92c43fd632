use anyhow::Result;
use massing3d::bar::decompose::BarLayout;
use massing3d::bar::dimensions::minimum_perimeter;
use massing3d::bar::fenestration::facade_areas;
use massing3d::geom::IsClose;
use massing3d::model::facade::Orientation;
use massing3d::model::story::StoryRole;
use massing3d::model::surface::{Surface, SurfaceKind};
use massing3d::model::volume::{Exposure, ZoneVolume};
use massing3d::units::{ft2_to_m2, m_to_ft};
use massing3d::{
    BoundaryCondition, Building, DivisionMethod, MassingConfig, MassingResult, Severity,
    StaticCatalog, create_bar_massing,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build(config: &MassingConfig) -> Result<MassingResult> {
    init_tracing();
    create_bar_massing(config, &StaticCatalog::prototypes())
}

/// Compass orientation of a wall.
fn facing(building: &Building, volume: &ZoneVolume, wall: &Surface) -> Option<Orientation> {
    let relative = wall.relative_azimuth()?;
    Some(Orientation::from_azimuth(
        relative + volume.direction_of_relative_north + building.north_axis,
    ))
}

fn assert_reciprocal(building: &Building) {
    for (r, s) in building.surfaces() {
        if let Some(partner) = s.boundary.partner() {
            let other = building.surface(partner).unwrap();
            assert_eq!(other.boundary, BoundaryCondition::InteriorShared(r), "{}", s.name);
            assert!(s.polygon.is_coincident_reversed(&other.polygon, 1e-6), "{}", s.name);
        }
    }
}

#[test]
fn test_single_story_rectangle() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(ft2_to_m2(10000.))
        .with_aspect_ratio(1.5)
        .with_perimeter_multiplier(1.)
        .with_stories(1., 0);
    let result = build(&config)?;

    let BarLayout::Single(dims) = result.resolved.layout else {
        panic!("expected a single bar, got {:?}", result.resolved.layout);
    };
    assert!(m_to_ft(dims.width).is_close_within(81.65, 0.01));
    assert!(m_to_ft(dims.length).is_close_within(122.47, 0.01));
    assert!(!result.diagnostics.has_errors());

    let b = &result.building;
    let h = result.resolved.floor_height;
    let areas = facade_areas(b);
    assert_eq!(areas.len(), 4);
    assert!(areas[&Orientation::North].0.is_close_within(dims.length * h, 1e-6));
    assert!(areas[&Orientation::East].0.is_close_within(dims.width * h, 1e-6));
    assert!(
        b.surfaces()
            .all(|(_, s)| s.boundary != BoundaryCondition::Adiabatic)
    );
    assert_eq!(result.validation.facade_areas_match, Some(true));
    assert_reciprocal(b);
    Ok(())
}

#[test]
fn test_five_stories_merge_mid_floors() -> Result<()> {
    // 10000 ft² per floor, large enough for perimeter zoning
    let config = MassingConfig::default()
        .with_total_floor_area(ft2_to_m2(50000.))
        .with_aspect_ratio(1.5)
        .with_perimeter_multiplier(1.)
        .with_stories(5., 0);
    let result = build(&config)?;
    let b = &result.building;

    let stack: Vec<(StoryRole, u32)> = b
        .bar_stories(0)
        .into_iter()
        .map(|i| (b.stories[i].role, b.stories[i].multiplier))
        .collect();
    assert_eq!(
        stack,
        vec![(StoryRole::Ground, 1), (StoryRole::Mid, 3), (StoryRole::Top, 1)]
    );

    let mid = b.bar_stories(0)[1];
    let walls: Vec<&Surface> = b
        .story_volumes(mid)
        .flat_map(|(_, v)| v.surfaces_of(SurfaceKind::Wall))
        .collect();
    assert!(walls.iter().any(|s| s.boundary.is_shared()));
    assert!(walls.iter().any(|s| s.boundary.is_exterior()));
    assert!(
        walls
            .iter()
            .all(|s| s.boundary.is_shared() || s.boundary.is_exterior())
    );

    assert!(b.floor_area().is_close_within(ft2_to_m2(50000.), ft2_to_m2(1.)));
    assert_eq!(result.validation.facade_areas_match, Some(true));
    assert!(!result.diagnostics.has_errors());
    assert_reciprocal(b);
    Ok(())
}

#[test]
fn test_high_perimeter_multiplier_on_small_footprint() -> Result<()> {
    let area = ft2_to_m2(1500.);
    let config = MassingConfig::default()
        .with_total_floor_area(area)
        .with_aspect_ratio(1.)
        .with_perimeter_multiplier(2.5)
        .with_stories(1., 0);
    let result = build(&config)?;

    let layout = result.resolved.layout;
    assert!(matches!(
        layout,
        BarLayout::Stretched(_) | BarLayout::DualBarAdiabaticEnds { .. }
    ));
    assert!(result.diagnostics.mentions(Severity::Warning, "stretched"));

    let bar = layout.primary();
    let target = 2.5 * minimum_perimeter(area, 1.)?;
    assert!(bar.perimeter().is_close_within(target, 1e-6 * target));
    assert!(
        result
            .building
            .floor_area()
            .is_close_within(area, ft2_to_m2(1.))
    );
    Ok(())
}

#[test]
fn test_per_story_two_space_types() -> Result<()> {
    let total = 3000.;
    let config = MassingConfig::default()
        .with_total_floor_area(total)
        .with_space_type("Office", 0.7)
        .with_space_type("Storage", 0.3)
        .with_division_method(DivisionMethod::PerStorySliced)
        .with_stories(3., 0);
    let result = build(&config)?;
    let b = &result.building;

    let footprint = total / 3.;
    for si in b.bar_stories(0) {
        let story_area: f64 = b.story_volumes(si).map(|(_, v)| v.floor_area()).sum();
        assert!(story_area.is_close_within(footprint, 1e-6));
    }
    let areas = b.space_type_areas();
    assert!(areas["Office"].is_close_within(0.7 * total, ft2_to_m2(1.)));
    assert!(areas["Storage"].is_close_within(0.3 * total, ft2_to_m2(1.)));
    assert!(result.validation.floor_areas_match);
    assert!(!result.diagnostics.has_errors());
    Ok(())
}

#[test]
fn test_party_walls_on_lower_north_facades() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(4000.)
        .with_stories(4., 0)
        .with_window_to_wall_ratio(0.3)
        .with_party_wall_stories(2, 0, 0, 0);
    let result = build(&config)?;
    let b = &result.building;

    let order = b.bar_stories(0);
    let multipliers: u32 = order.iter().map(|&i| b.stories[i].multiplier).sum();
    assert_eq!(multipliers, 4);

    let mut floor = 0;
    for &si in order.iter() {
        let north_walls: Vec<&Surface> = b
            .story_volumes(si)
            .flat_map(|(_, v)| {
                v.surfaces_of(SurfaceKind::Wall)
                    .filter(move |s| facing(b, v, s) == Some(Orientation::North))
                    .filter(|s| !s.boundary.is_shared())
            })
            .collect();
        assert!(!north_walls.is_empty());
        for s in north_walls {
            if floor < 2 {
                assert_eq!(s.boundary, BoundaryCondition::Adiabatic, "{}", s.name);
                assert!(s.window_area().is_close(0.));
            } else {
                assert_eq!(s.boundary, BoundaryCondition::Exterior, "{}", s.name);
                assert!((s.window_area() / s.area()).is_close_within(0.3, 1e-9));
            }
        }
        floor += b.stories[si].multiplier;
    }
    assert!(!result.diagnostics.has_errors());
    Ok(())
}

#[test]
fn test_dual_bar() -> Result<()> {
    let config = MassingConfig::default()
        .with_building_type("MediumOffice")
        .with_total_floor_area(10000.)
        .with_aspect_ratio(1.)
        .with_perimeter_multiplier(1.5)
        .with_stories(1., 0);
    let result = build(&config)?;

    assert!(matches!(result.resolved.layout, BarLayout::DualBar { .. }));
    assert_eq!(result.building.bars.len(), 2);
    assert!(
        result
            .building
            .floor_area()
            .is_close_within(10000., ft2_to_m2(1.))
    );
    // Bars are detached, so nothing is shared across them
    let b = &result.building;
    let bar_of = |volume: usize| b.stories[b.volumes[volume].story].bar;
    for (r, s) in b.surfaces() {
        if let Some(p) = s.boundary.partner() {
            assert_eq!(bar_of(r.volume), bar_of(p.volume), "{}", s.name);
        }
    }
    assert_eq!(result.validation.facade_areas_match, Some(true));
    assert!(!result.diagnostics.has_errors());
    Ok(())
}

#[test]
fn test_basement() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(3000.)
        .with_stories(2., 1)
        .with_window_to_wall_ratio(0.2);
    let result = build(&config)?;
    let b = &result.building;

    let order = b.bar_stories(0);
    let basement = order[0];
    assert_eq!(b.stories[basement].role, StoryRole::BelowGrade);
    assert!(b.stories[basement].vertical_origin < 0.);

    for (_, v) in b.story_volumes(basement) {
        for s in v.surfaces.iter() {
            match s.kind {
                SurfaceKind::Floor => assert_eq!(s.boundary, BoundaryCondition::Ground),
                SurfaceKind::Wall if !s.boundary.is_shared() => {
                    assert_eq!(s.boundary, BoundaryCondition::Ground);
                    assert!(s.windows.is_empty());
                }
                _ => {}
            }
        }
    }
    assert!(b.floor_area().is_close_within(3000., ft2_to_m2(1.)));
    assert!(result.validation.footprint_ok);
    assert!(!result.diagnostics.has_errors());
    Ok(())
}

#[test]
fn test_partial_top_story() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(2500.)
        .with_stories(2.5, 0);
    let result = build(&config)?;
    let b = &result.building;

    let top = *b.bar_stories(0).last().unwrap();
    assert!(b.stories[top].area_scale.is_close(0.5));
    assert!(b.partial_top_story.unwrap().is_close(0.5));
    assert!(b.floor_area().is_close_within(2500., ft2_to_m2(1.)));
    assert_eq!(result.validation.facade_areas_match, None);
    assert!(result.validation.footprint_ok);
    assert!(result.diagnostics.mentions(Severity::Info, "partial top story"));
    assert_reciprocal(b);
    Ok(())
}

#[test]
fn test_double_loaded_corridor() -> Result<()> {
    let config = MassingConfig::default()
        .with_building_type("MidriseApartment")
        .with_total_floor_area(3000.)
        .with_stories(4., 0);
    let result = build(&config)?;
    let b = &result.building;

    assert!(
        b.volumes
            .iter()
            .any(|v| v.exposure == Exposure::Corridor && v.space_type == "Corridor")
    );
    let areas = b.space_type_areas();
    for name in ["Apartment", "Corridor", "Office"] {
        let target = result.resolved.target_areas[name];
        assert!(areas[name].is_close_within(target, ft2_to_m2(1.)), "{name}");
    }
    assert!(result.validation.floor_areas_match);
    Ok(())
}

#[test]
fn test_party_wall_fraction() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(6000.)
        .with_stories(3., 0)
        .with_party_wall_fraction(0.3);
    let result = build(&config)?;

    let realized = result.validation.party_wall_fraction.unwrap();
    assert!(realized > 0. && realized < 1.);
    assert!(
        result
            .building
            .surfaces()
            .any(|(_, s)| s.is_wall() && s.boundary == BoundaryCondition::Adiabatic)
    );
    assert!(result.diagnostics.mentions(Severity::Info, "party wall fraction"));
    assert_eq!(result.validation.facade_areas_match, None);
    Ok(())
}

#[test]
fn test_party_walls_leave_basement_in_ground_contact() -> Result<()> {
    let config = MassingConfig::default()
        .with_total_floor_area(3000.)
        .with_stories(2., 1)
        .with_party_wall_stories(2, 0, 0, 0);
    let result = build(&config)?;
    let b = &result.building;

    let order = b.bar_stories(0);
    let basement = order[0];
    assert_eq!(b.stories[basement].role, StoryRole::BelowGrade);
    assert!(!b.stories[basement].party_walls.any());
    for (_, v) in b.story_volumes(basement) {
        for s in v.surfaces_of(SurfaceKind::Wall).filter(|s| !s.boundary.is_shared()) {
            assert_eq!(s.boundary, BoundaryCondition::Ground, "{}", s.name);
        }
    }

    // Both above-grade floors carry the north party wall, nothing else does
    for &si in order[1..].iter() {
        for (_, v) in b.story_volumes(si) {
            for s in v.surfaces_of(SurfaceKind::Wall).filter(|s| !s.boundary.is_shared()) {
                let expected = if facing(b, v, s) == Some(Orientation::North) {
                    BoundaryCondition::Adiabatic
                } else {
                    BoundaryCondition::Exterior
                };
                assert_eq!(s.boundary, expected, "{}", s.name);
            }
        }
    }
    assert!(!result.diagnostics.has_errors());
    Ok(())
}
