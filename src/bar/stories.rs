//! Story stack of a bar: basements, ground, merged mid stories, top.
//!
//! A merged mid story stands for several identical floors. It is modeled at the
//! middle of the floors it represents, so it does not touch its neighbours and
//! their facing floors and ceilings end up adiabatic.

use crate::bar::config::StoryMultiplierMethod;
use crate::bar::spec::BarSpec;
use crate::diagnostics::{Diagnostics, Stage};
use crate::model::facade::FacadeFlags;
use crate::model::story::{StoryDescriptor, StoryRole};
use anyhow::{Result, anyhow};

/// One physical floor before merging.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FlatStory {
    role: StoryRole,
    party_walls: FacadeFlags,
    /// The floor right under a partial top floor.
    below_partial: bool,
    multiplier: u32,
}

impl FlatStory {
    fn merges_with(&self, other: &FlatStory) -> bool {
        self.role == StoryRole::Mid
            && other.role == StoryRole::Mid
            && self.party_walls == other.party_walls
            && self.below_partial == other.below_partial
    }
}

/// Builds the stories of `bar`, ordered by elevation.
pub fn build_story_stack(
    bar: &BarSpec,
    bar_index: usize,
    diag: &mut Diagnostics,
) -> Result<Vec<StoryDescriptor>> {
    let below = bar.num_stories_below_grade as usize;
    let above = bar.num_stories_above_grade;
    let above_ceil = above.ceil() as usize;
    let n = bar.num_floors();
    let partial_top = above_ceil as f64 > above;
    let h = bar.floor_height;
    let z0 = bar.center.z;

    let mut flat: Vec<FlatStory> = Vec::new();
    for i in 0..n {
        let role = if i < below {
            StoryRole::BelowGrade
        } else if i == below {
            StoryRole::Ground
        } else if i == n - 1 {
            StoryRole::Top
        } else {
            StoryRole::Mid
        };
        let story = FlatStory {
            role,
            party_walls: bar.party_walls.get(i).copied().unwrap_or_default(),
            below_partial: partial_top && n >= 2 && i == n - 2,
            multiplier: 1,
        };
        match flat.last_mut() {
            Some(last)
                if bar.story_multiplier_method != StoryMultiplierMethod::None
                    && last.merges_with(&story) =>
            {
                last.multiplier += 1;
            }
            _ => flat.push(story),
        }
    }

    let mut stories = Vec::new();
    // Basements, deepest first; flat basements are listed lowest first too
    for (i, fs) in flat.iter().take(below).enumerate() {
        let depth = below - i;
        stories.push(descriptor(
            bar,
            bar_index,
            format!("B{depth}"),
            fs,
            z0 - h * depth as f64,
        ));
    }

    let above_flat: Vec<&FlatStory> = flat.iter().skip(below).collect();
    let mut level = 1;
    for fs in above_flat {
        let z = match fs.role {
            StoryRole::Ground => z0,
            StoryRole::Top => z0 + h * (above_ceil - 1) as f64,
            _ => z0 + h * (level - 1) as f64 + h * (fs.multiplier - 1) as f64 / 2.,
        };
        let label = if fs.multiplier > 1 {
            format!("{}-{}", level, level + fs.multiplier as usize - 1)
        } else {
            format!("{level}")
        };
        stories.push(descriptor(bar, bar_index, label, fs, z));
        level += fs.multiplier as usize;
    }

    if let Some(last) = stories.last_mut() {
        if partial_top {
            last.area_scale = bar.top_area_scale();
        }
        last.adiabatic_roof = !bar.top_story_roof_exposed;
    }
    if let Some(first) = stories.first_mut() {
        first.adiabatic_floor = !bar.bottom_story_ground_exposed;
    }
    if let Some(m) = bar.multiplier_override {
        for s in stories.iter_mut() {
            s.multiplier = m;
        }
    }

    let above_sum: u32 = stories
        .iter()
        .filter(|s| s.is_above_grade())
        .map(|s| s.multiplier)
        .sum();
    if bar.multiplier_override.is_none() && above_sum as usize != above_ceil {
        return Err(anyhow!(
            "{}: story multipliers sum to {above_sum}, expected {above_ceil}",
            bar.name
        ));
    }

    diag.info(
        Stage::Stories,
        format!(
            "{}: {} floors modeled as {} stories",
            bar.name,
            n,
            stories.len()
        ),
    );
    Ok(stories)
}

fn descriptor(bar: &BarSpec, bar_index: usize, label: String, fs: &FlatStory, z: f64) -> StoryDescriptor {
    StoryDescriptor {
        id: format!("{} Story {label}", bar.name),
        bar: bar_index,
        role: fs.role,
        vertical_origin: z,
        height: bar.floor_height,
        multiplier: fs.multiplier,
        area_scale: 1.,
        party_walls: fs.party_walls,
        adiabatic_floor: false,
        adiabatic_roof: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::catalog::StaticCatalog;
    use crate::bar::config::MassingConfig;
    use crate::geom::IsClose;
    use crate::model::facade::Orientation;

    fn bar(config: MassingConfig) -> Result<BarSpec> {
        let mut diag = Diagnostics::new();
        let r = config
            .with_floor_height(3.)
            .resolve(&StaticCatalog::prototypes(), &mut diag)?;
        Ok(r.bars[0].clone())
    }

    fn roles(stories: &[StoryDescriptor]) -> Vec<(StoryRole, u32)> {
        stories.iter().map(|s| (s.role, s.multiplier)).collect()
    }

    #[test]
    fn test_five_stories() -> Result<()> {
        let bar = bar(MassingConfig::default().with_stories(5., 0))?;
        let stories = build_story_stack(&bar, 0, &mut Diagnostics::new())?;
        assert_eq!(
            roles(&stories),
            vec![
                (StoryRole::Ground, 1),
                (StoryRole::Mid, 3),
                (StoryRole::Top, 1)
            ]
        );
        assert!(stories[0].vertical_origin.is_close(0.));
        // Middle of floors 2-4
        assert!(stories[1].vertical_origin.is_close(6.));
        assert!(stories[2].vertical_origin.is_close(12.));
        assert_eq!(stories[1].id, "Primary Bar Story 2-4");
        Ok(())
    }

    #[test]
    fn test_no_merging() -> Result<()> {
        let bar = bar(MassingConfig::default()
            .with_stories(4., 0)
            .with_story_multiplier_method(StoryMultiplierMethod::None))?;
        let stories = build_story_stack(&bar, 0, &mut Diagnostics::new())?;
        assert_eq!(stories.len(), 4);
        for (i, s) in stories.iter().enumerate() {
            assert_eq!(s.multiplier, 1);
            assert!(s.vertical_origin.is_close(3. * i as f64));
        }
        Ok(())
    }

    #[test]
    fn test_basements_and_party_walls() -> Result<()> {
        let bar = bar(MassingConfig::default()
            .with_stories(6., 2)
            .with_party_wall_stories(3, 0, 0, 0))?;
        let stories = build_story_stack(&bar, 0, &mut Diagnostics::new())?;
        // B2, B1, ground, mid 2-3 (north party wall), mid 4-5, top
        assert_eq!(
            roles(&stories),
            vec![
                (StoryRole::BelowGrade, 1),
                (StoryRole::BelowGrade, 1),
                (StoryRole::Ground, 1),
                (StoryRole::Mid, 2),
                (StoryRole::Mid, 2),
                (StoryRole::Top, 1),
            ]
        );
        assert_eq!(stories[0].id, "Primary Bar Story B2");
        assert!(stories[0].vertical_origin.is_close(-6.));
        assert!(stories[1].vertical_origin.is_close(-3.));
        assert!(!stories[0].party_walls.any() && !stories[1].party_walls.any());
        assert!(stories[2].party_walls.get(Orientation::North));
        assert!(stories[3].party_walls.get(Orientation::North));
        assert!(!stories[4].party_walls.get(Orientation::North));
        let above: u32 = stories.iter().filter(|s| s.is_above_grade()).map(|s| s.multiplier).sum();
        assert_eq!(above, 6);
        Ok(())
    }

    #[test]
    fn test_partial_top() -> Result<()> {
        let bar = bar(MassingConfig::default().with_stories(3.5, 0))?;
        let stories = build_story_stack(&bar, 0, &mut Diagnostics::new())?;
        // Ground, mid 2, mid 3 (under the partial floor), partial top
        assert_eq!(
            roles(&stories),
            vec![
                (StoryRole::Ground, 1),
                (StoryRole::Mid, 1),
                (StoryRole::Mid, 1),
                (StoryRole::Top, 1),
            ]
        );
        let top = stories.last().unwrap();
        assert!(top.area_scale.is_close(0.5));
        assert!(top.vertical_origin.is_close(9.));
        Ok(())
    }

    #[test]
    fn test_exposure_flags() -> Result<()> {
        let bar = bar(MassingConfig::default()
            .with_stories(2., 0)
            .with_exposure(false, false))?;
        let stories = build_story_stack(&bar, 0, &mut Diagnostics::new())?;
        assert!(stories[0].adiabatic_floor && !stories[0].adiabatic_roof);
        assert!(stories[1].adiabatic_roof && !stories[1].adiabatic_floor);
        Ok(())
    }
}
