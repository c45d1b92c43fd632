//! Building container - the top level of the model.

use crate::geom::TOLERANCE;
use crate::geom::point::Point;
use crate::model::boundary::{BoundaryCondition, SurfaceRef};
use crate::model::story::StoryDescriptor;
use crate::model::surface::Surface;
use crate::model::volume::ZoneVolume;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plan dimensions of one bar as built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSummary {
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub center: Point,
    pub floor_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    /// Clockwise rotation of the building's north axis, degrees.
    pub north_axis: f64,
    pub bars: Vec<BarSummary>,
    pub stories: Vec<StoryDescriptor>,
    pub volumes: Vec<ZoneVolume>,
    /// Area scale of the partial top story when the story count is fractional.
    pub partial_top_story: Option<f64>,
}

impl Building {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            north_axis: 0.,
            bars: Vec::new(),
            stories: Vec::new(),
            volumes: Vec::new(),
            partial_top_story: None,
        }
    }

    pub fn surface(&self, r: SurfaceRef) -> Option<&Surface> {
        self.volumes.get(r.volume)?.surfaces.get(r.surface)
    }

    pub fn surface_mut(&mut self, r: SurfaceRef) -> Option<&mut Surface> {
        self.volumes.get_mut(r.volume)?.surfaces.get_mut(r.surface)
    }

    /// All surfaces with their arena references.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceRef, &Surface)> {
        self.volumes.iter().enumerate().flat_map(|(vi, v)| {
            v.surfaces
                .iter()
                .enumerate()
                .map(move |(si, s)| (SurfaceRef::new(vi, si), s))
        })
    }

    /// Volumes belonging to the story at index `story`.
    pub fn story_volumes(&self, story: usize) -> impl Iterator<Item = (usize, &ZoneVolume)> {
        self.volumes
            .iter()
            .enumerate()
            .filter(move |(_, v)| v.story == story)
    }

    /// Indices of the stories of a bar, lowest first.
    pub fn bar_stories(&self, bar: usize) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.stories.len())
            .filter(|&i| self.stories[i].bar == bar)
            .collect();
        idx.sort_by(|a, b| {
            self.stories[*a]
                .vertical_origin
                .total_cmp(&self.stories[*b].vertical_origin)
        });
        idx
    }

    /// Total floor area including story multipliers.
    pub fn floor_area(&self) -> f64 {
        self.volumes
            .iter()
            .map(|v| v.floor_area() * v.multiplier as f64)
            .sum()
    }

    /// Floor area per space type including story multipliers.
    pub fn space_type_areas(&self) -> BTreeMap<String, f64> {
        let mut areas: BTreeMap<String, f64> = BTreeMap::new();
        for v in self.volumes.iter() {
            *areas.entry(v.space_type.clone()).or_default() += v.floor_area() * v.multiplier as f64;
        }
        areas
    }

    /// Volume indices grouped by HVAC zone name.
    pub fn hvac_zones(&self) -> BTreeMap<String, Vec<usize>> {
        let mut zones: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, v) in self.volumes.iter().enumerate() {
            zones.entry(v.hvac_zone.clone()).or_default().push(i);
        }
        zones
    }

    /// Checks model consistency:
    /// - multipliers are at least 1,
    /// - every volume points to an existing story,
    /// - every `InteriorShared` surface has a partner that points back,
    ///   and both polygons coincide under reversal.
    pub fn validate(&self) -> Result<()> {
        for s in self.stories.iter() {
            if s.multiplier < 1 {
                return Err(anyhow!("Story {} has multiplier {}", s.id, s.multiplier));
            }
        }
        for v in self.volumes.iter() {
            if v.story >= self.stories.len() {
                return Err(anyhow!("Volume {} refers to missing story {}", v.name, v.story));
            }
            if v.multiplier < 1 {
                return Err(anyhow!("Volume {} has multiplier {}", v.name, v.multiplier));
            }
        }
        for (r, s) in self.surfaces() {
            let BoundaryCondition::InteriorShared(p) = s.boundary else {
                continue;
            };
            let partner = self
                .surface(p)
                .ok_or_else(|| anyhow!("Surface {r} ({}) has missing partner {p}", s.name))?;
            if partner.boundary.partner() != Some(r) {
                return Err(anyhow!(
                    "Surface {r} ({}) points to {p} ({}), which points to {:?}",
                    s.name,
                    partner.name,
                    partner.boundary.partner()
                ));
            }
            if !s.polygon.is_coincident_reversed(&partner.polygon, TOLERANCE) {
                return Err(anyhow!(
                    "Surfaces {r} ({}) and {p} ({}) are not coincident",
                    s.name,
                    partner.name
                ));
            }
        }
        Ok(())
    }
}
