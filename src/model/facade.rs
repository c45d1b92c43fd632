use crate::geom::normalize_degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compass orientation of a facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Buckets an absolute azimuth in degrees (clockwise from north).
    ///
    /// North is [315, 45), east [45, 135), south [135, 225), west [225, 315).
    pub fn from_azimuth(azimuth: f64) -> Self {
        // Rounded so that walls computed at 44.9999999 land in the same bucket as 45
        let az = (normalize_degrees(azimuth) * 1e5).round() / 1e5;
        if !(45.0..315.0).contains(&az) {
            Orientation::North
        } else if az < 135. {
            Orientation::East
        } else if az < 225. {
            Orientation::South
        } else {
            Orientation::West
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Orientation::North => Orientation::South,
            Orientation::East => Orientation::West,
            Orientation::South => Orientation::North,
            Orientation::West => Orientation::East,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::North => "North",
            Orientation::East => "East",
            Orientation::South => "South",
            Orientation::West => "West",
        };
        write!(f, "{s}")
    }
}

/// One flag per facade orientation (e.g. "this facade is a party wall").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FacadeFlags {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl FacadeFlags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn get(&self, o: Orientation) -> bool {
        match o {
            Orientation::North => self.north,
            Orientation::East => self.east,
            Orientation::South => self.south,
            Orientation::West => self.west,
        }
    }

    pub fn set(&mut self, o: Orientation, value: bool) {
        match o {
            Orientation::North => self.north = value,
            Orientation::East => self.east = value,
            Orientation::South => self.south = value,
            Orientation::West => self.west = value,
        }
    }

    pub fn with(mut self, o: Orientation) -> Self {
        self.set(o, true);
        self
    }

    pub fn any(&self) -> bool {
        self.north || self.east || self.south || self.west
    }

    pub fn orientations(&self) -> Vec<Orientation> {
        Orientation::ALL
            .into_iter()
            .filter(|o| self.get(*o))
            .collect()
    }
}

/// One ratio per facade orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacadeRatios {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl FacadeRatios {
    pub fn uniform(ratio: f64) -> Self {
        Self {
            north: ratio,
            east: ratio,
            south: ratio,
            west: ratio,
        }
    }

    pub fn get(&self, o: Orientation) -> f64 {
        match o {
            Orientation::North => self.north,
            Orientation::East => self.east,
            Orientation::South => self.south,
            Orientation::West => self.west,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.north, self.east, self.south, self.west]
    }
}
