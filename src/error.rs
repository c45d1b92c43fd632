//! Typed errors for inputs that cannot produce any massing.
//!
//! They are raised inside `anyhow::Result` chains; callers that need to
//! distinguish them use `err.downcast_ref::<MassingError>()`.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MassingError {
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("{what} must not be negative, got {value}")]
    NegativeValue { what: &'static str, value: f64 },

    #[error("space-type area fractions sum to {0}, which is not positive")]
    FractionsSumNonPositive(f64),

    #[error("perimeter multiplier must be at least 1.0, got {0}")]
    PerimeterMultiplierBelowOne(f64),

    #[error("window-to-wall ratio must be within [0, 1), got {0}")]
    WindowToWallRatioOutOfRange(f64),

    #[error("{what} must be within [0, 1), got {value}")]
    FractionOutOfRange { what: &'static str, value: f64 },

    #[error("no rectangle has area {area} and perimeter {perimeter}")]
    InfeasiblePerimeter { area: f64, perimeter: f64 },

    #[error("no space types for building type '{0}'")]
    NoSpaceTypes(String),

    #[error("unknown building type '{0}' and no explicit aspect ratio or floor height")]
    UnknownBuildingType(String),

    #[error("reconciliation cancelled after {0} of {1} volumes")]
    Cancelled(usize, usize),
}
