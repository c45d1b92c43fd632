//! Foot/metre conversions.
//!
//! The library works in SI units. Building-form defaults and the minimum
//! bar size are conventionally given in feet and converted here.

pub const M_PER_FT: f64 = 0.3048;

pub fn ft_to_m(ft: f64) -> f64 {
    ft * M_PER_FT
}

pub fn m_to_ft(m: f64) -> f64 {
    m / M_PER_FT
}

pub fn ft2_to_m2(ft2: f64) -> f64 {
    ft2 * M_PER_FT * M_PER_FT
}

pub fn m2_to_ft2(m2: f64) -> f64 {
    m2 / (M_PER_FT * M_PER_FT)
}
