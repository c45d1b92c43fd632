//! File I/O for massing configs and generated models.

pub mod json;

pub use json::{model_from_str, model_to_string, read_config, read_model, write_config, write_model};
