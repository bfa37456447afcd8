//! Variables module for the probe engine
//!
//! This module provides the variable scope shared between the steps of a
//! sequence and the loose value conversions used by substitution and
//! assertions.

pub mod manager;
pub mod value;

pub use manager::{canonical_name, VariableManager};
pub use value::{optional_value_to_string, to_number, value_to_string};
