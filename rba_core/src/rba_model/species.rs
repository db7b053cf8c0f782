//! This module provides the Species struct, representing a chemical species

use derive_builder::Builder;

/// Represents a chemical species in the model
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Species {
    /// Used to identify the species (must be unique)
    pub id: String,
    /// Whether the species concentration is fixed externally by the medium
    ///
    /// Boundary species contribute no mass balance row; their concentration is
    /// read from the medium when parameter functions reference it.
    #[builder(default = "false")]
    pub boundary_condition: bool,
    /// Human readable name of the species
    #[builder(default = "None")]
    pub name: Option<String>,
}

impl Species {
    pub fn new(id: &str, boundary_condition: bool) -> Species {
        Species {
            id: id.to_string(),
            boundary_condition,
            name: None,
        }
    }
}
