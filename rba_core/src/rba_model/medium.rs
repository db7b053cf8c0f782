//! This module provides the Medium struct, the external metabolite composition

use indexmap::IndexMap;

/// Concentrations of boundary metabolites in the growth medium
///
/// Concentrations are plain numbers (never growth-rate dependent); a metabolite
/// absent from the medium reads as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Medium {
    concentrations: IndexMap<String, f64>,
}

impl Medium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concentration of a metabolite in the medium
    pub fn set(&mut self, metabolite: &str, concentration: f64) {
        self.concentrations
            .insert(metabolite.to_string(), concentration);
    }

    /// Concentration of a metabolite, 0 if it is not part of the medium
    pub fn concentration(&self, metabolite: &str) -> f64 {
        self.concentrations.get(metabolite).copied().unwrap_or(0.0)
    }
}
