//! This module provides the Enzyme struct, linking reactions to their machinery

use derive_builder::Builder;
use indexmap::IndexMap;

/// A catalytic unit sustaining the flux of one reaction
///
/// The flux the enzyme can carry is its concentration scaled by an efficiency
/// parameter; the concentration itself is limited by the macromolecule machinery
/// the enzyme is built from.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Enzyme {
    /// Used to identify the enzyme (must be unique)
    pub id: String,
    /// Id of the reaction this enzyme catalyzes
    pub reaction: String,
    /// Parameter id of the forward catalytic efficiency (never a literal number)
    pub forward_efficiency: String,
    /// Parameter id of the backward catalytic efficiency, for reversible reactions
    #[builder(default = "None")]
    pub backward_efficiency: Option<String>,
    /// Map of macromolecule ids to the count required per unit of enzyme
    #[builder(default = "IndexMap::new()")]
    pub machinery: IndexMap<String, f64>,
}
