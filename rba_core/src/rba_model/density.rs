//! This module provides the DensityConstraint struct, bounding compartment volume

use derive_builder::Builder;

/// A bound on the total macromolecule volume within one compartment
///
/// All bounds are parameter references. `value` pins the volume to a single
/// expression; combining it with explicit bounds is rejected during validation.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct DensityConstraint {
    /// Compartment the constraint applies to
    pub compartment: String,
    /// Parameter id fixing the volume exactly
    #[builder(default = "None")]
    pub value: Option<String>,
    /// Parameter id of the volume lower bound
    #[builder(default = "None")]
    pub lower_bound: Option<String>,
    /// Parameter id of the volume upper bound
    #[builder(default = "None")]
    pub upper_bound: Option<String>,
}
