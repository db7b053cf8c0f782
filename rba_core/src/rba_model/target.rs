//! This module provides production targets driving resource allocation

use derive_builder::Builder;

/// What quantity a [`Target`] constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A required concentration of a species, diluted by growth
    /// (contributes `growth_rate * value` to the species demand)
    Concentration,
    /// A required net production flux of a species
    ProductionFlux,
    /// A required flux through a named reaction
    ReactionFlux,
}

/// A single production requirement
///
/// `value` pins the requirement to one expression; combining it with explicit
/// bounds is rejected during validation.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Target {
    /// Which quantity is constrained, see [`TargetKind`]
    pub kind: TargetKind,
    /// Id of the species or reaction the target applies to
    pub reference: String,
    /// Parameter id fixing the requirement exactly
    #[builder(default = "None")]
    pub value: Option<String>,
    /// Parameter id of the requirement lower bound
    #[builder(default = "None")]
    pub lower_bound: Option<String>,
    /// Parameter id of the requirement upper bound
    #[builder(default = "None")]
    pub upper_bound: Option<String>,
}

/// A named group of production requirements
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroup {
    /// Used to identify the group (must be unique)
    pub id: String,
    /// Requirements in this group, in insertion order
    pub targets: Vec<Target>,
}

impl TargetGroup {
    pub fn new(id: &str) -> TargetGroup {
        TargetGroup {
            id: id.to_string(),
            targets: Vec::new(),
        }
    }

    /// Add a target to the group
    pub fn add_target(&mut self, target: Target) {
        self.targets.push(target);
    }
}
