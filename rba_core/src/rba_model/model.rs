//! This module provides the RbaModel struct for representing an entire resource
//! balance model

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use thiserror::Error;

use crate::params::{ParameterError, ParameterRegistry};
use crate::rba_model::density::DensityConstraint;
use crate::rba_model::enzyme::Enzyme;
use crate::rba_model::macromolecule::{Component, Macromolecule};
use crate::rba_model::process::Process;
use crate::rba_model::reaction::Reaction;
use crate::rba_model::species::Species;
use crate::rba_model::target::{Target, TargetGroup, TargetKind};

/// Represents a complete resource balance analysis model
///
/// The model is immutable for the duration of one growth-rate search; the
/// constraint compiler only reads it.
#[derive(Clone, Debug, Default)]
pub struct RbaModel {
    /// Map of species ids to Species objects
    pub species: IndexMap<String, Species>,
    /// Map of reaction ids to Reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of component ids to Component objects
    pub components: IndexMap<String, Component>,
    /// Map of macromolecule ids to Macromolecule objects
    pub macromolecules: IndexMap<String, Macromolecule>,
    /// Map of enzyme ids to Enzyme objects
    pub enzymes: IndexMap<String, Enzyme>,
    /// Map of process ids to Process objects
    pub processes: IndexMap<String, Process>,
    /// Map of compartment ids to their density constraints
    pub density_constraints: IndexMap<String, DensityConstraint>,
    /// Map of target group ids to TargetGroup objects
    pub targets: IndexMap<String, TargetGroup>,
    /// Registry of all named parameter functions and aggregates
    pub parameters: ParameterRegistry,
    /// Id associated with the model
    pub id: Option<String>,
}

impl RbaModel {
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Add a species to the model
    pub fn add_species(&mut self, species: Species) {
        let id = species.id.clone();
        self.species.insert(id, species);
    }

    /// Add a reaction to the model
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a component to the model
    pub fn add_component(&mut self, component: Component) {
        let id = component.id.clone();
        self.components.insert(id, component);
    }

    /// Add a macromolecule to the model
    pub fn add_macromolecule(&mut self, macromolecule: Macromolecule) {
        let id = macromolecule.id.clone();
        self.macromolecules.insert(id, macromolecule);
    }

    /// Add an enzyme to the model
    pub fn add_enzyme(&mut self, enzyme: Enzyme) {
        let id = enzyme.id.clone();
        self.enzymes.insert(id, enzyme);
    }

    /// Add a process to the model
    pub fn add_process(&mut self, process: Process) {
        let id = process.id.clone();
        self.processes.insert(id, process);
    }

    /// Add a density constraint to the model, keyed by compartment
    pub fn add_density_constraint(&mut self, constraint: DensityConstraint) {
        let compartment = constraint.compartment.clone();
        self.density_constraints.insert(compartment, constraint);
    }

    /// Add a target group to the model
    pub fn add_target_group(&mut self, group: TargetGroup) {
        let id = group.id.clone();
        self.targets.insert(id, group);
    }
}

// region Validation
impl RbaModel {
    /// Check the structural consistency of the model
    ///
    /// Every cross-reference must resolve, every parameter reference must be
    /// defined in the registry, the parameter reference graph must be acyclic,
    /// entity ids must not collide across the variable-bearing namespaces,
    /// stoichiometric coefficients and component weights must be positive, a
    /// fixed `value` must not be combined with explicit bounds, and species
    /// targets must not point at boundary species. Reactions without a
    /// catalyzing enzyme are reported as a warning but do not block solving.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.parameters.validate()?;
        self.check_variable_ids()?;
        self.check_reactions()?;
        self.check_macromolecules()?;
        self.check_enzymes()?;
        self.check_processes()?;
        self.check_density_constraints()?;
        self.check_targets()?;
        self.warn_uncatalyzed_reactions();
        Ok(())
    }

    fn check_parameter(&self, parameter: &str, used_by: &str) -> Result<(), ModelError> {
        self.parameters
            .get_by_id(parameter)
            .map(|_| ())
            .map_err(|_| ModelError::UndefinedParameter {
                parameter: parameter.to_string(),
                used_by: used_by.to_string(),
            })
    }

    /// Every reaction, macromolecule, enzyme, and process machine becomes one
    /// variable in the compiled problem, so their ids must be unique across all
    /// four namespaces, not just within each
    fn check_variable_ids(&self) -> Result<(), ModelError> {
        let entries = self
            .reactions
            .keys()
            .map(|id| (id.clone(), "reaction"))
            .chain(self.macromolecules.keys().map(|id| (id.clone(), "macromolecule")))
            .chain(self.enzymes.keys().map(|id| (id.clone(), "enzyme")))
            .chain(
                self.processes
                    .values()
                    .filter(|process| process.has_machinery())
                    .map(|process| (process.machinery_variable_id(), "process machinery")),
            );
        let mut seen: HashMap<String, &'static str> = HashMap::new();
        for (id, kind) in entries {
            if let Some(first) = seen.insert(id.clone(), kind) {
                return Err(ModelError::DuplicateVariableId {
                    id,
                    first: first.to_string(),
                    second: kind.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_reactions(&self) -> Result<(), ModelError> {
        for (id, reaction) in &self.reactions {
            for (species, coefficient) in reaction.reactants.iter().chain(&reaction.products) {
                if !self.species.contains_key(species) {
                    return Err(ModelError::UnknownSpecies {
                        owner: format!("reaction {id}"),
                        species: species.clone(),
                    });
                }
                if *coefficient <= 0.0 {
                    return Err(ModelError::NonPositiveCoefficient {
                        reaction: id.clone(),
                        species: species.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_macromolecules(&self) -> Result<(), ModelError> {
        for (id, component) in &self.components {
            if component.weight <= 0.0 {
                return Err(ModelError::NonPositiveWeight {
                    component: id.clone(),
                });
            }
        }
        for (id, macromolecule) in &self.macromolecules {
            for component in macromolecule.composition.keys() {
                if !self.components.contains_key(component) {
                    return Err(ModelError::UnknownComponent {
                        owner: format!("macromolecule {id}"),
                        component: component.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_enzymes(&self) -> Result<(), ModelError> {
        for (id, enzyme) in &self.enzymes {
            if !self.reactions.contains_key(&enzyme.reaction) {
                return Err(ModelError::UnknownReaction {
                    enzyme: id.clone(),
                    reaction: enzyme.reaction.clone(),
                });
            }
            self.check_parameter(&enzyme.forward_efficiency, &format!("enzyme {id}"))?;
            if let Some(backward) = &enzyme.backward_efficiency {
                self.check_parameter(backward, &format!("enzyme {id}"))?;
            }
            for macromolecule in enzyme.machinery.keys() {
                if !self.macromolecules.contains_key(macromolecule) {
                    return Err(ModelError::UnknownMacromolecule {
                        owner: format!("enzyme {id}"),
                        macromolecule: macromolecule.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_processes(&self) -> Result<(), ModelError> {
        for (id, process) in &self.processes {
            for macromolecule in process.machinery.keys() {
                if !self.macromolecules.contains_key(macromolecule) {
                    return Err(ModelError::UnknownMacromolecule {
                        owner: format!("process {id}"),
                        macromolecule: macromolecule.clone(),
                    });
                }
            }
            if let Some(capacity) = &process.capacity {
                self.check_parameter(capacity, &format!("process {id}"))?;
            }
            for (component, processing) in &process.processing {
                if !self.components.contains_key(component) {
                    return Err(ModelError::UnknownComponent {
                        owner: format!("process {id}"),
                        component: component.clone(),
                    });
                }
                for species in processing.reactants.keys().chain(processing.products.keys()) {
                    if !self.species.contains_key(species) {
                        return Err(ModelError::UnknownSpecies {
                            owner: format!("process {id}"),
                            species: species.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_density_constraints(&self) -> Result<(), ModelError> {
        for (compartment, constraint) in &self.density_constraints {
            if constraint.value.is_some()
                && (constraint.lower_bound.is_some() || constraint.upper_bound.is_some())
            {
                return Err(ModelError::ConflictingBounds {
                    owner: format!("density constraint on {compartment}"),
                });
            }
            for parameter in [
                &constraint.value,
                &constraint.lower_bound,
                &constraint.upper_bound,
            ]
            .into_iter()
            .flatten()
            {
                self.check_parameter(parameter, &format!("density constraint on {compartment}"))?;
            }
        }
        Ok(())
    }

    fn check_targets(&self) -> Result<(), ModelError> {
        for (group_id, group) in &self.targets {
            for target in &group.targets {
                self.check_target_reference(group_id, target)?;
                if target.value.is_some()
                    && (target.lower_bound.is_some() || target.upper_bound.is_some())
                {
                    return Err(ModelError::ConflictingBounds {
                        owner: format!("target {} in group {group_id}", target.reference),
                    });
                }
                for parameter in [&target.value, &target.lower_bound, &target.upper_bound]
                    .into_iter()
                    .flatten()
                {
                    self.check_parameter(
                        parameter,
                        &format!("target {} in group {group_id}", target.reference),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn check_target_reference(&self, group_id: &str, target: &Target) -> Result<(), ModelError> {
        let unknown = || ModelError::UnknownTargetReference {
            group: group_id.to_string(),
            reference: target.reference.clone(),
        };
        match target.kind {
            TargetKind::ReactionFlux => {
                if self.reactions.contains_key(&target.reference) {
                    Ok(())
                } else {
                    Err(unknown())
                }
            }
            TargetKind::Concentration | TargetKind::ProductionFlux => {
                let species = self.species.get(&target.reference).ok_or_else(unknown)?;
                // boundary species carry no balance row, so a demand on them
                // would never reach the compiled problem
                if species.boundary_condition {
                    return Err(ModelError::TargetOnBoundarySpecies {
                        group: group_id.to_string(),
                        species: target.reference.clone(),
                    });
                }
                Ok(())
            }
        }
    }

    fn warn_uncatalyzed_reactions(&self) {
        let catalyzed: HashSet<&String> =
            self.enzymes.values().map(|enzyme| &enzyme.reaction).collect();
        let unconstrained: Vec<&str> = self
            .reactions
            .keys()
            .filter(|id| !catalyzed.contains(id))
            .map(|id| id.as_str())
            .collect();
        if !unconstrained.is_empty() {
            log::warn!(
                "did not find enzymes for the following reactions: {}",
                unconstrained.join(", ")
            );
        }
    }
}
// endregion Validation

/// Errors describing an inconsistent model structure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// An enzyme catalyzes a reaction that is not part of the model
    #[error("enzyme {enzyme} catalyzes unknown reaction {reaction}")]
    UnknownReaction { enzyme: String, reaction: String },
    /// A reaction or process references a species that is not part of the model
    #[error("{owner} references unknown species {species}")]
    UnknownSpecies { owner: String, species: String },
    /// A macromolecule or process references a component that is not part of the model
    #[error("{owner} references unknown component {component}")]
    UnknownComponent { owner: String, component: String },
    /// An enzyme or process machinery references a macromolecule that is not part
    /// of the model
    #[error("{owner} references unknown macromolecule {macromolecule}")]
    UnknownMacromolecule {
        owner: String,
        macromolecule: String,
    },
    /// A target references a species or reaction that is not part of the model
    #[error("target in group {group} references unknown id {reference}")]
    UnknownTargetReference { group: String, reference: String },
    /// A species target points at a boundary species, whose concentration is
    /// fixed externally and cannot carry a production demand
    #[error("target in group {group} demands production of boundary species {species}")]
    TargetOnBoundarySpecies { group: String, species: String },
    /// Two model entities share an id and would collide in the compiled problem
    #[error("id {id} is used by both a {first} and a {second}")]
    DuplicateVariableId {
        id: String,
        first: String,
        second: String,
    },
    /// A parameter id was used but the registry does not define it
    #[error("parameter {parameter} used by {used_by} is not defined")]
    UndefinedParameter { parameter: String, used_by: String },
    /// A stoichiometric coefficient was zero or negative
    #[error("reaction {reaction} has a non-positive coefficient for {species}")]
    NonPositiveCoefficient { reaction: String, species: String },
    /// A component weight was zero or negative
    #[error("component {component} has a non-positive weight")]
    NonPositiveWeight { component: String },
    /// A fixed value was combined with explicit lower/upper bounds
    #[error("{owner} specifies both a fixed value and explicit bounds")]
    ConflictingBounds { owner: String },
    /// The parameter registry itself is inconsistent
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
