//! Compilation of an [`RbaModel`] into a linear program at a fixed growth rate
//!
//! Every numeric bound in the model is a parameter function of the growth rate, so
//! the constraint system must be rebuilt for each candidate rate. The compiler only
//! reads the model; each compiled [`Problem`] is transient and discarded after its
//! feasibility check.

use indexmap::IndexMap;
use thiserror::Error;

use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::variable::VariableKind;
use crate::params::ParameterError;
use crate::rba_model::macromolecule::Macromolecule;
use crate::rba_model::medium::Medium;
use crate::rba_model::model::{ModelError, RbaModel};
use crate::rba_model::process::Process;
use crate::rba_model::target::TargetKind;

/// Translates a model and medium into constraint systems, one per growth rate
pub struct ConstraintCompiler<'a> {
    model: &'a RbaModel,
    medium: &'a Medium,
}

impl<'a> ConstraintCompiler<'a> {
    pub fn new(model: &'a RbaModel, medium: &'a Medium) -> Self {
        ConstraintCompiler { model, medium }
    }

    /// Compile the full constraint system at the given growth rate
    pub fn compile(&self, growth_rate: f64) -> Result<Problem, CompileError> {
        let mut problem = Problem::new_maximization();
        self.add_variables(&mut problem)?;
        self.add_mass_balance_rows(&mut problem, growth_rate)?;
        self.add_enzyme_rows(&mut problem, growth_rate)?;
        self.add_density_rows(&mut problem, growth_rate)?;
        self.add_process_rows(&mut problem, growth_rate)?;
        self.add_target_rows(&mut problem, growth_rate)?;
        Ok(problem)
    }

    /// Evaluate a parameter reference at the current growth rate and medium
    fn evaluate(&self, parameter: &str, growth_rate: f64) -> Result<f64, CompileError> {
        Ok(self
            .model
            .parameters
            .evaluate(parameter, growth_rate, self.medium)?)
    }

    /// One flux variable per reaction and one concentration variable per
    /// macromolecule, enzyme, and machine-bearing process
    fn add_variables(&self, problem: &mut Problem) -> Result<(), CompileError> {
        for (id, reaction) in &self.model.reactions {
            let (lower, upper) = reaction.flux_bounds();
            problem.add_new_variable(id, VariableKind::ReactionFlux(id.clone()), lower, upper)?;
        }
        for id in self.model.macromolecules.keys() {
            problem.add_new_variable(
                id,
                VariableKind::MacromoleculeConcentration(id.clone()),
                0.0,
                f64::INFINITY,
            )?;
        }
        for id in self.model.enzymes.keys() {
            problem.add_new_variable(
                id,
                VariableKind::EnzymeConcentration(id.clone()),
                0.0,
                f64::INFINITY,
            )?;
        }
        for (id, process) in &self.model.processes {
            if process.has_machinery() {
                problem.add_new_variable(
                    &process.machinery_variable_id(),
                    VariableKind::MachineryConcentration(id.clone()),
                    0.0,
                    f64::INFINITY,
                )?;
            }
        }
        Ok(())
    }

    /// Net metabolite consumption per unit of each macromolecule produced
    ///
    /// Sums the assembly chemistry of every component over every process that
    /// defines a processing entry for it.
    fn synthesis_costs(&self) -> IndexMap<&'a String, IndexMap<&'a String, f64>> {
        let mut costs = IndexMap::new();
        for (macromolecule_id, macromolecule) in &self.model.macromolecules {
            let mut net: IndexMap<&String, f64> = IndexMap::new();
            for (component_id, count) in &macromolecule.composition {
                for process in self.model.processes.values() {
                    if let Some(processing) = process.processing.get(component_id) {
                        for (species, amount) in &processing.reactants {
                            *net.entry(species).or_insert(0.0) += count * amount;
                        }
                        for (species, amount) in &processing.products {
                            *net.entry(species).or_insert(0.0) -= count * amount;
                        }
                    }
                }
            }
            if !net.is_empty() {
                costs.insert(macromolecule_id, net);
            }
        }
        costs
    }

    /// Accumulated (lower, upper) production demand per species from all
    /// Concentration and ProductionFlux targets
    fn target_demands(
        &self,
        growth_rate: f64,
    ) -> Result<IndexMap<&'a String, (f64, f64)>, CompileError> {
        let mut demands: IndexMap<&String, (f64, f64)> = IndexMap::new();
        for group in self.model.targets.values() {
            for target in &group.targets {
                let scale = match target.kind {
                    // a required concentration is diluted by growth
                    TargetKind::Concentration => growth_rate,
                    TargetKind::ProductionFlux => 1.0,
                    TargetKind::ReactionFlux => continue,
                };
                let entry = demands.entry(&target.reference).or_insert((0.0, 0.0));
                if let Some(value) = &target.value {
                    let value = scale * self.evaluate(value, growth_rate)?;
                    entry.0 += value;
                    entry.1 += value;
                } else {
                    if let Some(lower) = &target.lower_bound {
                        entry.0 += scale * self.evaluate(lower, growth_rate)?;
                    }
                    match &target.upper_bound {
                        Some(upper) => entry.1 += scale * self.evaluate(upper, growth_rate)?,
                        None => entry.1 = f64::INFINITY,
                    }
                }
            }
        }
        Ok(demands)
    }

    /// Mass balance row per non-boundary species
    ///
    /// Reaction fluxes enter with their signed stoichiometry; macromolecule
    /// synthesis consumes metabolites at `growth_rate` times the per-unit cost; the
    /// right hand side is the accumulated target demand.
    fn add_mass_balance_rows(
        &self,
        problem: &mut Problem,
        growth_rate: f64,
    ) -> Result<(), CompileError> {
        let costs = self.synthesis_costs();
        let demands = self.target_demands(growth_rate)?;
        for (species_id, species) in &self.model.species {
            if species.boundary_condition {
                continue;
            }
            let mut terms: Vec<(&str, f64)> = Vec::new();
            for (reaction_id, reaction) in &self.model.reactions {
                let coefficient = reaction.stoichiometry_of(species_id);
                if coefficient != 0.0 {
                    terms.push((reaction_id.as_str(), coefficient));
                }
            }
            for (macromolecule_id, net) in &costs {
                if let Some(consumed) = net.get(species_id) {
                    if *consumed != 0.0 {
                        terms.push((macromolecule_id.as_str(), -growth_rate * consumed));
                    }
                }
            }
            let (lower, upper) = demands.get(species_id).copied().unwrap_or((0.0, 0.0));
            let row_id = format!("{species_id}_mass_balance");
            if lower == upper {
                problem.add_new_equality_constraint(&row_id, &terms, lower)?;
            } else {
                problem.add_new_inequality_constraint(&row_id, &terms, lower, upper)?;
            }
        }
        Ok(())
    }

    /// Capacity and machinery-linking rows per enzyme
    fn add_enzyme_rows(&self, problem: &mut Problem, growth_rate: f64) -> Result<(), CompileError> {
        for (enzyme_id, enzyme) in &self.model.enzymes {
            let reaction = self.model.reactions.get(&enzyme.reaction).ok_or_else(|| {
                ModelError::UnknownReaction {
                    enzyme: enzyme_id.clone(),
                    reaction: enzyme.reaction.clone(),
                }
            })?;
            let forward = self.evaluate(&enzyme.forward_efficiency, growth_rate)?;
            problem.add_new_inequality_constraint(
                &format!("{enzyme_id}_forward_capacity"),
                &[(enzyme.reaction.as_str(), 1.0), (enzyme_id.as_str(), -forward)],
                f64::NEG_INFINITY,
                0.0,
            )?;
            if reaction.reversible {
                if let Some(backward_parameter) = &enzyme.backward_efficiency {
                    let backward = self.evaluate(backward_parameter, growth_rate)?;
                    problem.add_new_inequality_constraint(
                        &format!("{enzyme_id}_backward_capacity"),
                        &[(enzyme.reaction.as_str(), -1.0), (enzyme_id.as_str(), -backward)],
                        f64::NEG_INFINITY,
                        0.0,
                    )?;
                }
            }
            // enzyme level is the min ratio over its machinery, one row per part
            for (macromolecule_id, count) in &enzyme.machinery {
                problem.add_new_inequality_constraint(
                    &format!("{enzyme_id}_machinery_{macromolecule_id}"),
                    &[(enzyme_id.as_str(), *count), (macromolecule_id.as_str(), -1.0)],
                    f64::NEG_INFINITY,
                    0.0,
                )?;
            }
        }
        Ok(())
    }

    /// Compartment volume row per density constraint
    fn add_density_rows(&self, problem: &mut Problem, growth_rate: f64) -> Result<(), CompileError> {
        for (compartment, constraint) in &self.model.density_constraints {
            let mut terms: Vec<(&str, f64)> = Vec::new();
            for (macromolecule_id, macromolecule) in &self.model.macromolecules {
                if macromolecule.compartment == *compartment {
                    let volume = macromolecule.volume(&self.model.components);
                    if volume != 0.0 {
                        terms.push((macromolecule_id.as_str(), volume));
                    }
                }
            }
            let row_id = format!("{compartment}_density");
            if let Some(value) = &constraint.value {
                let value = self.evaluate(value, growth_rate)?;
                problem.add_new_equality_constraint(&row_id, &terms, value)?;
            } else {
                let lower = match &constraint.lower_bound {
                    Some(parameter) => self.evaluate(parameter, growth_rate)?,
                    None => f64::NEG_INFINITY,
                };
                let upper = match &constraint.upper_bound {
                    Some(parameter) => self.evaluate(parameter, growth_rate)?,
                    None => f64::INFINITY,
                };
                problem.add_new_inequality_constraint(&row_id, &terms, lower, upper)?;
            }
        }
        Ok(())
    }

    /// Component throughput of a process against one macromolecule, weighted by
    /// machinery cost
    fn process_load(process: &Process, macromolecule: &Macromolecule) -> f64 {
        macromolecule
            .composition
            .iter()
            .filter_map(|(component_id, count)| {
                process
                    .processing
                    .get(component_id)
                    .map(|processing| processing.machinery_cost * count)
            })
            .sum()
    }

    /// Machinery-linking and capacity rows per machine-bearing process
    fn add_process_rows(&self, problem: &mut Problem, growth_rate: f64) -> Result<(), CompileError> {
        for (process_id, process) in &self.model.processes {
            if !process.has_machinery() {
                continue;
            }
            let machine = process.machinery_variable_id();
            for (macromolecule_id, count) in &process.machinery {
                problem.add_new_inequality_constraint(
                    &format!("{process_id}_machinery_{macromolecule_id}"),
                    &[(machine.as_str(), *count), (macromolecule_id.as_str(), -1.0)],
                    f64::NEG_INFINITY,
                    0.0,
                )?;
            }
            if let Some(capacity_parameter) = &process.capacity {
                let capacity = self.evaluate(capacity_parameter, growth_rate)?;
                let mut terms: Vec<(&str, f64)> = Vec::new();
                for (macromolecule_id, macromolecule) in &self.model.macromolecules {
                    let load = Self::process_load(process, macromolecule);
                    if load != 0.0 {
                        terms.push((macromolecule_id.as_str(), growth_rate * load));
                    }
                }
                terms.push((machine.as_str(), -capacity));
                problem.add_new_inequality_constraint(
                    &format!("{process_id}_capacity"),
                    &terms,
                    f64::NEG_INFINITY,
                    0.0,
                )?;
            }
        }
        Ok(())
    }

    /// Flux rows for reaction targets (species targets fold into mass balances)
    fn add_target_rows(&self, problem: &mut Problem, growth_rate: f64) -> Result<(), CompileError> {
        for (group_id, group) in &self.model.targets {
            for (index, target) in group.targets.iter().enumerate() {
                if target.kind != TargetKind::ReactionFlux {
                    continue;
                }
                let row_id = format!("{group_id}_{index}_{}_target", target.reference);
                let terms = [(target.reference.as_str(), 1.0)];
                if let Some(value) = &target.value {
                    let value = self.evaluate(value, growth_rate)?;
                    problem.add_new_equality_constraint(&row_id, &terms, value)?;
                } else {
                    let lower = match &target.lower_bound {
                        Some(parameter) => self.evaluate(parameter, growth_rate)?,
                        None => f64::NEG_INFINITY,
                    };
                    let upper = match &target.upper_bound {
                        Some(parameter) => self.evaluate(parameter, growth_rate)?,
                        None => f64::INFINITY,
                    };
                    problem.add_new_inequality_constraint(&row_id, &terms, lower, upper)?;
                }
            }
        }
        Ok(())
    }
}

/// Errors raised while compiling a model into a constraint system
///
/// All of these are configuration errors surfaced before any solver runs; they
/// abort the entire growth-rate search.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::constraint::Constraint;
    use crate::params::function::Function;
    use crate::rba_model::enzyme::EnzymeBuilder;
    use crate::rba_model::macromolecule::{Component, MacromoleculeBuilder};
    use crate::rba_model::reaction::ReactionBuilder;
    use crate::rba_model::species::Species;
    use crate::rba_model::target::{TargetBuilder, TargetGroup, TargetKind};
    use indexmap::IndexMap;

    fn stoich(entries: &[(&str, f64)]) -> IndexMap<String, f64> {
        entries
            .iter()
            .map(|(id, coefficient)| (id.to_string(), *coefficient))
            .collect()
    }

    fn two_species_model() -> RbaModel {
        let mut model = RbaModel::new_empty();
        model.add_species(Species::new("a", false));
        model.add_species(Species::new("b", false));
        model.add_reaction(
            ReactionBuilder::default()
                .id("conversion")
                .reactants(stoich(&[("a", 1.0)]))
                .products(stoich(&[("b", 1.0)]))
                .build()
                .unwrap(),
        );
        model.parameters.add_function(Function::constant("k", 10.0));
        model
    }

    #[test]
    fn mass_balance_rows_skip_boundary_species() {
        let mut model = two_species_model();
        model.add_species(Species::new("external", true));
        let medium = Medium::new();
        let problem = ConstraintCompiler::new(&model, &medium).compile(0.5).unwrap();
        assert!(problem.constraints().contains_key("a_mass_balance"));
        assert!(problem.constraints().contains_key("b_mass_balance"));
        assert!(!problem.constraints().contains_key("external_mass_balance"));
    }

    #[test]
    fn enzyme_capacity_uses_evaluated_efficiency() {
        let mut model = two_species_model();
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("conversion_enzyme")
                .reaction("conversion")
                .forward_efficiency("k")
                .build()
                .unwrap(),
        );
        let medium = Medium::new();
        let problem = ConstraintCompiler::new(&model, &medium).compile(0.5).unwrap();
        let row = problem
            .constraints()
            .get("conversion_enzyme_forward_capacity")
            .unwrap();
        // flux - 10 * enzyme <= 0
        assert_eq!(format!("{row}"), "-inf <= 1*conversion + -10*conversion_enzyme <= 0");
    }

    #[test]
    fn concentration_target_scales_demand_with_growth_rate() {
        let mut model = two_species_model();
        model.parameters.add_function(Function::constant("b_level", 2.0));
        let mut group = TargetGroup::new("maintenance");
        group.add_target(
            TargetBuilder::default()
                .kind(TargetKind::Concentration)
                .reference("b")
                .value(Some("b_level".to_string()))
                .build()
                .unwrap(),
        );
        model.add_target_group(group);
        let medium = Medium::new();
        let problem = ConstraintCompiler::new(&model, &medium).compile(0.5).unwrap();
        match problem.constraints().get("b_mass_balance").unwrap() {
            Constraint::Equality { equals, .. } => assert!((equals - 1.0).abs() < 1e-12),
            other => panic!("expected an equality balance, got {other}"),
        }
    }

    #[test]
    fn synthesis_cost_enters_balance_scaled_by_growth_rate() {
        use crate::rba_model::process::{ComponentProcessingBuilder, ProcessBuilder};
        let mut model = two_species_model();
        model.add_component(Component::new("residue", 1.0));
        model.add_macromolecule(
            MacromoleculeBuilder::default()
                .id("protein")
                .compartment("cytoplasm")
                .composition(stoich(&[("residue", 10.0)]))
                .build()
                .unwrap(),
        );
        model.add_process(
            ProcessBuilder::default()
                .id("translation")
                .processing(IndexMap::from([(
                    "residue".to_string(),
                    ComponentProcessingBuilder::default()
                        .reactants(stoich(&[("a", 1.0)]))
                        .build()
                        .unwrap(),
                )]))
                .build()
                .unwrap(),
        );
        let medium = Medium::new();
        let problem = ConstraintCompiler::new(&model, &medium).compile(0.5).unwrap();
        let row = problem.constraints().get("a_mass_balance").unwrap();
        // -1 from the conversion reaction, -0.5 * 10 residues from synthesis
        assert_eq!(format!("{row}"), "-1*conversion + -5*protein = 0");
    }

    #[test]
    fn undefined_parameter_aborts_compilation() {
        let mut model = two_species_model();
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("enzyme")
                .reaction("conversion")
                .forward_efficiency("missing_kcat")
                .build()
                .unwrap(),
        );
        let medium = Medium::new();
        let result = ConstraintCompiler::new(&model, &medium).compile(0.5);
        assert!(matches!(
            result,
            Err(CompileError::Parameter(ParameterError::UnknownReference(_)))
        ));
    }

    #[test]
    fn compilation_is_deterministic() {
        let mut model = two_species_model();
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("conversion_enzyme")
                .reaction("conversion")
                .forward_efficiency("k")
                .build()
                .unwrap(),
        );
        let medium = Medium::new();
        let compiler = ConstraintCompiler::new(&model, &medium);
        let first = compiler.compile(0.3).unwrap();
        let second = compiler.compile(0.3).unwrap();
        assert_eq!(first.num_variables(), second.num_variables());
        assert_eq!(first.num_constraints(), second.num_constraints());
        let render = |problem: &Problem| {
            problem
                .constraints()
                .iter()
                .map(|(id, constraint)| format!("{id}: {constraint}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(render(&first), render(&second));
    }
}
