//! Growth-rate search over compiled constraint systems
//!
//! Feasibility of a resource balance model is monotone in the growth rate: every
//! bound tightens as the rate rises, so the feasible rates form an interval
//! starting at the minimum. The search probes the ends of the interval and then
//! bisects to the supremum.

use indexmap::IndexMap;
use thiserror::Error;

use crate::compiler::{CompileError, ConstraintCompiler};
use crate::configuration::CONFIGURATION;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{default_solver, FeasibilitySolver, SolverVerdict};
use crate::optimize::variable::VariableKind;
use crate::rba_model::medium::Medium;
use crate::rba_model::model::{ModelError, RbaModel};

/// Settings controlling one growth-rate search
///
/// The defaults are read from the global [`CONFIGURATION`] at the time the
/// settings are created.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Lowest growth rate considered, the floor of the bisection bracket
    pub growth_rate_min: f64,
    /// Highest growth rate considered, standing in for "unbounded"
    pub growth_rate_cap: f64,
    /// Relative bracket width at which the bisection stops
    pub tolerance: f64,
    /// Hard limit on bisection steps
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let configuration = CONFIGURATION.read().unwrap();
        SolverSettings {
            growth_rate_min: 0.0,
            growth_rate_cap: configuration.growth_rate_cap,
            tolerance: configuration.tolerance,
            max_iterations: configuration.max_bisection_iterations,
        }
    }
}

/// The cell state found at the maximal feasible growth rate
#[derive(Debug, Clone)]
pub struct RbaSolution {
    /// The largest growth rate found to be feasible
    pub growth_rate: f64,
    /// Whether the search ran into the growth rate cap while still feasible
    pub capped: bool,
    /// Flux through each reaction, keyed by reaction id
    pub reaction_fluxes: IndexMap<String, f64>,
    /// Concentration of each macromolecule, keyed by macromolecule id
    pub macromolecule_concentrations: IndexMap<String, f64>,
    /// Concentration of each enzyme, keyed by enzyme id
    pub enzyme_concentrations: IndexMap<String, f64>,
    /// Concentration of each process machine, keyed by process id
    pub process_machinery_concentrations: IndexMap<String, f64>,
}

impl RbaSolution {
    /// Split a solver verdict into per-entity value maps using the variable kinds
    /// recorded in the compiled problem
    fn from_verdict(
        growth_rate: f64,
        capped: bool,
        problem: &Problem,
        values: &IndexMap<String, f64>,
    ) -> Self {
        let mut solution = RbaSolution {
            growth_rate,
            capped,
            reaction_fluxes: IndexMap::new(),
            macromolecule_concentrations: IndexMap::new(),
            enzyme_concentrations: IndexMap::new(),
            process_machinery_concentrations: IndexMap::new(),
        };
        for (variable_id, variable) in problem.variables() {
            let value = values.get(variable_id).copied().unwrap_or(0.0);
            let (map, entity) = match &variable.kind {
                VariableKind::ReactionFlux(id) => (&mut solution.reaction_fluxes, id),
                VariableKind::MacromoleculeConcentration(id) => {
                    (&mut solution.macromolecule_concentrations, id)
                }
                VariableKind::EnzymeConcentration(id) => {
                    (&mut solution.enzyme_concentrations, id)
                }
                VariableKind::MachineryConcentration(id) => {
                    (&mut solution.process_machinery_concentrations, id)
                }
            };
            map.insert(entity.clone(), value);
        }
        solution
    }

    /// Fluxes of reactions touching a boundary species, the exchange of the cell
    /// with its environment, largest magnitude first
    pub fn exchange_fluxes(&self, model: &RbaModel) -> Vec<(String, f64)> {
        let mut fluxes: Vec<(String, f64)> = self
            .reaction_fluxes
            .iter()
            .filter(|(reaction_id, _)| {
                model.reactions.get(*reaction_id).is_some_and(|reaction| {
                    model
                        .species
                        .values()
                        .any(|species| species.boundary_condition && reaction.involves(&species.id))
                })
            })
            .map(|(id, flux)| (id.clone(), *flux))
            .collect();
        fluxes.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        fluxes
    }
}

/// Errors raised by the growth-rate search
#[derive(Error, Debug)]
pub enum SolveError {
    /// The model failed structural validation before any solving started
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A constraint system could not be compiled
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// Even the minimum growth rate is infeasible
    #[error("the model is infeasible at the minimum growth rate")]
    InfeasibleAtZero,
    /// The solver backend broke down at some growth rate; the bracket reached so
    /// far is preserved for diagnosis
    #[error(
        "solver failed at growth rate {growth_rate} \
         (bracket [{bracket_low}, {bracket_high}]): {message}"
    )]
    Solver {
        growth_rate: f64,
        bracket_low: f64,
        bracket_high: f64,
        message: String,
    },
}

impl RbaModel {
    /// Find the maximal feasible growth rate of this model in the given medium
    pub fn solve(&self, medium: &Medium) -> Result<RbaSolution, SolveError> {
        solve_with_settings(self, medium, SolverSettings::default())
    }
}

/// Run one growth-rate search with explicit settings
///
/// # Parameters
/// - `model`: The model to search, validated before any solving starts
/// - `medium`: External metabolite concentrations, fixed for the whole search
/// - `settings`: Bracket, tolerance, and iteration limits for the bisection
///
/// # Returns
/// The state at the largest feasible growth rate, or a [`SolveError`] when the
/// model is inconsistent, infeasible even at the minimum rate, or the backend
/// broke down
pub fn solve_with_settings(
    model: &RbaModel,
    medium: &Medium,
    settings: SolverSettings,
) -> Result<RbaSolution, SolveError> {
    model.validate()?;
    let compiler = ConstraintCompiler::new(model, medium);
    let solver = default_solver();

    let mut lower = settings.growth_rate_min;
    let mut upper = settings.growth_rate_cap;

    let floor = probe(&compiler, &solver, lower, lower, upper)?;
    let Some(floor) = floor else {
        return Err(SolveError::InfeasibleAtZero);
    };

    if let Some((problem, values)) = probe(&compiler, &solver, upper, lower, upper)? {
        log::warn!(
            "model is still feasible at the growth rate cap {}; reporting a capped result",
            settings.growth_rate_cap
        );
        return Ok(RbaSolution::from_verdict(
            settings.growth_rate_cap,
            true,
            &problem,
            &values,
        ));
    }

    // invariant: lower is feasible (with `best` its state), upper is infeasible
    let mut best = floor;
    for iteration in 0..settings.max_iterations {
        if upper - lower <= settings.tolerance * upper.max(1.0) {
            break;
        }
        let midpoint = 0.5 * (lower + upper);
        match probe(&compiler, &solver, midpoint, lower, upper)? {
            Some(state) => {
                best = state;
                lower = midpoint;
            }
            None => upper = midpoint,
        }
        log::debug!(
            "bisection step {iteration}: bracket [{lower}, {upper}] after probing {midpoint}"
        );
    }

    let (problem, values) = best;
    Ok(RbaSolution::from_verdict(lower, false, &problem, &values))
}

/// Check feasibility at one growth rate
///
/// Returns the compiled problem and the variable values when feasible, None when
/// proven infeasible, and an error when the backend could not decide. The bracket
/// reached so far is carried into the error for diagnostics.
fn probe(
    compiler: &ConstraintCompiler,
    solver: &impl FeasibilitySolver,
    growth_rate: f64,
    bracket_low: f64,
    bracket_high: f64,
) -> Result<Option<(Problem, IndexMap<String, f64>)>, SolveError> {
    let problem = compiler.compile(growth_rate)?;
    match solver.check(&problem) {
        SolverVerdict::Optimal {
            variable_values, ..
        } => Ok(Some((problem, variable_values))),
        SolverVerdict::Infeasible => Ok(None),
        SolverVerdict::Unbounded => Err(SolveError::Solver {
            growth_rate,
            bracket_low,
            bracket_high,
            message: "feasibility probe reported an unbounded objective".to_string(),
        }),
        SolverVerdict::NumericalError(message) => Err(SolveError::Solver {
            growth_rate,
            bracket_low,
            bracket_high,
            message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::microlp::MicrolpSolver;
    use crate::params::function::Function;
    use crate::rba_model::density::DensityConstraintBuilder;
    use crate::rba_model::enzyme::EnzymeBuilder;
    use crate::rba_model::macromolecule::{Component, MacromoleculeBuilder};
    use crate::rba_model::process::{ComponentProcessingBuilder, ProcessBuilder};
    use crate::rba_model::reaction::ReactionBuilder;
    use crate::rba_model::species::Species;
    use crate::rba_model::target::{TargetBuilder, TargetGroup, TargetKind};

    fn stoich(entries: &[(&str, f64)]) -> IndexMap<String, f64> {
        entries
            .iter()
            .map(|(id, coefficient)| (id.to_string(), *coefficient))
            .collect()
    }

    fn add_protein(model: &mut RbaModel, id: &str) {
        model.add_macromolecule(
            MacromoleculeBuilder::default()
                .id(id)
                .compartment("cytoplasm")
                .composition(stoich(&[("residue", 10.0)]))
                .build()
                .unwrap(),
        );
    }

    fn add_enzyme(model: &mut RbaModel, reaction: &str, protein: &str, efficiency: &str) {
        model.add_enzyme(
            EnzymeBuilder::default()
                .id(format!("{reaction}_enzyme"))
                .reaction(reaction)
                .forward_efficiency(efficiency)
                .machinery(stoich(&[(protein, 1.0)]))
                .build()
                .unwrap(),
        );
    }

    /// A three-step chain from an external carbon source to biomass
    ///
    /// With every catalytic efficiency at 10, a cytoplasm density limit of 10, a
    /// required biomass flux of 1, and each enzyme protein costing 10 carbon to
    /// synthesize, the minimal protein budget works out to 0.3 / (1 - rate), so
    /// the maximal feasible growth rate is exactly 0.7.
    fn chain_model() -> RbaModel {
        let mut model = RbaModel::new_empty();
        model.add_species(Species::new("carbon_ext", true));
        model.add_species(Species::new("carbon", false));
        model.add_species(Species::new("precursor", false));

        model.add_reaction(
            ReactionBuilder::default()
                .id("transport")
                .reactants(stoich(&[("carbon_ext", 1.0)]))
                .products(stoich(&[("carbon", 1.0)]))
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("conversion")
                .reactants(stoich(&[("carbon", 1.0)]))
                .products(stoich(&[("precursor", 1.0)]))
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("biomass")
                .reactants(stoich(&[("precursor", 1.0)]))
                .build()
                .unwrap(),
        );

        model.add_component(Component::new("residue", 1.0));
        add_protein(&mut model, "transport_protein");
        add_protein(&mut model, "conversion_protein");
        add_protein(&mut model, "biomass_protein");

        model.parameters.add_function(Function::constant("k_cat", 10.0));
        add_enzyme(&mut model, "transport", "transport_protein", "k_cat");
        add_enzyme(&mut model, "conversion", "conversion_protein", "k_cat");
        add_enzyme(&mut model, "biomass", "biomass_protein", "k_cat");

        model.add_process(
            ProcessBuilder::default()
                .id("translation")
                .processing(IndexMap::from([(
                    "residue".to_string(),
                    ComponentProcessingBuilder::default()
                        .reactants(stoich(&[("carbon", 1.0)]))
                        .build()
                        .unwrap(),
                )]))
                .build()
                .unwrap(),
        );

        model
            .parameters
            .add_function(Function::constant("cytoplasm_density", 10.0));
        model.add_density_constraint(
            DensityConstraintBuilder::default()
                .compartment("cytoplasm")
                .upper_bound(Some("cytoplasm_density".to_string()))
                .build()
                .unwrap(),
        );

        model
            .parameters
            .add_function(Function::constant("biomass_flux", 1.0));
        let mut group = TargetGroup::new("growth");
        group.add_target(
            TargetBuilder::default()
                .kind(TargetKind::ReactionFlux)
                .reference("biomass")
                .value(Some("biomass_flux".to_string()))
                .build()
                .unwrap(),
        );
        model.add_target_group(group);

        model
    }

    fn set_density(model: &mut RbaModel, value: f64) {
        model
            .parameters
            .add_function(Function::constant("cytoplasm_density", value));
    }

    #[test]
    fn chain_model_reaches_its_analytic_optimum() {
        let model = chain_model();
        let solution = model.solve(&Medium::new()).unwrap();
        assert!(!solution.capped);
        assert!(
            (solution.growth_rate - 0.7).abs() < 1e-3,
            "expected a growth rate near 0.7, got {}",
            solution.growth_rate
        );
        // the state at the optimum is consistent with the fluxes it implies
        assert!((solution.reaction_fluxes["biomass"] - 1.0).abs() < 1e-6);
        assert!(solution.reaction_fluxes["transport"] > 1.0);
        let protein: f64 = solution.macromolecule_concentrations.values().sum();
        assert!(protein <= 1.0 + 1e-6);
    }

    #[test]
    fn tighter_density_lowers_the_growth_rate() {
        let mut model = chain_model();
        set_density(&mut model, 4.0);
        let solution = model.solve(&Medium::new()).unwrap();
        // protein budget 0.4 instead of 1.0 gives 0.3 / (1 - rate) <= 0.4
        assert!(
            (solution.growth_rate - 0.25).abs() < 1e-3,
            "expected a growth rate near 0.25, got {}",
            solution.growth_rate
        );
    }

    #[test]
    fn loose_density_moves_the_limit_to_dilution() {
        let mut model = chain_model();
        set_density(&mut model, 1e4);
        let solution = model.solve(&Medium::new()).unwrap();
        // protein demand diverges as the rate approaches 1
        assert!(!solution.capped);
        assert!((solution.growth_rate - 1.0).abs() < 1e-2);
    }

    #[test]
    fn faster_transport_raises_the_growth_rate() {
        let mut model = chain_model();
        model
            .parameters
            .add_function(Function::constant("transport_k_cat", 20.0));
        model.enzymes.get_mut("transport_enzyme").unwrap().forward_efficiency =
            "transport_k_cat".to_string();
        let solution = model.solve(&Medium::new()).unwrap();
        assert!(
            (solution.growth_rate - 1.5).abs() < 2e-3,
            "expected a growth rate near 1.5, got {}",
            solution.growth_rate
        );
    }

    #[test]
    fn model_without_demands_is_capped() {
        let mut model = chain_model();
        model.targets.clear();
        let solution = model.solve(&Medium::new()).unwrap();
        // the zero state is feasible at every rate, the cap is the only limit
        assert!(solution.capped);
        let cap = CONFIGURATION.read().unwrap().growth_rate_cap;
        assert!((solution.growth_rate - cap).abs() < 1e-12);
    }

    #[test]
    fn richer_medium_supports_faster_growth() {
        let mut model = chain_model();
        model
            .parameters
            .add_function(Function::michaelis_menten("import_rate", 20.0, 1.0).on_medium("carbon_ext"));
        model.enzymes.get_mut("transport_enzyme").unwrap().forward_efficiency =
            "import_rate".to_string();

        let mut rich = Medium::new();
        rich.set("carbon_ext", 100.0);
        let mut poor = Medium::new();
        poor.set("carbon_ext", 1.0);

        let fast = model.solve(&rich).unwrap().growth_rate;
        let slow = model.solve(&poor).unwrap().growth_rate;
        assert!(fast > slow);
        // at saturation the transporter approaches an efficiency of 20
        assert!((fast - 1.5).abs() < 0.05);
    }

    #[test]
    fn starved_medium_is_infeasible_at_zero() {
        let mut model = chain_model();
        model
            .parameters
            .add_function(Function::michaelis_menten("import_rate", 20.0, 1.0).on_medium("carbon_ext"));
        model.enzymes.get_mut("transport_enzyme").unwrap().forward_efficiency =
            "import_rate".to_string();
        // carbon_ext absent from the medium reads as 0, so transport cannot run
        let result = model.solve(&Medium::new());
        assert!(matches!(result, Err(SolveError::InfeasibleAtZero)));
    }

    #[test]
    fn machinery_capacity_slows_growth() {
        let mut model = chain_model();
        add_protein(&mut model, "ribosome");
        model
            .parameters
            .add_function(Function::constant("ribosome_rate", 10.0));
        let translation = model.processes.get_mut("translation").unwrap();
        translation.machinery = stoich(&[("ribosome", 1.0)]);
        translation.capacity = Some("ribosome_rate".to_string());

        let solution = model.solve(&Medium::new()).unwrap();
        assert!(solution.growth_rate > 0.0);
        assert!(
            solution.growth_rate < 0.7 - 1e-3,
            "machinery capacity should cost growth, got {}",
            solution.growth_rate
        );
        assert!(solution.process_machinery_concentrations["translation"] > 0.0);
    }

    #[test]
    fn feasibility_is_monotone_in_the_growth_rate() {
        let model = chain_model();
        let medium = Medium::new();
        let compiler = ConstraintCompiler::new(&model, &medium);
        for rate in [0.2, 0.5] {
            let problem = compiler.compile(rate).unwrap();
            assert!(
                MicrolpSolver.check(&problem).is_feasible(),
                "expected feasibility at {rate}"
            );
        }
        for rate in [0.8, 0.9] {
            let problem = compiler.compile(rate).unwrap();
            assert!(
                !MicrolpSolver.check(&problem).is_feasible(),
                "expected infeasibility at {rate}"
            );
        }
    }

    #[test]
    fn search_is_deterministic() {
        let model = chain_model();
        let first = model.solve(&Medium::new()).unwrap();
        let second = model.solve(&Medium::new()).unwrap();
        assert_eq!(first.growth_rate, second.growth_rate);
        assert_eq!(first.reaction_fluxes, second.reaction_fluxes);
    }

    #[test]
    fn exchange_fluxes_report_boundary_reactions_only() {
        let model = chain_model();
        let solution = model.solve(&Medium::new()).unwrap();
        let exchanges = solution.exchange_fluxes(&model);
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].0, "transport");
        assert!(exchanges[0].1 > 1.0);
    }

    #[test]
    fn invalid_model_fails_before_solving() {
        let mut model = chain_model();
        model.enzymes.get_mut("transport_enzyme").unwrap().forward_efficiency =
            "undefined".to_string();
        assert!(matches!(
            model.solve(&Medium::new()),
            Err(SolveError::Model(ModelError::UndefinedParameter { .. }))
        ));
    }

    #[test]
    fn target_on_boundary_species_does_not_solve() {
        let mut model = chain_model();
        model
            .parameters
            .add_function(Function::constant("external_demand", 5.0));
        let mut group = TargetGroup::new("impossible");
        group.add_target(
            TargetBuilder::default()
                .kind(TargetKind::ProductionFlux)
                .reference("carbon_ext")
                .value(Some("external_demand".to_string()))
                .build()
                .unwrap(),
        );
        model.add_target_group(group);
        // a boundary species has no balance row, so this demand could never bind
        assert!(matches!(
            model.solve(&Medium::new()),
            Err(SolveError::Model(ModelError::TargetOnBoundarySpecies { .. }))
        ));
    }

    struct BrokenSolver;

    impl FeasibilitySolver for BrokenSolver {
        fn check(&self, _problem: &Problem) -> SolverVerdict {
            SolverVerdict::NumericalError("singular basis".to_string())
        }
    }

    #[test]
    fn solver_failure_reports_the_refined_bracket() {
        let model = chain_model();
        let medium = Medium::new();
        let compiler = ConstraintCompiler::new(&model, &medium);
        let err = probe(&compiler, &BrokenSolver, 0.45, 0.4, 0.5).unwrap_err();
        match err {
            SolveError::Solver {
                growth_rate,
                bracket_low,
                bracket_high,
                message,
            } => {
                assert_eq!(growth_rate, 0.45);
                assert_eq!(bracket_low, 0.4);
                assert_eq!(bracket_high, 0.5);
                assert!(message.contains("singular"));
            }
            other => panic!("expected a solver failure, got {other:?}"),
        }
    }

    #[test]
    fn settings_override_the_cap() {
        let model = chain_model();
        let settings = SolverSettings {
            growth_rate_cap: 0.5,
            ..SolverSettings::default()
        };
        let solution = solve_with_settings(&model, &Medium::new(), settings).unwrap();
        // 0.5 is below the true optimum, so the search is capped there
        assert!(solution.capped);
        assert!((solution.growth_rate - 0.5).abs() < 1e-12);
    }
}
