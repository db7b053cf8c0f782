use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Upper limit placed on the growth rate search, standing in for "unbounded"
    pub growth_rate_cap: f64,
    /// Relative width of the bisection bracket at which the search stops
    pub tolerance: f64,
    /// Hard upper limit on bisection steps, guarantees termination
    pub max_bisection_iterations: u32,
    /// Magnitude bound placed on reaction flux variables
    pub flux_bound: f64,
    pub solver: Solver,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            growth_rate_cap: 2.5,
            tolerance: 1e-6,
            max_bisection_iterations: 50,
            flux_bound: f64::INFINITY,
            solver: Solver::Microlp,
        }
    }
}

/// Enum used to specify the default solver backend to use
pub enum Solver {
    /// Use the microlp pure-rust simplex solver
    Microlp,
}
