//! Core rust implementation of rba_core, a crate for resource balance analysis (RBA)
//! of cell models.
//!
//! A resource balance analysis model couples metabolic stoichiometry, enzyme
//! capacities, macromolecule density limits, and production targets into a family of
//! linear programs indexed by the growth rate. The [`solver`] module locates the
//! largest growth rate at which that family stays feasible, compiling the model
//! through [`compiler`] and checking feasibility through [`optimize::solvers`].

pub mod compiler;
pub mod configuration;
pub mod optimize;
pub mod params;
pub mod rba_model;
pub mod solver;
