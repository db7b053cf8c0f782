//! Data types making up a resource balance analysis model

pub mod density;
pub mod enzyme;
pub mod macromolecule;
pub mod medium;
pub mod model;
pub mod process;
pub mod reaction;
pub mod species;
pub mod target;
