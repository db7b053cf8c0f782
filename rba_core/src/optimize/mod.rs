//! Linear program representation and the feasibility oracle boundary

pub mod constraint;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;
