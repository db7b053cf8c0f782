//! This module provides the Function struct, a named growth-rate dependent parameter

use crate::rba_model::medium::Medium;

/// A named parameter function evaluated against the growth rate or a medium
/// concentration
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Used to identify the function (must be unique among functions and aggregates)
    pub id: String,
    /// Closed form of the function, see [`FunctionKind`]
    pub kind: FunctionKind,
    /// Which quantity the function is evaluated against, see [`FunctionVariable`]
    pub variable: FunctionVariable,
}

/// Closed forms a [`Function`] can take, each carrying its own coefficients
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    /// Returns `value` regardless of the argument
    Constant { value: f64 },
    /// Returns `intercept + slope * x`, with x clamped to `[x_min, x_max]` and the
    /// result clamped to `[y_min, y_max]`
    Linear {
        intercept: f64,
        slope: f64,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    /// Returns `exp(rate * x)`
    Exponential { rate: f64 },
    /// Returns `kmax * x / (km + x)`, and 0 when `x <= 0`
    MichaelisMenten { kmax: f64, km: f64 },
    /// Returns `constant / x`, and 0 when `x <= 0`
    Inverse { constant: f64 },
}

/// The quantity a [`Function`] is a function of
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FunctionVariable {
    /// The candidate growth rate currently being probed (the default)
    #[default]
    GrowthRate,
    /// The concentration of a named metabolite in the medium (0 if absent)
    MediumConcentration(String),
}

impl Function {
    /// Create a constant function
    pub fn constant(id: &str, value: f64) -> Self {
        Function {
            id: id.to_string(),
            kind: FunctionKind::Constant { value },
            variable: FunctionVariable::GrowthRate,
        }
    }

    /// Create a linear function without clamps
    pub fn linear(id: &str, intercept: f64, slope: f64) -> Self {
        Self::linear_clamped(
            id,
            intercept,
            slope,
            (f64::NEG_INFINITY, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY),
        )
    }

    /// Create a linear function with argument and value clamps
    pub fn linear_clamped(
        id: &str,
        intercept: f64,
        slope: f64,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> Self {
        Function {
            id: id.to_string(),
            kind: FunctionKind::Linear {
                intercept,
                slope,
                x_min: x_range.0,
                x_max: x_range.1,
                y_min: y_range.0,
                y_max: y_range.1,
            },
            variable: FunctionVariable::GrowthRate,
        }
    }

    /// Create an exponential function
    pub fn exponential(id: &str, rate: f64) -> Self {
        Function {
            id: id.to_string(),
            kind: FunctionKind::Exponential { rate },
            variable: FunctionVariable::GrowthRate,
        }
    }

    /// Create a Michaelis-Menten saturation function
    pub fn michaelis_menten(id: &str, kmax: f64, km: f64) -> Self {
        Function {
            id: id.to_string(),
            kind: FunctionKind::MichaelisMenten { kmax, km },
            variable: FunctionVariable::GrowthRate,
        }
    }

    /// Create an inverse function
    pub fn inverse(id: &str, constant: f64) -> Self {
        Function {
            id: id.to_string(),
            kind: FunctionKind::Inverse { constant },
            variable: FunctionVariable::GrowthRate,
        }
    }

    /// Rebind the function to a medium concentration instead of the growth rate
    pub fn on_medium(mut self, metabolite: &str) -> Self {
        self.variable = FunctionVariable::MediumConcentration(metabolite.to_string());
        self
    }

    /// The argument the function is evaluated at for a given growth rate and medium
    fn argument(&self, growth_rate: f64, medium: &Medium) -> f64 {
        match &self.variable {
            FunctionVariable::GrowthRate => growth_rate,
            FunctionVariable::MediumConcentration(metabolite) => medium.concentration(metabolite),
        }
    }

    /// Evaluate the function at a given growth rate and medium composition
    pub fn value_at(&self, growth_rate: f64, medium: &Medium) -> f64 {
        let x = self.argument(growth_rate, medium);
        match self.kind {
            FunctionKind::Constant { value } => value,
            FunctionKind::Linear {
                intercept,
                slope,
                x_min,
                x_max,
                y_min,
                y_max,
            } => {
                let x = x.clamp(x_min, x_max);
                (intercept + slope * x).clamp(y_min, y_max)
            }
            FunctionKind::Exponential { rate } => (rate * x).exp(),
            FunctionKind::MichaelisMenten { kmax, km } => {
                if x <= 0.0 {
                    0.0
                } else {
                    kmax * x / (km + x)
                }
            }
            FunctionKind::Inverse { constant } => {
                if x <= 0.0 {
                    0.0
                } else {
                    constant / x
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_growth_rate_and_medium() {
        let f = Function::constant("k", 4.25);
        let mut medium = Medium::new();
        medium.set("glc", 11.0);
        assert!((f.value_at(0.0, &Medium::new()) - 4.25).abs() < 1e-12);
        assert!((f.value_at(1.7, &medium) - 4.25).abs() < 1e-12);
    }

    #[test]
    fn linear_unclamped() {
        let f = Function::linear("f", 1.0, 2.0);
        assert!((f.value_at(0.5, &Medium::new()) - 2.0).abs() < 1e-12);
        assert!((f.value_at(-1.0, &Medium::new()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_clamps_argument_and_value() {
        let f = Function::linear_clamped("f", 0.0, 10.0, (0.0, 1.0), (1.0, 8.0));
        // x below x_min clamps to x_min, then y clamps up to y_min
        assert!((f.value_at(-5.0, &Medium::new()) - 1.0).abs() < 1e-12);
        // x above x_max clamps to x_max, then y clamps down to y_max
        assert!((f.value_at(3.0, &Medium::new()) - 8.0).abs() < 1e-12);
        assert!((f.value_at(0.5, &Medium::new()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn exponential() {
        let f = Function::exponential("f", 2.0);
        assert!((f.value_at(0.0, &Medium::new()) - 1.0).abs() < 1e-12);
        assert!((f.value_at(1.0, &Medium::new()) - (2.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn michaelis_menten_saturates_and_guards_zero() {
        let f = Function::michaelis_menten("f", 10.0, 1.0);
        assert_eq!(f.value_at(0.0, &Medium::new()), 0.0);
        assert_eq!(f.value_at(-1.0, &Medium::new()), 0.0);
        assert!((f.value_at(1.0, &Medium::new()) - 5.0).abs() < 1e-12);
        // approaches kmax for large arguments
        assert!(f.value_at(1e9, &Medium::new()) > 9.999);
    }

    #[test]
    fn inverse_guards_zero() {
        let f = Function::inverse("f", 3.0);
        assert_eq!(f.value_at(0.0, &Medium::new()), 0.0);
        assert!((f.value_at(2.0, &Medium::new()) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn medium_variable_reads_medium_and_defaults_to_zero() {
        let f = Function::michaelis_menten("import", 10.0, 1.0).on_medium("glc");
        let mut medium = Medium::new();
        medium.set("glc", 1.0);
        // the growth rate argument is ignored entirely
        assert!((f.value_at(2.0, &medium) - 5.0).abs() < 1e-12);
        // a metabolite absent from the medium reads as 0
        assert_eq!(f.value_at(2.0, &Medium::new()), 0.0);
    }
}
