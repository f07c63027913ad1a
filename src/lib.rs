//! Unit-aware arithmetic expressions.
//!
//! Expressions like `12km - 200m` are parsed against a [`System`] of units,
//! evaluated in the system's base-unit space, and handed back as an
//! immutable [`Convertible`] that reads in any registered unit:
//!
//! ```
//! use unitcalc::{calculate, systems::length_system};
//!
//! let system = length_system();
//! let distance = calculate(&system, "12km - 200m")?;
//! assert_eq!(distance.to_string(), "11800m");
//! assert_eq!(distance.get("cm")?.to_string(), "1180000cm");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The parser itself is generic over an [`Interpretation`]: the same single
//! pass can evaluate, pretty-print, build an expression tree, or do several
//! of those at once. See [`interpret`] for the stock interpretations.
//!
//! [`Interpretation`]: syntax::Interpretation

pub mod interpret;
pub mod parse;
pub mod syntax;
pub mod system;
pub mod systems;

use regex::Regex;
use thiserror::Error;

use crate::interpret::Evaluate;
use crate::parse::{ParseError, Parser};
pub use crate::system::{Constants, Conversion, Convertible, ConversionError, System, Unit};

/// Evaluate an arithmetic expression against a system.
///
/// Unit literals are converted into base-unit space before any arithmetic,
/// so mixed-unit expressions are well defined. The result is wrapped in the
/// system's base unit.
pub fn calculate(system: &System, input: &str) -> Result<Convertible, ParseError> {
    let units: Vec<Unit> = system.unit_names().collect();
    let value = Parser::new(&units, &Evaluate::new(system)).parse(input)?;
    Ok(Convertible::new(system.clone(), value, system.base_unit()))
}

/// Parse an expression and render it back fully parenthesized. Useful for
/// seeing how an input grouped.
pub fn print_expression(system: &System, input: &str) -> Result<String, ParseError> {
    let units: Vec<Unit> = system.unit_names().collect();
    Parser::new(&units, &interpret::Print).parse(input)
}

/// Failures of the literal-only [`LiteralParser`].
#[derive(Error, Debug)]
pub enum LiteralError {
    #[error(
        "failed to parse value [{input}]: the unit is probably not registered or the value is not numerical"
    )]
    Malformed { input: String },
    #[error(
        "failed to parse value with unit [{input}]: unknown unit {unit}, make sure it is registered in the unit system"
    )]
    UnknownUnit { input: String, unit: String },
}

/// Parses single unit literals like `4rem` or `-1.5km` without going through
/// the expression grammar. A missing unit suffix defaults to the system's
/// base unit.
pub struct LiteralParser {
    system: System,
    pattern: Regex,
}

impl LiteralParser {
    pub fn new(system: &System) -> Self {
        let units = system
            .unit_names()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"^(-?(?:\d+|\.\d+|\d+\.\d+))({units})?$");
        LiteralParser {
            system: system.clone(),
            // Escaped unit names cannot produce an invalid pattern.
            pattern: Regex::new(&pattern).expect("literal pattern"),
        }
    }

    pub fn parse(&self, input: &str) -> Result<Convertible, LiteralError> {
        let captures = self
            .pattern
            .captures(input)
            .ok_or_else(|| LiteralError::Malformed {
                input: input.to_string(),
            })?;
        let value: f64 =
            captures[1]
                .parse()
                .map_err(|_| LiteralError::Malformed {
                    input: input.to_string(),
                })?;

        let unit = match captures.get(2) {
            Some(matched) => matched.as_str(),
            None => self.system.base_unit(),
        };
        // Resolve to the static name the system declares.
        let unit = self
            .system
            .unit_names()
            .find(|name| *name == unit)
            .ok_or_else(|| LiteralError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })?;

        Ok(Convertible::new(self.system.clone(), value, unit))
    }
}
