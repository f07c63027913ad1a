//! Unit systems and the convertible values they produce.
//!
//! A [`System`] is pure configuration: a list of units with `to`/`from`
//! conversions, a base unit, and a set of named constants the conversions
//! may read. Conversion between two non-base units is never defined
//! directly; every trip goes through the base unit (hub and spoke).
//!
//! A [`Convertible`] is an immutable value+unit pair. Every operation on it
//! returns a new instance; nothing is cached or pooled.

use std::collections::BTreeMap;
use std::fmt::Display;

use thiserror::Error;

/// A unit is just its name. Names live in the static system tables.
pub type Unit = &'static str;

/// A pure conversion step. Plain function pointer: conversions close over
/// nothing and read their parameters from the constants by name.
pub type Conversion = fn(f64, &Constants) -> f64;

/// Named numeric parameters conversions may depend on (viewport width,
/// pixel ratio, ...). Never mutated in place; overlays build a new set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constants(BTreeMap<String, f64>);

impl Constants {
    /// Read a constant. An absent name reads as NaN, which poisons the
    /// arithmetic instead of panicking; conversions stay total.
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(f64::NAN)
    }

    /// A new set with `overrides` shallow-merged over `self`.
    pub fn merged<K, I>(&self, overrides: I) -> Constants
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut merged = self.0.clone();
        for (name, value) in overrides {
            merged.insert(name.into(), value);
        }
        Constants(merged)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Constants {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Constants(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
struct UnitEntry {
    name: Unit,
    /// base -> this unit
    to: Conversion,
    /// this unit -> base
    from: Conversion,
}

/// Conversion failures on a [`Convertible`].
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("unknown unit [{unit}]: make sure it is registered in the unit system")]
    UnknownUnit { unit: String },
}

/// An immutable bundle of conversion tables and named constants.
///
/// The entries keep their declaration order; the parser's unit scan matches
/// suffixes in that order, first match wins.
#[derive(Debug, Clone)]
pub struct System {
    constants: Constants,
    base_unit: Unit,
    units: Vec<UnitEntry>,
}

impl System {
    pub fn builder(base_unit: Unit) -> SystemBuilder {
        SystemBuilder {
            constants: Constants::default(),
            base_unit,
            units: Vec::new(),
        }
    }

    pub fn base_unit(&self) -> Unit {
        self.base_unit
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Registered unit names in declaration order.
    pub fn unit_names(&self) -> impl Iterator<Item = Unit> + '_ {
        self.units.iter().map(|entry| entry.name)
    }

    fn entry(&self, unit: &str) -> Option<&UnitEntry> {
        self.units.iter().find(|entry| entry.name == unit)
    }

    /// Convert a value in `unit` into base-unit space.
    pub fn to_base(&self, unit: &str, value: f64) -> Option<f64> {
        self.entry(unit)
            .map(|entry| (entry.from)(value, &self.constants))
    }

    /// Convert a value in base-unit space into `unit`.
    pub fn from_base(&self, unit: &str, value: f64) -> Option<f64> {
        self.entry(unit)
            .map(|entry| (entry.to)(value, &self.constants))
    }

    /// A new system with `overrides` merged over the constants. The original
    /// is untouched; this is how configured variants of a stock system are
    /// made.
    pub fn with_constants<K, I>(&self, overrides: I) -> System
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        System {
            constants: self.constants.merged(overrides),
            base_unit: self.base_unit,
            units: self.units.clone(),
        }
    }
}

fn identity(value: f64, _: &Constants) -> f64 {
    value
}

/// Builds a [`System`] while upholding its invariants: units register their
/// `to` and `from` conversions as a pair, and the base unit's entries are
/// forced to the identity no matter what was declared for it.
pub struct SystemBuilder {
    constants: Constants,
    base_unit: Unit,
    units: Vec<UnitEntry>,
}

impl SystemBuilder {
    pub fn constant(mut self, name: &str, value: f64) -> Self {
        self.constants = self.constants.merged([(name, value)]);
        self
    }

    /// Declare a unit. `from` converts this unit into the base unit, `to`
    /// converts the base unit into this one. Declaration order is kept and
    /// matters for unit scanning.
    pub fn unit(mut self, name: Unit, from: Conversion, to: Conversion) -> Self {
        if name == self.base_unit {
            self.units.push(UnitEntry {
                name,
                to: identity,
                from: identity,
            });
        } else {
            self.units.push(UnitEntry { name, to, from });
        }
        self
    }

    pub fn build(mut self) -> System {
        if self.entry_missing(self.base_unit) {
            self.units.push(UnitEntry {
                name: self.base_unit,
                to: identity,
                from: identity,
            });
        }
        System {
            constants: self.constants,
            base_unit: self.base_unit,
            units: self.units,
        }
    }

    fn entry_missing(&self, unit: Unit) -> bool {
        !self.units.iter().any(|entry| entry.name == unit)
    }
}

/// An immutable value tagged with its unit, lazily convertible into every
/// other unit of its system.
#[derive(Debug, Clone)]
pub struct Convertible {
    system: System,
    value: f64,
    unit: Unit,
}

impl Convertible {
    pub fn new(system: System, value: f64, unit: Unit) -> Self {
        Convertible {
            system,
            value,
            unit,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Read this value in another unit. Computed on access, never cached.
    ///
    /// Asking for the value's own unit hands back the stored number as-is;
    /// no conversion runs and no precision is lost. Everything else is a
    /// two-hop trip: own unit -> base unit -> target unit (one hop if the
    /// target is the base unit itself).
    pub fn get(&self, unit: &str) -> Result<Convertible, ConversionError> {
        if unit == self.unit {
            return Ok(self.clone());
        }

        let target = self.system.entry(unit).ok_or_else(|| {
            ConversionError::UnknownUnit {
                unit: unit.to_string(),
            }
        })?;
        let source =
            self.system
                .entry(self.unit)
                .ok_or_else(|| ConversionError::UnknownUnit {
                    unit: self.unit.to_string(),
                })?;

        let constants = &self.system.constants;
        let base = (source.from)(self.value, constants);
        let (value, unit) = if target.name == self.system.base_unit {
            (base, target.name)
        } else {
            ((target.to)(base, constants), target.name)
        };

        Ok(Convertible {
            system: self.system.clone(),
            value,
            unit,
        })
    }

    /// The same number and unit, reinterpreted under merged constants. This
    /// does not re-convert the stored value; it changes what the value will
    /// mean to future conversions.
    pub fn with<K, I>(&self, overrides: I) -> Convertible
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Convertible {
            system: self.system.with_constants(overrides),
            value: self.value,
            unit: self.unit,
        }
    }

    /// Bridge into another system through a unit both systems declare.
    ///
    /// Reads this value in `common_unit`, then rewraps that number as a
    /// value of the target system tagged with the same unit. This is the
    /// only way two systems interoperate.
    pub fn to_system(
        &self,
        target: &System,
        common_unit: &str,
    ) -> Result<Convertible, ConversionError> {
        let common = self.get(common_unit)?;
        let entry = target
            .entry(common_unit)
            .ok_or_else(|| ConversionError::UnknownUnit {
                unit: common_unit.to_string(),
            })?;
        Ok(Convertible {
            system: target.clone(),
            value: common.value,
            unit: entry.name,
        })
    }
}

impl Display for Convertible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling_system() -> System {
        System::builder("base")
            .constant("factor", 2.0)
            .unit(
                "half",
                |value, constants| value * constants.get("factor"),
                |value, constants| value / constants.get("factor"),
            )
            .unit("base", identity, identity)
            .build()
    }

    #[test]
    fn base_unit_conversions_are_identity() {
        let system = System::builder("u")
            .unit("u", |value, _| value * 100.0, |value, _| value * 100.0)
            .build();
        assert_eq!(system.to_base("u", 7.0), Some(7.0));
        assert_eq!(system.from_base("u", 7.0), Some(7.0));
    }

    #[test]
    fn missing_base_declaration_is_filled_in() {
        let system = System::builder("x")
            .unit("kx", |value, _| value * 1000.0, |value, _| value / 1000.0)
            .build();
        assert_eq!(system.to_base("x", 1.5), Some(1.5));
        assert_eq!(system.unit_names().collect::<Vec<_>>(), vec!["kx", "x"]);
    }

    #[test]
    fn conversion_routes_through_the_base_unit() {
        let system = doubling_system();
        let value = Convertible::new(system, 3.0, "half");

        let base = value.get("base").unwrap();
        assert_eq!(base.value(), 6.0);
        assert_eq!(base.unit(), "base");

        let back = base.get("half").unwrap();
        assert_eq!(back.value(), 3.0);
    }

    #[test]
    fn own_unit_access_skips_conversion() {
        // A NaN factor would poison any conversion that actually runs.
        let value = Convertible::new(doubling_system(), 3.0, "half").with([("factor", f64::NAN)]);
        let same = value.get("half").unwrap();
        assert_eq!(same.value(), 3.0);
        assert_eq!(same.unit(), "half");
    }

    #[test]
    fn unknown_units_are_reported() {
        let value = Convertible::new(doubling_system(), 3.0, "half");
        assert!(matches!(
            value.get("quarter"),
            Err(ConversionError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn constant_overlay_is_non_destructive() {
        let original = Convertible::new(doubling_system(), 3.0, "half");
        let overlaid = original.with([("factor", 10.0)]);

        assert_eq!(overlaid.get("base").unwrap().value(), 30.0);
        // The original still sees the stock constants.
        assert_eq!(original.get("base").unwrap().value(), 6.0);
    }

    #[test]
    fn absent_constants_read_as_nan() {
        let constants = Constants::default();
        assert!(constants.get("missing").is_nan());
    }

    #[test]
    fn display_is_value_then_unit() {
        let value = Convertible::new(doubling_system(), 1.5, "half");
        assert_eq!(value.to_string(), "1.5half");
    }
}
