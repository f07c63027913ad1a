//! Static catalogs of the operators and builtin functions the parser knows
//! about, plus the interpretation contract that turns a parse into a value.
//!
//! The tables are plain linear-scan arrays. The vocabulary is tiny and the
//! parser matches tokens by prefix, so declaration order is part of the
//! contract: the first entry whose symbol prefixes the input wins.

/// A unary operator that precedes its operand, e.g. `-2`.
///
/// Higher binding power binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixOperator {
    pub symbol: &'static str,
    pub binding_power: u8,
}

/// A binary operator between two operands.
///
/// The left/right binding powers are asymmetric: `binding_power_right` is one
/// higher than `binding_power_left`, which is what makes `10 - 3 - 2` group
/// as `(10 - 3) - 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfixOperator {
    pub symbol: &'static str,
    pub binding_power_left: u8,
    pub binding_power_right: u8,
}

pub const INFIX_OPERATORS: [InfixOperator; 4] = [
    InfixOperator {
        symbol: "+",
        binding_power_left: 1,
        binding_power_right: 2,
    },
    InfixOperator {
        symbol: "-",
        binding_power_left: 1,
        binding_power_right: 2,
    },
    InfixOperator {
        symbol: "*",
        binding_power_left: 3,
        binding_power_right: 4,
    },
    InfixOperator {
        symbol: "/",
        binding_power_left: 3,
        binding_power_right: 4,
    },
];

// Unary minus binds tighter than every infix operator, so it only ever
// applies to the value immediately after it.
pub const PREFIX_OPERATORS: [PrefixOperator; 1] = [PrefixOperator {
    symbol: "-",
    binding_power: 5,
}];

/// How many arguments a builtin function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    /// At least one argument.
    Variadic,
}

/// A builtin function descriptor. The evaluation itself lives with the
/// numeric interpretation; the parser only needs the name and the arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub name: &'static str,
    pub arity: Arity,
}

impl Function {
    pub fn accepts(&self, count: usize) -> bool {
        count != 0
            && match self.arity {
                Arity::Exactly(arity) => count == arity,
                Arity::Variadic => true,
            }
    }
}

const fn function(name: &'static str, arity: Arity) -> Function {
    Function { name, arity }
}

// `minmax` must stay ahead of `min`: function names are matched by prefix.
pub const FUNCTIONS: [Function; 18] = [
    function("floor", Arity::Exactly(1)),
    function("ceil", Arity::Exactly(1)),
    function("round", Arity::Exactly(1)),
    function("abs", Arity::Exactly(1)),
    function("sqrt", Arity::Exactly(1)),
    function("cbrt", Arity::Exactly(1)),
    function("exp", Arity::Exactly(1)),
    function("log", Arity::Exactly(1)),
    function("log10", Arity::Exactly(1)),
    function("log2", Arity::Exactly(1)),
    function("sin", Arity::Exactly(1)),
    function("cos", Arity::Exactly(1)),
    function("tan", Arity::Exactly(1)),
    function("minmax", Arity::Exactly(3)),
    function("min", Arity::Variadic),
    function("max", Arity::Variadic),
    function("div", Arity::Exactly(2)),
    function("mod", Arity::Exactly(2)),
];

/// The interpretation contract.
///
/// One grammar, many results: the parser is generic over this trait and calls
/// it once per completed node, threading the opaque [`Carrier`] through. A
/// numeric evaluator, a pretty printer, and an AST builder are all just
/// different implementations driven by the same single parse.
///
/// [`Carrier`]: Interpretation::Carrier
pub trait Interpretation {
    type Carrier;

    fn literal(&self, value: f64, unit: Option<&'static str>) -> Self::Carrier;
    fn unary_operation(
        &self,
        operator: &'static PrefixOperator,
        operand: Self::Carrier,
    ) -> Self::Carrier;
    fn binary_operation(
        &self,
        left: Self::Carrier,
        operator: &'static InfixOperator,
        right: Self::Carrier,
    ) -> Self::Carrier;
    fn function_call(&self, fun: &'static Function, args: Vec<Self::Carrier>) -> Self::Carrier;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_accepts_exact_count_only() {
        let floor = function("floor", Arity::Exactly(1));
        assert!(floor.accepts(1));
        assert!(!floor.accepts(0));
        assert!(!floor.accepts(2));
    }

    #[test]
    fn variadic_requires_at_least_one_argument() {
        let min = function("min", Arity::Variadic);
        assert!(!min.accepts(0));
        assert!(min.accepts(1));
        assert!(min.accepts(7));
    }

    #[test]
    fn minmax_is_declared_before_its_prefixes() {
        let minmax = FUNCTIONS.iter().position(|f| f.name == "minmax");
        let min = FUNCTIONS.iter().position(|f| f.name == "min");
        assert!(minmax < min);
    }
}
