//! The interpretations a parse can be driven with.
//!
//! Each one implements [`Interpretation`] with its own carrier type:
//! [`Evaluate`] folds straight to a number, [`Print`] to a canonical string,
//! [`Reify`] to an explicit [`ExpressionNode`] tree, and [`Replay`] to a
//! value that can be re-interpreted later against any other interpretation
//! without re-parsing. [`Combine`] runs two interpretations in one pass.

use crate::syntax::{Function, InfixOperator, Interpretation, PrefixOperator};
use crate::system::System;

/// Numeric evaluation in the base-unit space of a [`System`].
///
/// A literal with a unit is converted into base-unit numbers immediately,
/// using the constants the system held when this interpretation was built;
/// a literal without a unit passes through unchanged.
pub struct Evaluate<'s> {
    system: &'s System,
}

impl<'s> Evaluate<'s> {
    pub fn new(system: &'s System) -> Self {
        Evaluate { system }
    }
}

impl Interpretation for Evaluate<'_> {
    type Carrier = f64;

    fn literal(&self, value: f64, unit: Option<&'static str>) -> f64 {
        match unit {
            // The parser only accepts registered unit suffixes, so a failed
            // lookup cannot happen for parser-produced literals.
            Some(unit) => self.system.to_base(unit, value).unwrap_or(f64::NAN),
            None => value,
        }
    }

    fn unary_operation(&self, operator: &'static PrefixOperator, operand: f64) -> f64 {
        if operator.symbol == "-" { -operand } else { operand }
    }

    fn binary_operation(&self, left: f64, operator: &'static InfixOperator, right: f64) -> f64 {
        match operator.symbol {
            "+" => left + right,
            "-" => left - right,
            "*" => left * right,
            _ => left / right,
        }
    }

    fn function_call(&self, fun: &'static Function, args: Vec<f64>) -> f64 {
        // The parser validated the arity before emitting the call.
        match (fun.name, args.as_slice()) {
            ("floor", [x]) => x.floor(),
            ("ceil", [x]) => x.ceil(),
            ("round", [x]) => x.round(),
            ("abs", [x]) => x.abs(),
            ("sqrt", [x]) => x.sqrt(),
            ("cbrt", [x]) => x.cbrt(),
            ("exp", [x]) => x.exp(),
            ("log", [x]) => x.ln(),
            ("log10", [x]) => x.log10(),
            ("log2", [x]) => x.log2(),
            ("sin", [x]) => x.sin(),
            ("cos", [x]) => x.cos(),
            ("tan", [x]) => x.tan(),
            ("minmax", [low, x, high]) => high.min(low.max(*x)),
            ("min", values) => values.iter().copied().fold(f64::INFINITY, f64::min),
            ("max", values) => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ("div", [a, b]) => (a / b).floor(),
            ("mod", [a, b]) => a % b,
            _ => f64::NAN,
        }
    }
}

/// Canonical, fully parenthesized rendering. Not whitespace-faithful to the
/// source, but re-parsing the output yields the same value.
pub struct Print;

impl Interpretation for Print {
    type Carrier = String;

    fn literal(&self, value: f64, unit: Option<&'static str>) -> String {
        format!("{value}{}", unit.unwrap_or(""))
    }

    fn unary_operation(&self, operator: &'static PrefixOperator, operand: String) -> String {
        format!("({}({operand}))", operator.symbol)
    }

    fn binary_operation(&self, left: String, operator: &'static InfixOperator, right: String) -> String {
        format!("({left} {} {right})", operator.symbol)
    }

    fn function_call(&self, fun: &'static Function, args: Vec<String>) -> String {
        format!("{}({})", fun.name, args.join(", "))
    }
}

/// An explicit expression tree. The operator and function descriptors are
/// borrowed from the static catalogs, so a tree can always be re-interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Literal {
        value: f64,
        unit: Option<&'static str>,
    },
    UnaryOperator {
        operator: &'static PrefixOperator,
        operand: Box<ExpressionNode>,
    },
    BinaryOperator {
        left: Box<ExpressionNode>,
        operator: &'static InfixOperator,
        right: Box<ExpressionNode>,
    },
    FunctionCall {
        fun: &'static Function,
        args: Vec<ExpressionNode>,
    },
}

impl ExpressionNode {
    /// Walk the tree against any interpretation, producing its carrier.
    /// This is the replay half of [`Reify`]: parse once, interpret as often
    /// as needed.
    pub fn interpret<I: Interpretation>(&self, interpretation: &I) -> I::Carrier {
        match self {
            ExpressionNode::Literal { value, unit } => interpretation.literal(*value, *unit),
            ExpressionNode::UnaryOperator { operator, operand } => {
                let operand = operand.interpret(interpretation);
                interpretation.unary_operation(operator, operand)
            }
            ExpressionNode::BinaryOperator {
                left,
                operator,
                right,
            } => {
                let left = left.interpret(interpretation);
                let right = right.interpret(interpretation);
                interpretation.binary_operation(left, operator, right)
            }
            ExpressionNode::FunctionCall { fun, args } => {
                let args = args.iter().map(|arg| arg.interpret(interpretation)).collect();
                interpretation.function_call(fun, args)
            }
        }
    }
}

/// Builds the [`ExpressionNode`] tree.
pub struct Reify;

impl Interpretation for Reify {
    type Carrier = ExpressionNode;

    fn literal(&self, value: f64, unit: Option<&'static str>) -> ExpressionNode {
        ExpressionNode::Literal { value, unit }
    }

    fn unary_operation(
        &self,
        operator: &'static PrefixOperator,
        operand: ExpressionNode,
    ) -> ExpressionNode {
        ExpressionNode::UnaryOperator {
            operator,
            operand: Box::new(operand),
        }
    }

    fn binary_operation(
        &self,
        left: ExpressionNode,
        operator: &'static InfixOperator,
        right: ExpressionNode,
    ) -> ExpressionNode {
        ExpressionNode::BinaryOperator {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    fn function_call(&self, fun: &'static Function, args: Vec<ExpressionNode>) -> ExpressionNode {
        ExpressionNode::FunctionCall { fun, args }
    }
}

/// The deferred interpretation: its carrier holds the reified tree and hands
/// it to any other interpretation on demand.
pub struct Replay;

/// A parsed expression waiting to be interpreted.
pub struct Replayed(ExpressionNode);

impl Replayed {
    pub fn replay<I: Interpretation>(&self, interpretation: &I) -> I::Carrier {
        self.0.interpret(interpretation)
    }

    pub fn into_node(self) -> ExpressionNode {
        self.0
    }
}

impl Interpretation for Replay {
    type Carrier = Replayed;

    fn literal(&self, value: f64, unit: Option<&'static str>) -> Replayed {
        Replayed(Reify.literal(value, unit))
    }

    fn unary_operation(&self, operator: &'static PrefixOperator, operand: Replayed) -> Replayed {
        Replayed(Reify.unary_operation(operator, operand.0))
    }

    fn binary_operation(
        &self,
        left: Replayed,
        operator: &'static InfixOperator,
        right: Replayed,
    ) -> Replayed {
        Replayed(Reify.binary_operation(left.0, operator, right.0))
    }

    fn function_call(&self, fun: &'static Function, args: Vec<Replayed>) -> Replayed {
        Replayed(Reify.function_call(fun, args.into_iter().map(|arg| arg.0).collect()))
    }
}

/// Runs two interpretations over the same parse, pairing their carriers.
/// One pass, two results.
pub struct Combine<A, B>(pub A, pub B);

impl<A: Interpretation, B: Interpretation> Interpretation for Combine<A, B> {
    type Carrier = (A::Carrier, B::Carrier);

    fn literal(&self, value: f64, unit: Option<&'static str>) -> Self::Carrier {
        (self.0.literal(value, unit), self.1.literal(value, unit))
    }

    fn unary_operation(
        &self,
        operator: &'static PrefixOperator,
        (first, second): Self::Carrier,
    ) -> Self::Carrier {
        (
            self.0.unary_operation(operator, first),
            self.1.unary_operation(operator, second),
        )
    }

    fn binary_operation(
        &self,
        (left_first, left_second): Self::Carrier,
        operator: &'static InfixOperator,
        (right_first, right_second): Self::Carrier,
    ) -> Self::Carrier {
        (
            self.0.binary_operation(left_first, operator, right_first),
            self.1.binary_operation(left_second, operator, right_second),
        )
    }

    fn function_call(&self, fun: &'static Function, args: Vec<Self::Carrier>) -> Self::Carrier {
        let (first, second): (Vec<_>, Vec<_>) = args.into_iter().unzip();
        (
            self.0.function_call(fun, first),
            self.1.function_call(fun, second),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parser;
    use crate::systems::length_system;

    const UNITS: [&str; 4] = ["km", "cm", "mm", "m"];

    #[test]
    fn evaluate_converts_unit_literals_into_base_space() {
        let system = length_system();
        let evaluate = Evaluate::new(&system);
        let value = Parser::new(&UNITS, &evaluate).parse("12km - 200m").unwrap();
        assert_eq!(value, 11800.0);
    }

    #[test]
    fn reify_builds_the_expected_tree() {
        let node = Parser::new(&UNITS, &Reify).parse("1 + 2m").unwrap();
        match node {
            ExpressionNode::BinaryOperator {
                left,
                operator,
                right,
            } => {
                assert_eq!(operator.symbol, "+");
                assert_eq!(
                    *left,
                    ExpressionNode::Literal {
                        value: 1.0,
                        unit: None
                    }
                );
                assert_eq!(
                    *right,
                    ExpressionNode::Literal {
                        value: 2.0,
                        unit: Some("m")
                    }
                );
            }
            other => panic!("expected a binary operator, got {other:?}"),
        }
    }

    #[test]
    fn replay_reinterprets_without_reparsing() {
        let replayed = Parser::new(&UNITS, &Replay).parse("2 * (3 + 4)").unwrap();

        assert_eq!(replayed.replay(&Print), "(2 * (3 + 4))");

        let system = length_system();
        assert_eq!(replayed.replay(&Evaluate::new(&system)), 14.0);
    }

    #[test]
    fn combine_produces_both_results_in_one_pass() {
        let system = length_system();
        let both = Combine(Evaluate::new(&system), Print);
        let (value, printed) = Parser::new(&UNITS, &both).parse("2 * 3 + 4").unwrap();
        assert_eq!(value, 10.0);
        assert_eq!(printed, "((2 * 3) + 4)");
    }

    #[test]
    fn builtins_evaluate_as_documented() {
        let system = length_system();
        let evaluate = Evaluate::new(&system);
        let eval = |input: &str| Parser::new(&UNITS, &evaluate).parse(input).unwrap();

        assert_eq!(eval("minmax(1, 5, 3)"), 3.0);
        assert_eq!(eval("minmax(1, 0, 3)"), 1.0);
        assert_eq!(eval("minmax(1, 2, 3)"), 2.0);
        assert_eq!(eval("div(7, 2)"), 3.0);
        assert_eq!(eval("mod(7, 2)"), 1.0);
        assert_eq!(eval("min(4, 2, 8)"), 2.0);
        assert_eq!(eval("max(4, 2, 8)"), 8.0);
    }
}
