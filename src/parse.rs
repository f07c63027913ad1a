//! Precedence-climbing parser over an explicit stack.
//!
//! The grammar is driven by two states that hand control back and forth, each
//! consuming exactly one token:
//!
//! - *expect-value*: the next token must start a value (a number with an
//!   optional unit suffix, a prefix operator, a function call, or `(`).
//! - *expect-operator*: a value was just completed; the next token must be an
//!   infix operator, `,`, `)`, or the end of the input.
//!
//! Instead of recursing, everything still pending is pushed onto a stack of
//! [`StackItem`]s: an incomplete prefix/infix operator waiting for its
//! operand, an open parenthesis, or a function call collecting arguments.
//! When a value can extend no further the stack is collapsed against it,
//! completing operators until a parenthesis or function-call item surfaces.
//! The call stack never grows with the input.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::syntax::{
    Arity, FUNCTIONS, Function, INFIX_OPERATORS, InfixOperator, Interpretation, PREFIX_OPERATORS,
    PrefixOperator,
};

/// A lexical or syntactic failure, labeled with the byte offset the parser
/// had reached when it gave up. All-or-nothing: no recovery, no partial
/// result.
#[derive(Error, Debug, Diagnostic)]
#[error("Parse error at position {at}: {message}")]
pub struct ParseError {
    #[source_code]
    src: String,

    #[label("{message}")]
    span: SourceSpan,

    pub at: usize,
    pub message: String,
}

// Failures travel as bare state + message until the public boundary attaches
// the source text.
struct Failure {
    index: usize,
    message: String,
}

impl Failure {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Failure {
            index,
            message: message.into(),
        }
    }
}

/// The cursor: the unconsumed suffix of the input plus the byte offset of
/// that suffix in the original string. Advanced by value, never mutated.
#[derive(Debug, Clone, Copy)]
struct State<'de> {
    word: &'de str,
    index: usize,
}

impl State<'_> {
    fn advance(self, bytes: usize) -> Self {
        State {
            word: &self.word[bytes..],
            index: self.index + bytes,
        }
    }

    fn strip_whitespace(self) -> Self {
        let trimmed = self.word.trim_start();
        self.advance(self.word.len() - trimmed.len())
    }
}

/// Pending continuations. An operator item is completed by a single value;
/// the other two wait for a `)` (and, for calls, commas in between).
enum StackItem<C> {
    Parenthesis,
    FunctionCall {
        fun: &'static Function,
        args: Vec<C>,
    },
    Prefix {
        binding_power: u8,
        operator: &'static PrefixOperator,
    },
    Infix {
        binding_power: u8,
        operator: &'static InfixOperator,
        left: C,
    },
}

/// What [`collapse`] found underneath the completed operators.
enum Pending<C> {
    Nothing,
    Parenthesis,
    Call {
        fun: &'static Function,
        args: Vec<C>,
    },
}

/// Complete every pending operator item against `value`, stopping at the
/// first parenthesis or function-call item (which is popped and handed back).
fn collapse<I: Interpretation>(
    interpretation: &I,
    stack: &mut Vec<StackItem<I::Carrier>>,
    mut value: I::Carrier,
) -> (I::Carrier, Pending<I::Carrier>) {
    while let Some(item) = stack.pop() {
        match item {
            StackItem::Prefix { operator, .. } => {
                value = interpretation.unary_operation(operator, value);
            }
            StackItem::Infix { operator, left, .. } => {
                value = interpretation.binary_operation(left, operator, value);
            }
            StackItem::Parenthesis => return (value, Pending::Parenthesis),
            StackItem::FunctionCall { fun, args } => return (value, Pending::Call { fun, args }),
        }
    }
    (value, Pending::Nothing)
}

struct NumberToken {
    value: f64,
    unit: Option<&'static str>,
    read: usize,
}

/// Scan a numeric literal at the start of `word`: digits, an optional `.`
/// plus fractional digits, and optionally a bare `e` plus exponent digits
/// (no sign). The exponent digits are consumed but never applied to the
/// value; that is long-standing observed behavior and stays as-is.
///
/// On success the remaining text is matched against the registered unit
/// names in declaration order; the first prefix match wins, not the longest.
fn scan_number(valid_units: &[&'static str], word: &str) -> Result<NumberToken, &'static str> {
    fn digits(s: &str) -> usize {
        s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())
    }

    let integral = &word[..digits(word)];
    let mut read = integral.len();

    let mut fractional = "";
    if word[read..].starts_with('.') {
        let rest = &word[read + 1..];
        fractional = &rest[..digits(rest)];
        read += 1 + fractional.len();
    }

    // The numeric body ends here; exponent digits below only get consumed.
    let body = read;

    let mut exponent = "";
    if word[read..].starts_with('e') {
        let rest = &word[read + 1..];
        exponent = &rest[..digits(rest)];
        read += 1 + exponent.len();
    }

    if integral.is_empty() && fractional.is_empty() && exponent.is_empty() {
        return Err("A number cannot be empty");
    }
    if integral.is_empty() && fractional.is_empty() {
        return Err("A number cannot consist of only an exponent");
    }

    // The body is digits with at most one dot, so this parse cannot fail.
    let Ok(value) = word[..body].parse::<f64>() else {
        return Err("A number cannot be empty");
    };

    let unit = valid_units
        .iter()
        .copied()
        .find(|unit| word[read..].starts_with(unit));

    Ok(NumberToken {
        value,
        unit,
        read: read + unit.map_or(0, str::len),
    })
}

fn arity_message(fun: &Function, received: usize) -> String {
    match fun.arity {
        Arity::Variadic => format!(
            "Function {} expects a positive number of arguments, but none were given",
            fun.name
        ),
        Arity::Exactly(expected) => format!(
            "Function {} expects {expected} arguments, but received {received}",
            fun.name
        ),
    }
}

enum Mode<C> {
    Value,
    Operator(C),
}

/// Drives one interpretation over one source string.
pub struct Parser<'a, I> {
    valid_units: &'a [&'static str],
    interpretation: &'a I,
}

impl<'a, I: Interpretation> Parser<'a, I> {
    pub fn new(valid_units: &'a [&'static str], interpretation: &'a I) -> Self {
        Parser {
            valid_units,
            interpretation,
        }
    }

    /// Parse `input` to completion, producing whatever the interpretation
    /// carries.
    pub fn parse(&self, input: &str) -> Result<I::Carrier, ParseError> {
        self.run(input).map_err(|failure| {
            let len = input.len().saturating_sub(failure.index).min(1);
            ParseError {
                src: input.to_string(),
                span: (failure.index, len).into(),
                at: failure.index,
                message: failure.message,
            }
        })
    }

    fn run(&self, input: &str) -> Result<I::Carrier, Failure> {
        let interpretation = self.interpretation;
        let mut stack: Vec<StackItem<I::Carrier>> = Vec::new();
        let mut state = State {
            word: input,
            index: 0,
        }
        .strip_whitespace();
        let mut mode = Mode::Value;

        loop {
            mode = match mode {
                Mode::Value => {
                    if state.word.is_empty() {
                        return Err(Failure::new(state.index, "Unexpected end of string"));
                    } else if state.word.starts_with(')') {
                        return Err(Failure::new(state.index, "Unexpected closed parenthesis"));
                    } else if state.word.starts_with('(') {
                        stack.push(StackItem::Parenthesis);
                        state = state.advance(1).strip_whitespace();
                        Mode::Value
                    } else if let Ok(number) = scan_number(self.valid_units, state.word) {
                        let literal = interpretation.literal(number.value, number.unit);
                        state = state.advance(number.read).strip_whitespace();
                        // After a number comes an operator.
                        Mode::Operator(literal)
                    } else if let Some(operator) = PREFIX_OPERATORS
                        .iter()
                        .find(|op| state.word.starts_with(op.symbol))
                    {
                        // The prefix operator still needs the value it
                        // operates on; remember it as a continuation.
                        stack.push(StackItem::Prefix {
                            binding_power: operator.binding_power,
                            operator,
                        });
                        state = state.advance(operator.symbol.len()).strip_whitespace();
                        Mode::Value
                    } else if let Some(fun) = FUNCTIONS
                        .iter()
                        .find(|fun| state.word.starts_with(fun.name))
                    {
                        let after_name = state.advance(fun.name.len()).strip_whitespace();
                        if !after_name.word.starts_with('(') {
                            return Err(Failure::new(
                                state.index,
                                "Expected an open parenthesis after a function name",
                            ));
                        }
                        stack.push(StackItem::FunctionCall {
                            fun,
                            args: Vec::new(),
                        });
                        state = after_name.advance(1).strip_whitespace();
                        Mode::Value
                    } else {
                        return Err(Failure::new(
                            state.index,
                            "Expected a numeric value, a prefix operator, or a function call",
                        ));
                    }
                }

                Mode::Operator(value) => {
                    if state.word.is_empty() {
                        // The expression may end here, but only if no
                        // parenthesis or function call is still waiting.
                        let (result, pending) = collapse(interpretation, &mut stack, value);
                        return match pending {
                            Pending::Nothing => Ok(result),
                            _ => Err(Failure::new(state.index, "Unexpected end of input")),
                        };
                    } else if state.word.starts_with(')') {
                        let (result, pending) = collapse(interpretation, &mut stack, value);
                        match pending {
                            Pending::Nothing => {
                                return Err(Failure::new(
                                    state.index,
                                    "Too many closing parentheses",
                                ));
                            }
                            Pending::Parenthesis => {
                                state = state.advance(1).strip_whitespace();
                                Mode::Operator(result)
                            }
                            Pending::Call { fun, mut args } => {
                                args.push(result);
                                if !fun.accepts(args.len()) {
                                    return Err(Failure::new(
                                        state.index,
                                        arity_message(fun, args.len()),
                                    ));
                                }
                                let call = interpretation.function_call(fun, args);
                                state = state.advance(1).strip_whitespace();
                                Mode::Operator(call)
                            }
                        }
                    } else if state.word.starts_with(',') {
                        // A comma only makes sense between function
                        // arguments: the collapsed value is the next one.
                        let (argument, pending) = collapse(interpretation, &mut stack, value);
                        let Pending::Call { fun, mut args } = pending else {
                            return Err(Failure::new(
                                state.index,
                                "Found a comma outside of a function call",
                            ));
                        };
                        args.push(argument);
                        stack.push(StackItem::FunctionCall { fun, args });
                        state = state.advance(1).strip_whitespace();
                        Mode::Value
                    } else {
                        let Some(operator) = INFIX_OPERATORS
                            .iter()
                            .find(|op| state.word.starts_with(op.symbol))
                        else {
                            return Err(Failure::new(state.index, "Expected an infix operator"));
                        };

                        // Precedence climbing: every pending operator that
                        // binds at least as tightly as this one's left side
                        // gets the value first. The asymmetric left/right
                        // powers make equal-precedence chains left
                        // associative.
                        let mut left = value;
                        while let Some(item) = stack.pop() {
                            match item {
                                StackItem::Prefix {
                                    binding_power,
                                    operator: prefix,
                                } if binding_power >= operator.binding_power_left => {
                                    left = interpretation.unary_operation(prefix, left);
                                }
                                StackItem::Infix {
                                    binding_power,
                                    operator: infix,
                                    left: lhs,
                                } if binding_power >= operator.binding_power_left => {
                                    left = interpretation.binary_operation(lhs, infix, left);
                                }
                                item => {
                                    stack.push(item);
                                    break;
                                }
                            }
                        }

                        stack.push(StackItem::Infix {
                            binding_power: operator.binding_power_right,
                            operator,
                            left,
                        });
                        state = state.advance(operator.symbol.len()).strip_whitespace();
                        Mode::Value
                    }
                }
            };
        }
    }
}
