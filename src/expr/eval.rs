//! Tree-walking evaluation of compiled expressions.

use super::parser::{BinaryOp, CallPattern, Expr, RegexOperand, UnaryOp};
use super::{Value, Variables};
use crate::error::EvalError;
use std::cmp::Ordering;

pub(crate) fn evaluate(expr: &Expr, vars: &Variables) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => vars
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Expr::Unary(op, operand) => evaluate_unary(*op, evaluate(operand, vars)?),
        Expr::Binary(BinaryOp::And, left, right) => {
            if !expect_bool("&&", evaluate(left, vars)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(expect_bool("&&", evaluate(right, vars)?)?))
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            if expect_bool("||", evaluate(left, vars)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(expect_bool("||", evaluate(right, vars)?)?))
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, vars)?;
            let right = evaluate(right, vars)?;
            evaluate_binary(*op, left, right)
        }
        Expr::Match {
            negated,
            subject,
            pattern,
        } => {
            let operator = if *negated { "!~" } else { "=~" };
            let subject = match evaluate(subject, vars)? {
                Value::String(s) => s,
                other => {
                    return Err(EvalError::InvalidOperand {
                        operator,
                        found: other.kind(),
                    })
                }
            };
            let matched = match pattern {
                RegexOperand::Static(re) => re.is_match(&subject),
                RegexOperand::Dynamic(pattern, limits) => match evaluate(pattern, vars)? {
                    Value::String(pattern) => limits
                        .build(&pattern)
                        .map_err(|e| EvalError::InvalidRegex {
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })?
                        .is_match(&subject),
                    other => {
                        return Err(EvalError::TypeMismatch {
                            operator,
                            left: super::ValueKind::String,
                            right: other.kind(),
                        })
                    }
                },
            };
            Ok(Value::Bool(matched != *negated))
        }
        Expr::Call {
            function,
            args,
            pattern,
        } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, vars))
                .collect::<Result<Vec<_>, _>>()?;
            match pattern {
                None => function.call(&args),
                Some(CallPattern::Static(re)) => function.call_with_regex(re, &args),
                Some(CallPattern::Dynamic(limits)) => function.call_with_limits(&args, limits),
            }
        }
    }
}

fn expect_bool(operator: &'static str, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::InvalidOperand {
            operator,
            found: other.kind(),
        }),
    }
}

fn evaluate_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Not, other) => Err(EvalError::InvalidOperand {
            operator: "!",
            found: other.kind(),
        }),
        (UnaryOp::Negate, other) => Err(EvalError::InvalidOperand {
            operator: "-",
            found: other.kind(),
        }),
    }
}

fn evaluate_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        operator: op.symbol(),
        left: left.kind(),
        right: right.kind(),
    };

    match op {
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(&left, &right)),
            };
            // NaN compares false against everything
            let result = match ordering {
                None => false,
                Some(ordering) => match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::LtEq => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{left}{right}")))
            }
            _ => Err(mismatch(&left, &right)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (a, b) = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => (*a, *b),
                _ => return Err(mismatch(&left, &right)),
            };
            Ok(Value::Number(match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            }))
        }
        // Short-circuit operators are handled before operands are evaluated
        BinaryOp::And | BinaryOp::Or => {
            let operator = op.symbol();
            let left = expect_bool(operator, left)?;
            let right = expect_bool(operator, right)?;
            Ok(Value::Bool(if op == BinaryOp::And {
                left && right
            } else {
                left || right
            }))
        }
    }
}
