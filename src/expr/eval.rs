//! Avaliação de uma árvore [`Expr`] contra um [`Environment`].
//!
//! Erros de tipo, divisão por zero, regex inválida e índices fora da lista
//! viram [`ExprError::Runtime`].

use std::collections::HashMap;

use regex::Regex;

use super::parser::{BinaryOp, Expr, UnaryOp};
use super::{Environment, ExprError};
use crate::core::Value;

/// Regex já compiladas, indexadas pelo texto do padrão.
pub type Patterns = HashMap<String, Regex>;

/// Compila os padrões literais (`x matches 'lit'`) de uma árvore.
///
/// Padrões inválidos ficam de fora e continuam falhando na avaliação.
pub fn literal_patterns(expr: &Expr) -> Patterns {
    let mut patterns = Patterns::new();
    collect_patterns(expr, &mut patterns);
    patterns
}

fn collect_patterns(expr: &Expr, patterns: &mut Patterns) {
    match expr {
        Expr::Literal(_) | Expr::Identifier(_) => {}
        Expr::Member { target, .. } => collect_patterns(target, patterns),
        Expr::Index { target, index } => {
            collect_patterns(target, patterns);
            collect_patterns(index, patterns);
        }
        Expr::Unary { operand, .. } => collect_patterns(operand, patterns),
        Expr::Binary { op, left, right } => {
            if let (BinaryOp::Matches, Expr::Literal(Value::String(pattern))) = (op, right.as_ref()) {
                if let Ok(re) = Regex::new(pattern) {
                    patterns.entry(pattern.clone()).or_insert(re);
                }
            }
            collect_patterns(left, patterns);
            collect_patterns(right, patterns);
        }
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            collect_patterns(condition, patterns);
            collect_patterns(then, patterns);
            collect_patterns(otherwise, patterns);
        }
        Expr::Call { args, .. } | Expr::List(args) => {
            for arg in args {
                collect_patterns(arg, patterns);
            }
        }
    }
}

/// Avalia `expr` no ambiente dado.
pub fn eval(expr: &Expr, env: &dyn Environment, patterns: &Patterns) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Identifier(name) => env
            .lookup(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
        Expr::Member { target, field } => match eval(target, env, patterns)? {
            // Campo ausente em estrutura é nil, não erro
            Value::Map(fields) => Ok(fields.get(field).cloned().unwrap_or_default()),
            other => Err(runtime(format!(
                "cannot access field '{}' of {}",
                field,
                other.type_name()
            ))),
        },
        Expr::Index { target, index } => {
            let target = eval(target, env, patterns)?;
            let index = eval(index, env, patterns)?;
            eval_index(target, index)
        }
        Expr::Unary { op, operand } => {
            let value = eval(operand, env, patterns)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, other) => Err(runtime(format!("cannot negate {}", other.type_name()))),
                (UnaryOp::Neg, other) => Err(runtime(format!(
                    "cannot apply unary minus to {}",
                    other.type_name()
                ))),
            }
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, env, patterns),
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => match eval(condition, env, patterns)? {
            Value::Bool(true) => eval(then, env, patterns),
            Value::Bool(false) => eval(otherwise, env, patterns),
            other => Err(runtime(format!(
                "condition must be bool, got {}",
                other.type_name()
            ))),
        },
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, env, patterns))
                .collect::<Result<Vec<_>, _>>()?;
            call(function, values)
        }
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, env, patterns))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &dyn Environment,
    patterns: &Patterns,
) -> Result<Value, ExprError> {
    // Curto-circuito: o lado direito só é avaliado quando necessário
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let l = expect_bool(eval(left, env, patterns)?, op)?;
        return match (op, l) {
            (BinaryOp::And, false) => Ok(Value::Bool(false)),
            (BinaryOp::Or, true) => Ok(Value::Bool(true)),
            _ => Ok(Value::Bool(expect_bool(eval(right, env, patterns)?, op)?)),
        };
    }

    let l = eval(left, env, patterns)?;
    let r = eval(right, env, patterns)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(l == r)),
        BinaryOp::NotEq => Ok(Value::Bool(l != r)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, &l, &r),
        BinaryOp::In => contains(&r, &l).map(Value::Bool),
        BinaryOp::Contains => contains(&l, &r).map(Value::Bool),
        BinaryOp::StartsWith | BinaryOp::EndsWith => match (&l, &r) {
            (Value::String(s), Value::String(affix)) => Ok(Value::Bool(if op == BinaryOp::StartsWith {
                s.starts_with(affix.as_str())
            } else {
                s.ends_with(affix.as_str())
            })),
            _ => Err(type_mismatch(op, &l, &r)),
        },
        BinaryOp::Matches => match (&l, &r) {
            (Value::String(s), Value::String(pattern)) => match patterns.get(pattern) {
                Some(re) => Ok(Value::Bool(re.is_match(s))),
                None => {
                    // Padrão calculado em tempo de execução
                    let re = Regex::new(pattern)
                        .map_err(|e| runtime(format!("invalid pattern '{}': {}", pattern, e)))?;
                    Ok(Value::Bool(re.is_match(s)))
                }
            },
            _ => Err(type_mismatch(op, &l, &r)),
        },
        BinaryOp::Add => match (l, r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (l, r) => Err(type_mismatch(op, &l, &r)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (a, b) = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => (*a, *b),
                _ => return Err(type_mismatch(op, &l, &r)),
            };
            match op {
                BinaryOp::Sub => Ok(Value::Number(a - b)),
                BinaryOp::Mul => Ok(Value::Number(a * b)),
                BinaryOp::Div | BinaryOp::Mod if b == 0.0 => Err(runtime("division by zero")),
                BinaryOp::Div => Ok(Value::Number(a / b)),
                _ => Ok(Value::Number(a % b)),
            }
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn compare(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, ExprError> {
    let ordering = match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => return Err(type_mismatch(op, l, r)),
    };
    // NaN não é comparável: toda comparação é falsa
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    Ok(Value::Bool(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }))
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, ExprError> {
    match (haystack, needle) {
        (Value::List(items), needle) => Ok(items.contains(needle)),
        (Value::Map(fields), Value::String(key)) => Ok(fields.contains_key(key)),
        (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
        _ => Err(runtime(format!(
            "cannot search {} in {}",
            needle.type_name(),
            haystack.type_name()
        ))),
    }
}

fn eval_index(target: Value, index: Value) -> Result<Value, ExprError> {
    match (target, index) {
        (Value::Map(fields), Value::String(key)) => Ok(fields.get(&key).cloned().unwrap_or_default()),
        (Value::List(items), Value::Number(n)) => {
            if n < 0.0 || n.fract() != 0.0 || n as usize >= items.len() {
                return Err(runtime(format!("index {} out of range (len {})", n, items.len())));
            }
            Ok(items[n as usize].clone())
        }
        (target, index) => Err(runtime(format!(
            "cannot index {} with {}",
            target.type_name(),
            index.type_name()
        ))),
    }
}

fn call(function: &str, args: Vec<Value>) -> Result<Value, ExprError> {
    let [arg] = <[Value; 1]>::try_from(args)
        .map_err(|args| runtime(format!("{}() takes 1 argument, got {}", function, args.len())))?;

    match (function, arg) {
        ("len", Value::String(s)) => Ok(Value::Number(s.chars().count() as f64)),
        ("len", Value::List(items)) => Ok(Value::Number(items.len() as f64)),
        ("len", Value::Map(fields)) => Ok(Value::Number(fields.len() as f64)),
        ("lower", Value::String(s)) => Ok(Value::String(s.to_lowercase())),
        ("upper", Value::String(s)) => Ok(Value::String(s.to_uppercase())),
        ("string", value) => Ok(Value::String(value.to_string())),
        ("abs", Value::Number(n)) => Ok(Value::Number(n.abs())),
        (function, arg) => Err(runtime(format!(
            "{}() does not accept {}",
            function,
            arg.type_name()
        ))),
    }
}

fn expect_bool(value: Value, op: BinaryOp) -> Result<bool, ExprError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(runtime(format!(
            "operands of {:?} must be bool, got {}",
            op,
            other.type_name()
        ))),
    }
}

fn type_mismatch(op: BinaryOp, l: &Value, r: &Value) -> ExprError {
    runtime(format!(
        "invalid operation {:?} between {} and {}",
        op,
        l.type_name(),
        r.type_name()
    ))
}

fn runtime(message: impl Into<String>) -> ExprError {
    ExprError::Runtime(message.into())
}
