//! # Value — Valor Dinâmico de um Fato
//!
//! Os fatos carregam valores de tipos variados: números de sinais vitais,
//! strings de status, booleanos de flags e estruturas inteiras (uma venda
//! com produto e preço, por exemplo).
//!
//! Em vez de um tipo "qualquer coisa" aberto, [`Value`] é uma **variante
//! fechada** com igualdade bem definida. É essa igualdade que decide se um
//! padrão de [`Contradiction`](crate::reasoning::Contradiction) ou de
//! [`Conclusion`](crate::reasoning::Conclusion) casa com um fato.
//!
//! ## Representação JSON
//!
//! | JSON | Variante |
//! |------|----------|
//! | `null` | `Null` |
//! | `true` / `false` | `Bool` |
//! | `41`, `41.0` | `Number` (sempre `f64`) |
//! | `"red"` | `String` |
//! | `[..]` | `List` |
//! | `{..}` | `Map` |
//!
//! Todos os números viram `f64`, então `41` e `41.0` são iguais.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Valor dinâmico de um fato ou resultado de expressão.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Ausência de valor (`nil` nas expressões).
    #[default]
    Null,
    /// Booleano.
    Bool(bool),
    /// Número (inteiros e reais).
    Number(f64),
    /// Texto.
    String(String),
    /// Lista ordenada.
    List(Vec<Value>),
    /// Estrutura com campos nomeados.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Nome do tipo, usado em mensagens de erro.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            // Inteiros aparecem sem ".0": "reward_3", não "reward_3.0"
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(fields) => {
                let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats_compare_equal() {
        let a: Value = serde_json::from_str("41").unwrap();
        let b: Value = serde_json::from_str("41.0").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn json_objects_become_maps() {
        let v: Value = serde_json::from_str(r#"{"product": "pizza", "price": 100}"#).unwrap();
        match v {
            Value::Map(fields) => {
                assert_eq!(fields.get("product"), Some(&Value::from("pizza")));
                assert_eq!(fields.get("price"), Some(&Value::from(100.0)));
            }
            other => panic!("esperava Map, veio {:?}", other),
        }
    }

    #[test]
    fn null_round_trips() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        assert_eq!(serde_json::to_string(&v).unwrap(), "null");
    }

    #[test]
    fn display_drops_integer_fraction() {
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
    }
}
