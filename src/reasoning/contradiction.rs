//! Contradições: conjuntos de fatos que não podem coexistir.
//!
//! Quando **todos** os fatos-padrão estão presentes com o valor exato, a
//! contradição é detectada e resolvida apagando cada um deles e seus
//! dependentes diretos (um nível, acumulativos inclusive).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{remove_derived_from, Fact};

/// Padrão de fatos mutuamente exclusivos.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(default)]
    pub description: String,

    /// Padrões; só `id` e `value` contam.
    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl Contradiction {
    /// `true` se todo padrão está presente com valor igual.
    pub fn detect(&self, facts: &HashMap<String, Fact>) -> bool {
        self.facts
            .iter()
            .all(|pattern| facts.get(&pattern.id).is_some_and(|f| f.value == pattern.value))
    }

    /// Apaga os fatos do padrão e seus dependentes diretos.
    ///
    /// Retorna quantos fatos foram removidos ao todo.
    pub fn resolve(&self, facts: &mut HashMap<String, Fact>) -> usize {
        let mut removed = 0;
        for pattern in &self.facts {
            if facts.remove(&pattern.id).is_some() {
                removed += 1;
            }
            removed += remove_derived_from(facts, &pattern.id, false);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(list: Vec<Fact>) -> HashMap<String, Fact> {
        list.into_iter().map(|f| (f.id.clone(), f)).collect()
    }

    fn raining_and_sunny() -> Contradiction {
        Contradiction {
            description: "Chuva e sol ao mesmo tempo".into(),
            facts: vec![Fact::new("raining", true), Fact::new("sunny", true)],
        }
    }

    #[test]
    fn detect_requires_every_pattern() {
        let c = raining_and_sunny();
        assert!(c.detect(&store(vec![Fact::new("raining", true), Fact::new("sunny", true)])));
        assert!(!c.detect(&store(vec![Fact::new("raining", true)])));
        assert!(!c.detect(&store(vec![Fact::new("raining", true), Fact::new("sunny", false)])));
    }

    /// Remove padrões e dependentes diretos, inclusive acumulativos, mas
    /// não toca em fatos sem relação nem em netos.
    #[test]
    fn resolve_removes_patterns_and_direct_dependents() {
        let c = raining_and_sunny();
        let mut facts = store(vec![
            Fact::new("raining", true),
            Fact::new("sunny", true),
            Fact::new("umbrella", true).derived_from(["raining"]),
            Fact::new("rain_days", 3.0).derived_from(["raining"]).accumulative(true),
            Fact::new("wet_shoes", true).derived_from(["umbrella"]),
            Fact::new("temperature", 25.0),
        ]);

        let removed = c.resolve(&mut facts);

        assert_eq!(removed, 4);
        let mut left: Vec<&str> = facts.keys().map(String::as_str).collect();
        left.sort();
        assert_eq!(left, vec!["temperature", "wet_shoes"]);
    }
}
