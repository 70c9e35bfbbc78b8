//! Flat pattern matching of goals against stored facts.
//!
//! No clause resolution happens here: a goal matches a fact when the arities
//! agree and every argument position unifies with the fact's value.

use std::collections::BTreeMap;

use trace_query::{Goal, Term, Value};

use crate::store::{Fact, FactStore};

/// Variable → value assignment produced by a successful match.
///
/// Never contains the anonymous variable `_`.
pub type Binding = BTreeMap<String, Value>;

/// Matches one fact against a goal's arguments.
///
/// Returns the binding for the named variables, or `None` when the arity
/// differs, a constant disagrees, or a repeated variable sees two
/// different values.
///
/// # Example
///
/// ```rust
/// use trace_query::{Predicate, Term, Value};
/// use trace_query_engine::{match_fact, Fact};
///
/// let fact = Fact::new(Predicate::Calls, vec![Value::Int(1), Value::Int(2)]);
/// let binding = match_fact(&[Term::constant(1i64), Term::var("Y")], &fact).unwrap();
/// assert_eq!(binding["Y"], Value::Int(2));
///
/// assert!(match_fact(&[Term::var("X"), Term::var("X")], &fact).is_none());
/// ```
pub fn match_fact(args: &[Term], fact: &Fact) -> Option<Binding> {
    if args.len() != fact.values.len() {
        return None;
    }

    let mut binding = Binding::new();
    for (term, value) in args.iter().zip(&fact.values) {
        match term {
            Term::Anonymous => {}
            Term::Variable(name) => match binding.get(name) {
                Some(bound) if bound != value => return None,
                Some(_) => {}
                None => {
                    binding.insert(name.clone(), value.clone());
                }
            },
            Term::Constant(expected) => {
                if expected != value {
                    return None;
                }
            }
        }
    }
    Some(binding)
}

/// Every binding produced by matching `goal` against the store, in store order.
///
/// A predicate with no facts yields an empty result.
pub fn match_goal(goal: &Goal, store: &FactStore) -> Vec<Binding> {
    store
        .facts(goal.predicate)
        .iter()
        .filter_map(|fact| match_fact(&goal.args, fact))
        .collect()
}

/// Replaces variables bound in `binding` with constants.
pub fn substitute(goal: &Goal, binding: &Binding) -> Goal {
    let args = goal
        .args
        .iter()
        .map(|term| match term {
            Term::Variable(name) => match binding.get(name) {
                Some(value) => Term::Constant(value.clone()),
                None => term.clone(),
            },
            other => other.clone(),
        })
        .collect();
    Goal::new(goal.predicate, args)
}

/// Combines two bindings, or `None` if they disagree on a shared variable.
pub fn merge(left: &Binding, right: &Binding) -> Option<Binding> {
    let mut merged = left.clone();
    for (name, value) in right {
        match merged.get(name) {
            Some(existing) if existing != value => return None,
            Some(_) => {}
            None => {
                merged.insert(name.clone(), value.clone());
            }
        }
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_query::Predicate;

    fn frame(id: i64, name: &str, ts: i64, status: &str) -> Fact {
        Fact::new(
            Predicate::Frame,
            vec![
                Value::Int(id),
                Value::atom(name),
                Value::Int(ts),
                Value::atom(status),
            ],
        )
    }

    fn store() -> FactStore {
        let mut store = FactStore::new();
        store.insert(frame(1, "init", 1000, "completed")).unwrap();
        store.insert(frame(2, "load", 1050, "active")).unwrap();
        store.insert(frame(3, "proc", 1100, "error")).unwrap();
        store
    }

    mod matching {
        use super::*;

        #[test]
        fn test_anonymous_matches_without_binding() {
            let fact = frame(1, "init", 1000, "completed");
            let args = vec![Term::Anonymous, Term::Anonymous, Term::Anonymous, Term::Anonymous];
            assert_eq!(match_fact(&args, &fact), Some(Binding::new()));
        }

        #[test]
        fn test_constant_mismatch_rejects() {
            let fact = frame(1, "init", 1000, "completed");
            let args = vec![
                Term::Anonymous,
                Term::Anonymous,
                Term::Anonymous,
                Term::constant("error"),
            ];
            assert!(match_fact(&args, &fact).is_none());
        }

        #[test]
        fn test_arity_mismatch_rejects() {
            let fact = frame(1, "init", 1000, "completed");
            assert!(match_fact(&[Term::var("X")], &fact).is_none());
        }

        #[test]
        fn test_repeated_variable_requires_equal_values() {
            let same = Fact::new(Predicate::Calls, vec![Value::Int(4), Value::Int(4)]);
            let binding = match_fact(&[Term::var("X"), Term::var("X")], &same).unwrap();
            assert_eq!(binding.len(), 1);
            assert_eq!(binding["X"], Value::Int(4));
        }

        #[test]
        fn test_numeric_constant_matches_float_fact() {
            let fact = Fact::new(Predicate::Allocated, vec![Value::Int(1), Value::Float(2048.0)]);
            assert!(match_fact(&[Term::Anonymous, Term::constant(2048i64)], &fact).is_some());
        }

        #[test]
        fn test_match_goal_store_order() {
            let goal = Goal::new(
                Predicate::Frame,
                vec![Term::var("Id"), Term::var("Name"), Term::Anonymous, Term::Anonymous],
            );
            let ids: Vec<Value> = match_goal(&goal, &store())
                .into_iter()
                .map(|b| b["Id"].clone())
                .collect();
            assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        }

        #[test]
        fn test_match_goal_absent_predicate() {
            let goal = Goal::new(Predicate::Calls, vec![Term::var("X"), Term::var("Y")]);
            assert!(match_goal(&goal, &store()).is_empty());
        }
    }

    mod substitution {
        use super::*;

        #[test]
        fn test_substitute_bound_variables_only() {
            let goal = Goal::new(
                Predicate::Param,
                vec![Term::var("F"), Term::var("N"), Term::Anonymous],
            );
            let mut binding = Binding::new();
            binding.insert("F".to_string(), Value::Int(3));
            let substituted = substitute(&goal, &binding);
            assert_eq!(
                substituted.args,
                vec![Term::constant(3i64), Term::var("N"), Term::Anonymous]
            );
        }

        #[test]
        fn test_merge_disjoint_and_conflicting() {
            let mut a = Binding::new();
            a.insert("X".to_string(), Value::Int(1));
            let mut b = Binding::new();
            b.insert("Y".to_string(), Value::atom("init"));
            let merged = merge(&a, &b).unwrap();
            assert_eq!(merged.len(), 2);

            let mut c = Binding::new();
            c.insert("X".to_string(), Value::Int(2));
            assert!(merge(&a, &c).is_none());
        }
    }
}
