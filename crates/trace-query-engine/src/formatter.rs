//! Text rendering of query results.

use trace_query::{Conjunction, Goal, Vocabulary};

use crate::matcher::Binding;
use crate::significance::DiscoveryKind;
use crate::store::FactStore;

const HIGHLIGHT: &str = "\x1b[93m";
const RESET: &str = "\x1b[0m";
const BANNER_WIDTH: usize = 60;
const EXAMPLE_VARIABLES: [&str; 6] = ["X", "Y", "Z", "W", "V", "U"];

/// Renders bindings, empty results and significance banners.
///
/// # Example
///
/// ```rust
/// use trace_query::{Value, Vocabulary};
/// use trace_query_engine::{Binding, ResultFormatter};
///
/// let formatter = ResultFormatter::new(Vocabulary::all(), false);
///
/// assert_eq!(
///     formatter.format_matches(&[Binding::new(), Binding::new()]),
///     "Yes - found 2 matching fact(s).",
/// );
///
/// let mut binding = Binding::new();
/// binding.insert("Name".to_string(), Value::atom("init"));
/// binding.insert("Id".to_string(), Value::Int(1));
/// assert_eq!(
///     formatter.format_matches(&[binding]),
///     "Found 1 result(s):\n  1. Id = 1, Name = init",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    vocabulary: Vocabulary,
    color: bool,
}

impl ResultFormatter {
    /// Creates a formatter listing `vocabulary` in its hints.
    pub fn new(vocabulary: Vocabulary, color: bool) -> Self {
        Self { vocabulary, color }
    }

    /// Renders a non-empty binding list.
    ///
    /// All-empty bindings (a variable-free query) render as a count of
    /// matching facts; otherwise each binding is one numbered line with
    /// variables in name order.
    pub fn format_matches(&self, bindings: &[Binding]) -> String {
        if bindings.iter().all(Binding::is_empty) {
            return format!("Yes - found {} matching fact(s).", bindings.len());
        }

        let mut lines = Vec::with_capacity(bindings.len() + 1);
        lines.push(format!("Found {} result(s):", bindings.len()));
        for (i, binding) in bindings.iter().enumerate() {
            let pairs: Vec<String> = binding
                .iter()
                .map(|(var, value)| format!("{} = {}", var, value))
                .collect();
            lines.push(format!("  {}. {}", i + 1, pairs.join(", ")));
        }
        lines.join("\n")
    }

    /// Explains a predicate that has no facts at all.
    pub fn format_no_facts(&self, goal: &Goal) -> String {
        format!(
            "No facts found for predicate '{}'.\nAvailable predicates: {}",
            goal.predicate,
            self.vocabulary.names().join(", ")
        )
    }

    /// Explains an empty result for a simple goal.
    pub fn format_empty(&self, goal: &Goal, store: &FactStore) -> String {
        if !store.has_facts(goal.predicate) {
            return self.format_no_facts(goal);
        }

        if goal.has_variables() {
            [
                "No results found matching the pattern.",
                "",
                "Suggestions:",
                "  - Try using different constant values",
                "  - Use more general variables (e.g., all uppercase)",
                "  - Check if your constants match the data types in the facts",
            ]
            .join("\n")
        } else {
            let example: Vec<&str> = EXAMPLE_VARIABLES
                .iter()
                .copied()
                .take(goal.predicate.arity())
                .collect();
            [
                "No exact match found for the specified values.".to_string(),
                String::new(),
                "Suggestions:".to_string(),
                "  - Try using variables (uppercase) to see what values exist".to_string(),
                format!("  - Example: ?- {}({}).", goal.predicate, example.join(", ")),
                "  - Check your values for typos or incorrect data types".to_string(),
            ]
            .join("\n")
        }
    }

    /// Renders the result of a simple goal, with a banner when significant.
    pub fn format_simple(
        &self,
        goal: &Goal,
        bindings: &[Binding],
        store: &FactStore,
        discovery: Option<DiscoveryKind>,
    ) -> String {
        if bindings.is_empty() {
            return self.format_empty(goal, store);
        }
        let output = self.format_matches(bindings);
        match discovery {
            Some(kind) => self.highlight(&output, kind),
            None => output,
        }
    }

    /// Renders the outcome of a negated goal.
    pub fn format_negated(&self, goal: &Goal, succeeded: bool, store: &FactStore) -> String {
        if !store.has_facts(goal.predicate) {
            format!(
                "Yes - no facts found for '{}', so no matching fact exists.",
                goal.predicate
            )
        } else if succeeded {
            format!("Yes - no matching fact exists for {}.", goal)
        } else {
            format!("No - a matching fact exists for {}.", goal)
        }
    }

    /// Renders the result of a conjunction.
    pub fn format_compound(
        &self,
        conjunction: &Conjunction,
        bindings: &[Binding],
        store: &FactStore,
    ) -> String {
        if !bindings.is_empty() {
            return self.format_matches(bindings);
        }

        let missing = conjunction
            .conditions()
            .iter()
            .find(|c| !c.negated && !store.has_facts(c.goal.predicate));
        if let Some(condition) = missing {
            return self.format_no_facts(&condition.goal);
        }

        if conjunction.variables().is_empty() {
            format!(
                "No - no matching fact combination satisfies all {} conditions.",
                conjunction.len()
            )
        } else {
            format!(
                "No results satisfy all {} conditions.\n\nSuggestions:\n  \
                 - Check that shared variables can take the same value in each condition\n  \
                 - Try each condition on its own to see which one filters everything out",
                conjunction.len()
            )
        }
    }

    /// Wraps output in a banner naming the discovery.
    pub fn highlight(&self, output: &str, kind: DiscoveryKind) -> String {
        let (on, off) = if self.color { (HIGHLIGHT, RESET) } else { ("", "") };
        let rule = "=".repeat(BANNER_WIDTH);
        format!(
            "{on}{rule}\n{headline}\n{rule}{off}\n\n{output}\n\n\
             {on}This discovery may be important for the investigation.{off}",
            headline = kind.headline(),
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(Vocabulary::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FrameStatus, Record};
    use trace_query::{Condition, Predicate, Term, Value};

    fn formatter() -> ResultFormatter {
        ResultFormatter::new(Vocabulary::all(), false)
    }

    fn store() -> FactStore {
        FactStore::from_records(&[
            Record::new(1, "init", None, 1000, 2048, FrameStatus::Completed),
            Record::new(2, "load_config", Some(1), 1050, 4096, FrameStatus::Error),
        ])
        .unwrap()
    }

    fn status_goal(id: Term, status: Term) -> Goal {
        Goal::new(Predicate::Status, vec![id, status])
    }

    fn param_goal(id: Term) -> Goal {
        Goal::new(Predicate::Param, vec![id, Term::Anonymous, Term::Anonymous])
    }

    mod matches {
        use super::*;

        #[test]
        fn test_constant_query_mentions_matching_fact() {
            let text = formatter().format_matches(&[Binding::new()]);
            assert!(text.contains("matching fact"));
        }

        #[test]
        fn test_numbered_lines() {
            let bindings: Vec<Binding> = (1..=3)
                .map(|i| {
                    let mut b = Binding::new();
                    b.insert("X".to_string(), Value::Int(i));
                    b
                })
                .collect();
            let text = formatter().format_matches(&bindings);
            assert_eq!(text, "Found 3 result(s):\n  1. X = 1\n  2. X = 2\n  3. X = 3");
        }

        #[test]
        fn test_null_value_rendered() {
            let mut b = Binding::new();
            b.insert("V".to_string(), Value::Null);
            assert!(formatter().format_matches(&[b]).contains("V = null"));
        }
    }

    mod empty {
        use super::*;

        #[test]
        fn test_no_facts_lists_vocabulary() {
            let goal = param_goal(Term::var("F"));
            let text = formatter().format_empty(&goal, &store());
            assert_eq!(
                text,
                "No facts found for predicate 'param'.\n\
                 Available predicates: allocated, calls, frame, param, status"
            );
        }

        #[test]
        fn test_restricted_vocabulary_listed() {
            let formatter =
                ResultFormatter::new(Vocabulary::new([Predicate::Status, Predicate::Param]), false);
            let goal = param_goal(Term::var("F"));
            assert!(formatter
                .format_empty(&goal, &store())
                .ends_with("Available predicates: param, status"));
        }

        #[test]
        fn test_variable_and_constant_hints_differ() {
            let with_vars = formatter().format_empty(
                &status_goal(Term::var("X"), Term::constant("active")),
                &store(),
            );
            let constants = formatter().format_empty(
                &status_goal(Term::constant(1i64), Term::constant("error")),
                &store(),
            );
            assert!(with_vars.starts_with("No results found matching the pattern."));
            assert!(constants.starts_with("No exact match found"));
            assert!(constants.contains("Example: ?- status(X, Y)."));
            assert_ne!(with_vars, constants);
        }
    }

    mod negation_and_compound {
        use super::*;

        #[test]
        fn test_negated_texts() {
            let f = formatter();
            let s = store();
            let goal = status_goal(Term::constant(99i64), Term::constant("error"));
            assert_eq!(
                f.format_negated(&goal, true, &s),
                "Yes - no matching fact exists for status(99, error)."
            );
            assert_eq!(
                f.format_negated(&goal, false, &s),
                "No - a matching fact exists for status(99, error)."
            );
            let param = param_goal(Term::Anonymous);
            assert!(f.format_negated(&param, true, &s).contains("matching fact"));
        }

        #[test]
        fn test_compound_missing_predicate() {
            let conj = Conjunction::new(vec![
                Condition::positive(status_goal(Term::var("F"), Term::constant("error"))),
                Condition::positive(Goal::new(
                    Predicate::Param,
                    vec![Term::var("F"), Term::Anonymous, Term::Anonymous],
                )),
            ])
            .unwrap();
            let text = formatter().format_compound(&conj, &[], &store());
            assert!(text.starts_with("No facts found for predicate 'param'."));
        }

        #[test]
        fn test_compound_constant_only_mentions_matching_fact() {
            let conj = Conjunction::new(vec![
                Condition::positive(status_goal(Term::constant(1i64), Term::constant("error"))),
                Condition::positive(status_goal(Term::constant(2i64), Term::constant("error"))),
            ])
            .unwrap();
            assert!(formatter()
                .format_compound(&conj, &[], &store())
                .contains("matching fact"));
        }
    }

    mod banner {
        use super::*;

        #[test]
        fn test_plain_banner() {
            let text = formatter().highlight("Found 1 result(s):", DiscoveryKind::Error);
            assert!(text.starts_with(&"=".repeat(60)));
            assert!(text.contains("SIGNIFICANT: Error status detected!"));
            assert!(text.contains("Found 1 result(s):"));
            assert!(!text.contains('\x1b'));
        }

        #[test]
        fn test_colored_banner() {
            let formatter = ResultFormatter::new(Vocabulary::all(), true);
            let text = formatter.highlight("x", DiscoveryKind::Deadlock);
            assert!(text.starts_with(HIGHLIGHT));
            assert!(text.contains(RESET));
        }

        #[test]
        fn test_simple_wraps_only_when_significant() {
            let f = formatter();
            let s = store();
            let goal = status_goal(Term::var("X"), Term::constant("error"));
            let mut b = Binding::new();
            b.insert("X".to_string(), Value::Int(2));
            let bindings = vec![b];
            let plain = f.format_simple(&goal, &bindings, &s, None);
            let wrapped = f.format_simple(&goal, &bindings, &s, Some(DiscoveryKind::Error));
            assert_eq!(plain, "Found 1 result(s):\n  1. X = 2");
            assert!(wrapped.contains(&plain));
            assert!(wrapped.contains("SIGNIFICANT"));
        }
    }
}
