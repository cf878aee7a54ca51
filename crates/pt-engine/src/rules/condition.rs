// crates/pt-engine/src/rules/condition.rs
//
// Conditions are opaque predicates on the currently-transferred value.
// The evaluator is an external collaborator from this engine's point
// of view — a trait boundary with only the trivial "always true"
// implementation shipped, keeping the condition-string parser (its
// source format is out of scope here) behind a small trait rather than
// hard-wired into the dispatch path.

use pt_types::Value;

pub trait ConditionEvaluator {
    /// Unset / empty conditions evaluate to true. No side effects.
    fn evaluate(&self, condition: Option<&str>, value: &Value) -> bool;
}

/// Default evaluator: accepts only the trivial "always true" case.
/// Richer semantics are expected to extend this trait later.
pub struct AlwaysTrueEvaluator;

impl ConditionEvaluator for AlwaysTrueEvaluator {
    fn evaluate(&self, _condition: Option<&str>, _value: &Value) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_true_ignores_condition_text() {
        let evaluator = AlwaysTrueEvaluator;
        assert!(evaluator.evaluate(Some("x > 5"), &Value::Int32(1)));
        assert!(evaluator.evaluate(None, &Value::Int32(1)));
    }
}
