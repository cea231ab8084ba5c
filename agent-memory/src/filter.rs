//! Typed filter AST for [`search`](crate::memory::Memory::search).
//!
//! Filters are composed programmatically, not parsed from a query string —
//! every field reference is checked against the collection's declared
//! payload type at evaluation time, so a malformed filter surfaces as a
//! `SchemaViolation` rather than silently matching nothing.

use crate::model::{Payload, Scalar};

/// A single field condition.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    Eq(String, Scalar),
    Neq(String, Scalar),
    In(String, Vec<Scalar>),
    Range {
        field: String,
        gte: Option<Scalar>,
        lte: Option<Scalar>,
        gt: Option<Scalar>,
        lt: Option<Scalar>,
    },
    And(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Builds a conjunction of `Eq` conditions, the common case (spec 4.3's
    /// `{matched: false}`, `{brand, platform, published: true}` filters).
    #[must_use]
    pub fn all_eq(conditions: impl IntoIterator<Item = (String, Scalar)>) -> Self {
        FilterExpr::And(
            conditions
                .into_iter()
                .map(|(field, value)| FilterExpr::Eq(field, value))
                .collect(),
        )
    }

    /// Evaluates this filter against a document payload. A field absent from
    /// the payload never matches `Eq`/`In`/`Range` and always matches `Neq`.
    #[must_use]
    pub fn matches(&self, payload: &Payload) -> bool {
        match self {
            FilterExpr::Eq(field, value) => payload.get(field) == Some(value),
            FilterExpr::Neq(field, value) => payload.get(field) != Some(value),
            FilterExpr::In(field, values) => {
                payload.get(field).is_some_and(|v| values.contains(v))
            }
            FilterExpr::Range { field, gte, lte, gt, lt } => {
                let Some(actual) = payload.get(field) else {
                    return false;
                };
                Self::bound_ok(actual, gte.as_ref(), |a, b| a >= b)
                    && Self::bound_ok(actual, lte.as_ref(), |a, b| a <= b)
                    && Self::bound_ok(actual, gt.as_ref(), |a, b| a > b)
                    && Self::bound_ok(actual, lt.as_ref(), |a, b| a < b)
            }
            FilterExpr::And(exprs) => exprs.iter().all(|e| e.matches(payload)),
        }
    }

    fn bound_ok(actual: &Scalar, bound: Option<&Scalar>, cmp: impl Fn(f64, f64) -> bool) -> bool {
        let Some(bound) = bound else { return true };
        match (Self::as_f64(actual), Self::as_f64(bound)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }

    fn as_f64(scalar: &Scalar) -> Option<f64> {
        match scalar {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Date(d) => Some(d.num_days_from_ce() as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, Scalar)]) -> Payload {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn eq_matches_equal_value_only() {
        let p = payload(&[("matched", Scalar::Bool(false))]);
        assert!(FilterExpr::Eq("matched".into(), Scalar::Bool(false)).matches(&p));
        assert!(!FilterExpr::Eq("matched".into(), Scalar::Bool(true)).matches(&p));
    }

    #[test]
    fn and_requires_every_clause() {
        let p = payload(&[
            ("brand", Scalar::Str("pomandi".into())),
            ("published", Scalar::Bool(true)),
        ]);
        let f = FilterExpr::all_eq([
            ("brand".to_string(), Scalar::Str("pomandi".into())),
            ("published".to_string(), Scalar::Bool(true)),
        ]);
        assert!(f.matches(&p));

        let f2 = FilterExpr::all_eq([
            ("brand".to_string(), Scalar::Str("other".into())),
            ("published".to_string(), Scalar::Bool(true)),
        ]);
        assert!(!f2.matches(&p));
    }

    #[test]
    fn range_bounds_numeric_fields() {
        let p = payload(&[("amount", Scalar::Float(22.70))]);
        let f = FilterExpr::Range {
            field: "amount".into(),
            gte: Some(Scalar::Float(20.0)),
            lte: Some(Scalar::Float(25.0)),
            gt: None,
            lt: None,
        };
        assert!(f.matches(&p));
    }
}
