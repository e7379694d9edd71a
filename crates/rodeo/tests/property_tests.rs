//! Property-based tests for the classifier and table model.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p rodeo --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p rodeo --test property_tests
//! ```

use proptest::prelude::*;

use rodeo::{
    classify, sanitize_name, ColumnDef, Domain, PredictorRegistry, PrimitiveType, Table,
};

// =============================================================================
// Test Strategies
// =============================================================================

fn primitive_type() -> impl Strategy<Value = PrimitiveType> {
    prop_oneof![
        Just(PrimitiveType::Int),
        Just(PrimitiveType::Float),
        Just(PrimitiveType::Date),
        Just(PrimitiveType::Boolean),
        Just(PrimitiveType::String),
    ]
}

fn column() -> impl Strategy<Value = ColumnDef> {
    ("[a-z_]{1,12}", primitive_type()).prop_map(|(name, ty)| ColumnDef::new(name, ty))
}

// =============================================================================
// Classifier
// =============================================================================

proptest! {
    #[test]
    fn classify_never_panics(value in "\\PC{0,64}") {
        let _ = classify(&value);
    }

    #[test]
    fn classify_is_deterministic(value in "\\PC{0,64}") {
        prop_assert_eq!(classify(&value), classify(&value));
    }

    #[test]
    fn classify_ignores_surrounding_whitespace(value in "[ -~]{0,32}") {
        let padded = format!("  {}\t", value);
        prop_assert_eq!(classify(&padded), classify(&value));
    }

    #[test]
    fn small_integers_are_int(n in -1_000_000i64..1_000_000) {
        prop_assert_eq!(classify(&n.to_string()), PrimitiveType::Int);
    }

    #[test]
    fn leading_zeros_are_identifiers(digits in "0[0-9]{1,10}") {
        prop_assert_eq!(classify(&digits), PrimitiveType::String);
    }

    #[test]
    fn decimals_are_float(whole in 0u32..100_000, frac in 0u32..1000) {
        let value = format!("{}.{}", whole, frac);
        prop_assert_eq!(classify(&value), PrimitiveType::Float);
    }

    #[test]
    fn iso_dates_are_date(y in 1000i32..3000, m in 1u32..=12, d in 1u32..=28) {
        let value = format!("{:04}-{:02}-{:02}", y, m, d);
        prop_assert_eq!(classify(&value), PrimitiveType::Date);
    }
}

// =============================================================================
// Table Model
// =============================================================================

proptest! {
    #[test]
    fn extend_schema_is_idempotent(columns in prop::collection::vec(column(), 0..20)) {
        let mut table = Table::standalone("t", "t.csv");

        table.extend_schema(columns.clone());
        let len = table.schema.len();
        let added = table.extend_schema(columns);

        prop_assert!(added.is_empty());
        prop_assert_eq!(table.schema.len(), len);
    }

    #[test]
    fn extend_schema_has_no_duplicate_pairs(columns in prop::collection::vec(column(), 0..30)) {
        let mut table = Table::directory("d", "d");
        table.extend_schema(columns);

        for (i, a) in table.schema.iter().enumerate() {
            for b in &table.schema[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn sanitized_names_have_no_separators(name in "[a-zA-Z0-9 /_\\-]{0,40}") {
        let sanitized = sanitize_name(&name);
        prop_assert!(!sanitized.contains(' '));
        prop_assert!(!sanitized.contains('/'));
        prop_assert!(!sanitized.contains('-'));
        prop_assert_eq!(sanitize_name(&sanitized), sanitized.clone());
    }
}

// =============================================================================
// Predictor Registry
// =============================================================================

proptest! {
    #[test]
    fn find_predictors_is_stable(value in "[ -~]{0,120}") {
        let registry = PredictorRegistry::new();
        let domain = Domain::Value(classify(&value));

        let first: Vec<_> = registry
            .find_predictors(domain, &value)
            .iter()
            .map(|p| p.id())
            .collect();
        let second: Vec<_> = registry
            .find_predictors(domain, &value)
            .iter()
            .map(|p| p.id())
            .collect();

        prop_assert_eq!(&first, &second);
        let mut sorted = first.clone();
        sorted.sort();
        prop_assert_eq!(first, sorted);
    }

    #[test]
    fn numeric_values_never_enriched(n in any::<i64>()) {
        let registry = PredictorRegistry::new();
        let value = n.to_string();
        prop_assert!(registry
            .find_predictors(Domain::Value(classify(&value)), &value)
            .is_empty());
    }
}
