//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! These tests ensure determinism and round-trip invariants over generated
//! modules and staged bodies.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use strata_core::{
    decode_payload, serialize_module, Callable, Declaration, DeclarationFlags, DeclarationOrigin,
    Module, Parameter, QualifiedName, Stage, StageController, Statement, StatementId,
    StatementKind, StrataError,
};

// =============================================================================
// GENERATORS
// =============================================================================

/// A generated callable: name, parameter-type names, flag bits, synthetic?
fn arb_callable() -> impl Strategy<Value = (String, Vec<String>, u32, bool)> {
    (
        "[a-z]{1,6}\\.[a-z]{1,8}",
        vec("[a-z]{1,6}\\.[A-Z][a-z]{0,6}", 0..4),
        any::<u32>(),
        any::<bool>(),
    )
}

fn build_module(callables: &[(String, Vec<String>, u32, bool)]) -> Module {
    let mut module = Module::new("gen");
    for (name, param_types, flags, synthetic) in callables {
        let parameters = param_types
            .iter()
            .enumerate()
            .map(|(i, ty)| Parameter::new(format!("p{i}"), QualifiedName::new(ty.clone())))
            .collect();
        let origin = if *synthetic {
            DeclarationOrigin::SyntheticOverride
        } else {
            DeclarationOrigin::UserWritten
        };
        let callable = Callable::new(QualifiedName::new(name.clone()), parameters)
            .with_flags(DeclarationFlags::from_bits(*flags))
            .with_origin(origin);
        module.push_declaration(Declaration::Callable(callable));
    }
    module
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The decoded record set matches the module's user-written declaration
    /// set exactly: name, parameter-type tuple, and flag bits.
    #[test]
    fn roundtrip_preserves_declaration_set(
        callables in vec(arb_callable(), 0..20)
    ) {
        let module = build_module(&callables);

        let payload = serialize_module(&module).expect("serialize");
        let records = decode_payload(payload.as_bytes()).expect("decode");

        let decoded: BTreeSet<(QualifiedName, Vec<QualifiedName>, u32)> = records
            .into_iter()
            .map(|r| (r.name, r.parameter_types, r.flags))
            .collect();

        let expected: BTreeSet<(QualifiedName, Vec<QualifiedName>, u32)> = module
            .callables()
            .into_iter()
            .filter(|c| c.origin == DeclarationOrigin::UserWritten)
            .map(|c| {
                (
                    c.name.clone(),
                    c.parameters.iter().map(|p| p.ty.name().clone()).collect(),
                    c.flags.bits(),
                )
            })
            .collect();

        prop_assert_eq!(decoded, expected);
    }

    /// Serializing the same module twice produces identical bytes.
    #[test]
    fn serialization_is_deterministic(
        callables in vec(arb_callable(), 0..20)
    ) {
        let module = build_module(&callables);

        let first = serialize_module(&module).expect("first");
        let second = serialize_module(&module).expect("second");

        prop_assert_eq!(first.as_bytes(), second.as_bytes());
    }

    /// Flag bits survive the round-trip exactly, whatever they are.
    #[test]
    fn flag_bits_roundtrip_exactly(bits in any::<u32>()) {
        let mut module = Module::new("m");
        module.push_declaration(Declaration::Callable(
            Callable::new(QualifiedName::new("m.f"), Vec::new())
                .with_flags(DeclarationFlags::from_bits(bits)),
        ));

        let payload = serialize_module(&module).expect("serialize");
        let records = decode_payload(payload.as_bytes()).expect("decode");

        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].flags, bits);
    }

    /// The stage controller is strictly monotonic over any advance count.
    #[test]
    fn stage_controller_is_monotonic(advances in 1usize..200) {
        let stages = StageController::new();
        let mut previous = stages.current();

        for _ in 0..advances {
            let next = stages.advance();
            prop_assert!(next > previous);
            previous = next;
        }
        prop_assert_eq!(stages.current(), Stage(advances as u64));
    }

    /// Whatever was sealed at a stage is what a replay read at that stage
    /// materializes, regardless of later mutation.
    #[test]
    fn sealed_carrier_replays_exactly(
        first in vec(0u64..1000, 0..10),
        second in vec(0u64..1000, 0..10)
    ) {
        let stages = StageController::new();
        let mut tree = strata_core::IrTree::new();
        let id = tree
            .insert_body(&stages, strata_core::DeclarationId(1), 0, 100)
            .expect("insert");

        let to_statements = |ids: &[u64]| -> Vec<Statement> {
            ids.iter()
                .map(|&i| Statement::new(StatementId(i), StatementKind::Return))
                .collect()
        };

        let s1 = stages.advance();
        let body = tree.body_mut(id).expect("body");
        body.set_children(&stages, to_statements(&first)).expect("set first");
        body.seal(&stages).expect("seal first");

        stages.advance();
        body.set_children(&stages, to_statements(&second)).expect("set second");
        body.seal(&stages).expect("seal second");

        let replay = StageController::starting_at(s1);
        let materialized = body.children(&replay).expect("replay").clone();
        prop_assert_eq!(materialized, to_statements(&first));
    }

    /// Truncating a payload below its header is always reported as a
    /// corrupt container, never a panic or a partial decode.
    #[test]
    fn truncated_payloads_are_corrupt(len in 0usize..5) {
        let payload = serialize_module(&Module::new("m")).expect("serialize");
        let truncated = &payload.as_bytes()[..len];

        prop_assert!(matches!(
            decode_payload(truncated),
            Err(StrataError::ContainerCorrupt(_))
        ));
    }
}
