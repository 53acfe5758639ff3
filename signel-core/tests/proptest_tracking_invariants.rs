//! Property-based invariant tests for dependency tracking.
//!
//! These hold for any sequence of writes:
//!
//! 1. An effect re-runs exactly once per value-changing write, never for an
//!    equal write, and ends up observing the final value.
//! 2. Accumulate tracking: an effect depends on every field it has ever read.
//! 3. Refresh tracking: an effect depends on exactly the fields of its last run.
//! 4. A reactive list notifies once on subscribe and once per mutation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{json, Value};

use signel_core::reactive::{ContextConfig, ReactiveList, ReactivityContext, TrackingMode};

const FIELDS: [&str; 4] = ["f0", "f1", "f2", "f3"];

// ── Helpers ─────────────────────────────────────────────────────────────

/// Effect that reads `mask`, then every `fN` whose bit is set in it.
fn masked_reader(tracking: TrackingMode) -> (ReactivityContext, signel_core::ReactiveObject) {
    let ctx = ReactivityContext::with_config(ContextConfig::default().with_tracking(tracking));
    let state = ctx.wrap([
        ("mask", 0),
        ("f0", 0),
        ("f1", 0),
        ("f2", 0),
        ("f3", 0),
    ]);
    (ctx, state)
}

fn run_masked_reader(
    ctx: &ReactivityContext,
    state: &signel_core::ReactiveObject,
) -> signel_core::EffectHandle {
    let state = state.clone();
    ctx.run(move || {
        let mask = state.get_as::<u8>("mask").unwrap_or_default();
        for (bit, field) in FIELDS.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                state.get(field);
            }
        }
    })
}

#[derive(Debug, Clone)]
enum ListOp {
    Set(usize, i32),
    Push(i32),
    Pop,
    Truncate(usize),
    Clear,
}

fn list_op_strategy() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        (0usize..8, any::<i32>()).prop_map(|(i, v)| ListOp::Set(i, v)),
        any::<i32>().prop_map(ListOp::Push),
        Just(ListOp::Pop),
        (0usize..8).prop_map(ListOp::Truncate),
        Just(ListOp::Clear),
    ]
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reruns_match_value_changes(writes in proptest::collection::vec(0i64..4, 0..40)) {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("value", 0)]);
        let observed = Arc::new(Mutex::new(Value::Null));

        let effect = {
            let state = state.clone();
            let observed = observed.clone();
            ctx.run(move || *observed.lock() = state.get("value"))
        };

        let mut current = 0i64;
        let mut changes = 0usize;
        for value in &writes {
            let changed = state.set("value", *value);
            prop_assert_eq!(changed, *value != current);
            if changed {
                changes += 1;
                current = *value;
            }
        }

        prop_assert_eq!(effect.run_count(), 1 + changes);
        prop_assert_eq!(observed.lock().clone(), json!(current));
    }

    #[test]
    fn accumulate_never_forgets(masks in proptest::collection::vec(0u8..16, 1..20)) {
        let (ctx, state) = masked_reader(TrackingMode::Accumulate);
        let effect = run_masked_reader(&ctx, &state);

        let mut ever_read = 0u8;
        for mask in &masks {
            state.set("mask", *mask);
            ever_read |= *mask;
            // `mask` itself plus every field read in any run so far.
            prop_assert_eq!(effect.dependency_count(), 1 + ever_read.count_ones() as usize);
        }
    }

    #[test]
    fn refresh_tracks_last_run_only(masks in proptest::collection::vec(0u8..16, 1..20)) {
        let (ctx, state) = masked_reader(TrackingMode::Refresh);
        let effect = run_masked_reader(&ctx, &state);

        let mut last = 0u8;
        for mask in &masks {
            state.set("mask", *mask);
            last = *mask;
            prop_assert_eq!(effect.dependency_count(), 1 + last.count_ones() as usize);
        }

        // Fields outside the last mask no longer re-run the effect.
        let before = effect.run_count();
        for (bit, field) in FIELDS.iter().enumerate() {
            if last & (1 << bit) == 0 {
                state.set(field, 99);
            }
        }
        prop_assert_eq!(effect.run_count(), before);
    }

    #[test]
    fn list_notifies_once_per_mutation(
        initial in proptest::collection::vec(any::<i32>(), 0..8),
        ops in proptest::collection::vec(list_op_strategy(), 0..30),
    ) {
        let list = ReactiveList::new(initial.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _subscription = list.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut model = initial;
        let mut expected = 1usize;
        for op in ops {
            match op {
                ListOp::Set(index, value) => {
                    let ok = list.set(index, value).is_ok();
                    prop_assert_eq!(ok, index <= model.len());
                    if ok {
                        if index == model.len() {
                            model.push(value);
                        } else {
                            model[index] = value;
                        }
                        expected += 1;
                    }
                }
                ListOp::Push(value) => {
                    list.push(value);
                    model.push(value);
                    expected += 1;
                }
                ListOp::Pop => {
                    prop_assert_eq!(list.pop(), model.pop());
                    expected += 1;
                }
                ListOp::Truncate(len) => {
                    list.truncate(len);
                    model.truncate(len);
                    expected += 1;
                }
                ListOp::Clear => {
                    list.clear();
                    model.clear();
                    expected += 1;
                }
            }
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), expected);
        prop_assert_eq!(list.to_vec(), model);
    }
}
