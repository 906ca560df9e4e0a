//! Partition law: for any valid sequence of transitions on one id, the
//! archived windows plus the live window tile time per incarnation, and
//! AS OF agrees with a replay of the sequence.

use proptest::prelude::*;

use saga_core::models::{BlockType, ContentBlock};
use saga_core::traits::IVersionedStore;
use saga_temporal::SagaEngine;

#[derive(Debug, Clone, Copy)]
enum Step {
    Write,
    Delete,
}

fn steps() -> impl Strategy<Value = Vec<(Step, i64)>> {
    prop::collection::vec(
        (prop_oneof![3 => Just(Step::Write), 1 => Just(Step::Delete)], 0i64..5),
        1..25,
    )
}

fn block(n: usize) -> ContentBlock {
    ContentBlock {
        scene_id: "s".to_string(),
        block_type: BlockType::Dialogue,
        content: format!("v{n}"),
        order: n as u32,
        metadata: serde_json::Value::Null,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transitions_preserve_partition(seq in steps()) {
        let engine: SagaEngine = SagaEngine::open_in_memory().unwrap();
        let store = engine.content_blocks();

        // Expected payload per [from, to) span, built alongside the writes.
        let mut spans: Vec<(i64, Option<i64>, Option<String>)> = Vec::new();
        let mut now = 0i64;
        let mut alive = false;

        for (n, (step, gap)) in seq.into_iter().enumerate() {
            now += gap;
            let payload = block(n);
            let content = payload.content.clone();
            match (step, alive) {
                (Step::Write, false) => {
                    store.create("id", payload, now).unwrap();
                    alive = true;
                }
                (Step::Write, true) => {
                    store.update("id", payload, now).unwrap();
                }
                (Step::Delete, true) => {
                    store.delete("id", now).unwrap();
                    alive = false;
                }
                (Step::Delete, false) => {
                    prop_assert!(store.delete("id", now).is_err());
                    continue;
                }
            }
            if let Some(last) = spans.last_mut() {
                last.1 = Some(now);
            }
            let next = matches!(step, Step::Write).then_some(content);
            spans.push((now, None, next));

            let report = store.verify_partition("id").unwrap();
            prop_assert!(report.is_partition(), "{:?}", report);
            prop_assert_eq!(report.has_live, alive);
        }

        // Every probe instant answers with the payload of the span holding it.
        for t in -1..=now + 1 {
            let expected = spans
                .iter()
                .rev()
                .find(|(from, to, _)| *from <= t && to.map_or(true, |to| t < to))
                .and_then(|(_, _, content)| content.clone());
            let actual = store.as_of("id", t).unwrap().map(|r| r.payload.content);
            prop_assert_eq!(actual, expected, "at {}", t);
        }
    }
}
