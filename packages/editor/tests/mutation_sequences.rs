//! Tests for long mutation sequences
//!
//! This tests:
//! - Insert + move + remove chains keep segments alternating and non-empty
//! - Undo/redo walks back to the exact earlier strings
//! - String/segment equivalence holds at every step

use blockprompt_editor::{
    from_string, is_normalized, normalize, same_content, to_string, Composition, Mutation,
    Segment, UndoStack,
};
use blockprompt_parser::{BlockDefinition, IDGenerator, ParamDef, ParamType, ParamValues};
use serde_json::json;

fn defs() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new("blk_a", "A")
            .with_param(ParamDef::new("color", "Color", ParamType::Color, "#000")),
        BlockDefinition::new("blk_b", "B")
            .with_param(ParamDef::new("speed", "Speed", ParamType::Number, 1)),
    ]
}

/// Small deterministic generator so sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn random_mutation(c: &Composition, rng: &mut Lcg) -> Mutation {
    let segments = c.segments();
    let pick = &segments[rng.next(segments.len())];

    match rng.next(5) {
        0 | 1 => Mutation::InsertBlock {
            index: rng.next(segments.len() + 1),
            block_id: if rng.next(2) == 0 { "blk_a" } else { "blk_b" }.to_string(),
            values: ParamValues::new(),
        },
        2 => Mutation::RemoveSegment {
            segment_id: pick.id().to_string(),
        },
        3 => Mutation::MoveSegment {
            segment_id: pick.id().to_string(),
            target_index: rng.next(segments.len() + 1),
        },
        _ => match pick {
            Segment::Text(t) => Mutation::UpdateText {
                segment_id: t.id.clone(),
                value: format!("t{} ", rng.next(100)),
            },
            Segment::Block(b) => Mutation::SetParam {
                segment_id: b.id.clone(),
                key: "speed".to_string(),
                value: json!(rng.next(10)),
            },
        },
    }
}

#[test]
fn test_invariants_hold_over_random_sequences() {
    for seed in 0..20 {
        let mut rng = Lcg(seed);
        let mut c = Composition::from_string("start [[Block:blk_a]] end", &defs());

        for _ in 0..60 {
            let mutation = random_mutation(&c, &mut rng);
            mutation.apply(&mut c).unwrap();

            assert!(!c.segments().is_empty());
            assert!(is_normalized(c.segments()), "seed {}: {:?}", seed, c.segments());

            let source = c.to_source(&defs());
            let mut ids = IDGenerator::new("check");
            let reparsed = from_string(&source, &defs(), &mut ids);
            assert!(same_content(&reparsed, c.segments()));
            assert_eq!(to_string(&reparsed, &defs()), source);
        }
    }
}

#[test]
fn test_undo_redo_walks_history() {
    let mut rng = Lcg(7);
    let mut c = Composition::from_string("hello", &defs());
    let mut stack = UndoStack::with_max_levels(0);
    let mut history = vec![c.to_source(&defs())];

    for _ in 0..25 {
        let mutation = random_mutation(&c, &mut rng);
        stack.apply(&mutation, &mut c).unwrap();
        history.push(c.to_source(&defs()));
    }

    for expected in history.iter().rev().skip(1) {
        assert!(stack.undo(&mut c));
        assert_eq!(&c.to_source(&defs()), expected);
    }
    assert!(!stack.undo(&mut c));

    for expected in history.iter().skip(1) {
        assert!(stack.redo(&mut c));
        assert_eq!(&c.to_source(&defs()), expected);
    }
}

#[test]
fn test_remove_everything_leaves_single_text() {
    let mut c = Composition::from_string(
        "[[Block:blk_a]]a[[Block:blk_b]]b[[Block:blk_a]]",
        &defs(),
    );

    loop {
        let middle = c.blocks().count() / 2;
        let Some(id) = c.blocks().nth(middle).map(|b| b.id.clone()) else {
            break;
        };
        Mutation::RemoveSegment { segment_id: id }.apply(&mut c).unwrap();
        assert!(is_normalized(c.segments()));
    }
    assert_eq!(c.to_source(&defs()), "ab");

    let last = c.segments()[0].id().to_string();
    Mutation::RemoveSegment { segment_id: last }.apply(&mut c).unwrap();
    assert_eq!(c.len(), 1);
    assert_eq!(c.to_source(&defs()), "");
}

#[test]
fn test_reorder_example_from_five_elements() {
    let mut c = Composition::from_string("t0[[Block:blk_a]]t2[[Block:blk_b]]t4", &defs());
    let moving = c.segments()[3].id().to_string();

    Mutation::MoveSegment {
        segment_id: moving.clone(),
        target_index: 1,
    }
    .apply(&mut c)
    .unwrap();

    assert_eq!(c.segments()[1].id(), moving);
    assert_eq!(c.to_source(&defs()), "t0[[Block:blk_b]][[Block:blk_a]]t2t4");
}

#[test]
fn test_batch_groups_a_drag_gesture() {
    let mut c = Composition::from_string("x", &defs());
    let mut stack = UndoStack::new();

    stack.begin_batch(&c);
    stack.set_batch_description("Drop two blocks");
    for index in [0, 3] {
        let mutation = Mutation::InsertBlock {
            index,
            block_id: "blk_b".into(),
            values: ParamValues::new(),
        };
        stack.apply(&mutation, &mut c).unwrap();
    }
    stack.end_batch();

    assert_eq!(c.to_source(&defs()), "[[Block:blk_b]]x[[Block:blk_b]]");
    assert_eq!(stack.undo_levels(), 1);
    stack.undo(&mut c);
    assert!(same_content(
        c.segments(),
        &normalize(vec![Segment::text("", "x")], &mut IDGenerator::default())
    ));
}
