//! End-to-end tests: lookups through expansion, building, optimization and
//! simulation.
//!
//! The unoptimized automaton serves as the oracle for the optimized one: both
//! must transform every input identically.

use glyphfsm_core::{GlyphId, GlyphSequence};
use glyphfsm_machine::{
    CompileOptions, GlyphMatcher, Simulator, StateMachine, compile, machines_equal,
};
use glyphfsm_tables::transform::{
    ClassPairPosition, ClassPairValue, Ligature, LigatureSubst, MarkRecord, MarkToBase,
    MultipleSubst, PairPosition, PairValue, SingleDelta, SingleReplace,
};
use glyphfsm_tables::{
    Anchor, ClassRange, CoverageTable, GlyphClassDefinition, LookupFlag, Transformation,
    TransformationTable, ValueRecord,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn list(glyphs: &[GlyphId]) -> CoverageTable {
    CoverageTable::list(glyphs.to_vec()).unwrap()
}

fn lookup(kind: Transformation) -> TransformationTable {
    TransformationTable::new(LookupFlag::empty(), kind).unwrap()
}

fn ligatures() -> TransformationTable {
    // f f i -> ffi, f f -> ff, f i -> fi
    lookup(Transformation::Ligature(
        LigatureSubst::new(
            list(&[10]),
            vec![vec![
                Ligature::new(200, vec![10, 11]),
                Ligature::new(201, vec![10]),
                Ligature::new(202, vec![11]),
            ]],
        )
        .unwrap(),
    ))
}

fn replace() -> TransformationTable {
    lookup(Transformation::SingleReplace(
        SingleReplace::new(list(&[20, 21]), vec![30, 31]).unwrap(),
    ))
}

fn expand() -> TransformationTable {
    lookup(Transformation::Multiple(
        MultipleSubst::new(list(&[40]), vec![vec![41, 42]]).unwrap(),
    ))
}

fn kerning() -> TransformationTable {
    lookup(Transformation::PairPosition(
        PairPosition::new(
            list(&[30, 31]),
            vec![
                vec![PairValue {
                    second_glyph: 31,
                    first: ValueRecord::advance(-25),
                    second: ValueRecord::default(),
                }],
                vec![PairValue {
                    second_glyph: 30,
                    first: ValueRecord::advance(-15),
                    second: ValueRecord::default(),
                }],
            ],
        )
        .unwrap(),
    ))
}

fn simulate(machine: &StateMachine, ids: &[GlyphId]) -> GlyphSequence {
    let mut sequence = GlyphSequence::from_ids(ids);
    Simulator::new(machine).run(&mut sequence);
    sequence
}

/// Every sequence of up to `max_len` glyphs over `alphabet`.
fn all_inputs(alphabet: &[GlyphId], max_len: usize) -> Vec<Vec<GlyphId>> {
    let mut inputs = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &g in alphabet {
                let mut input: Vec<GlyphId> = prefix.clone();
                input.push(g);
                next.push(input);
            }
        }
        inputs.extend(next.iter().cloned());
        frontier = next;
    }
    inputs
}

#[test]
fn substitutions_apply_in_one_pass() {
    init_logs();
    let compiled = compile(&[ligatures(), replace()], &CompileOptions::default()).unwrap();
    let result = simulate(compiled.machine(), &[10, 10, 11, 20, 10, 11, 10]);
    assert_eq!(result.ids(), vec![200, 30, 202, 10]);
}

#[test]
fn longer_ligature_registered_first_wins() {
    init_logs();
    let compiled = compile(&[ligatures()], &CompileOptions::default()).unwrap();
    assert_eq!(simulate(compiled.machine(), &[10, 10, 11]).ids(), vec![200]);
    assert_eq!(simulate(compiled.machine(), &[10, 10, 12]).ids(), vec![201, 12]);
}

#[test]
fn earlier_lookup_takes_precedence() {
    init_logs();
    let delta = lookup(Transformation::SingleDelta(
        SingleDelta::new(list(&[20, 22]), 100).unwrap(),
    ));
    let options = CompileOptions::default();

    let first = compile(&[delta.clone(), replace()], &options).unwrap();
    assert_eq!(simulate(first.machine(), &[20, 21]).ids(), vec![120, 31]);

    let second = compile(&[replace(), delta], &options).unwrap();
    assert_eq!(simulate(second.machine(), &[20, 21]).ids(), vec![30, 31]);
}

#[test]
fn intermediate_lookup_keeps_its_place() {
    init_logs();
    let ligature = lookup(Transformation::Ligature(
        LigatureSubst::new(list(&[10]), vec![vec![Ligature::new(150, vec![11])]]).unwrap(),
    ));
    let delta = lookup(Transformation::SingleDelta(
        SingleDelta::new(list(&[10]), 100).unwrap(),
    ));
    let pair = lookup(Transformation::PairPosition(
        PairPosition::new(
            list(&[10]),
            vec![vec![PairValue {
                second_glyph: 12,
                first: ValueRecord::advance(-50),
                second: ValueRecord::advance(7),
            }]],
        )
        .unwrap(),
    ));

    for optimize in [false, true] {
        let options = CompileOptions {
            optimize,
            verify: false,
        };
        let compiled = compile(&[ligature.clone(), delta.clone(), pair.clone()], &options).unwrap();
        let result = simulate(compiled.machine(), &[10, 12]);
        assert_eq!(result.ids(), vec![110, 12]);
        assert!(result.glyphs().iter().all(|g| g.position.is_zero()));
        assert_eq!(simulate(compiled.machine(), &[10, 11]).ids(), vec![150]);
    }
}

#[test]
fn optimizer_preserves_behavior() {
    init_logs();
    let lookups = [ligatures(), replace(), expand(), kerning()];
    let built = compile(
        &lookups,
        &CompileOptions {
            optimize: false,
            verify: false,
        },
    )
    .unwrap();
    let optimized = compile(
        &lookups,
        &CompileOptions {
            optimize: true,
            verify: true,
        },
    )
    .unwrap();
    let report = optimized.optimize_report().unwrap();
    assert!(report.states_after < report.states_before);
    assert!(machines_equal(built.machine(), optimized.machine()));

    for input in all_inputs(&[10, 11, 20, 30, 31, 40], 4) {
        assert_eq!(
            simulate(built.machine(), &input),
            simulate(optimized.machine(), &input),
            "input {input:?}"
        );
    }
}

#[test]
fn class_kerning_chains_across_pairs() {
    init_logs();
    let first = GlyphClassDefinition::ranges(vec![ClassRange::new(1, 1, 1)]).unwrap();
    let second = GlyphClassDefinition::ranges(vec![ClassRange::new(1, 2, 1)]).unwrap();
    let kern = ClassPairValue {
        first: ValueRecord::advance(-30),
        second: ValueRecord::default(),
    };
    let table = lookup(Transformation::ClassPairPosition(
        ClassPairPosition::new(
            list(&[1, 3]),
            first,
            second,
            vec![
                vec![ClassPairValue::default(), ClassPairValue::default()],
                vec![ClassPairValue::default(), kern],
            ],
        )
        .unwrap(),
    ));
    let compiled = compile(&[table], &CompileOptions::default()).unwrap();

    let mut sequence = GlyphSequence::from_ids(&[1, 1, 2, 3, 2]);
    let report = Simulator::new(compiled.machine()).run(&mut sequence);
    let advances: Vec<i32> = sequence.glyphs().iter().map(|g| g.position.x_advance).collect();
    assert_eq!(advances, vec![-30, -30, 0, 0, 0]);
    // 1-1, 1-2 and the zero-valued 3-2 pair all match
    assert_eq!(report.applied, 3);
}

#[test]
fn marks_attach_over_other_marks() {
    init_logs();
    let categories = GlyphClassDefinition::ranges(vec![
        ClassRange::new(10, 10, 1),
        ClassRange::new(50, 51, 3),
    ])
    .unwrap();
    let table = lookup(Transformation::MarkToBase(
        MarkToBase::new(
            list(&[50]),
            list(&[10]),
            1,
            vec![MarkRecord {
                class: 0,
                anchor: Anchor::new(20, 0),
            }],
            vec![vec![Some(Anchor::new(100, 400))]],
        )
        .unwrap(),
    ));
    let compiled = compile(&[table], &CompileOptions::default()).unwrap();

    let mut sequence = GlyphSequence::from_ids(&[10, 51, 50]);
    if let Some(base) = sequence.get_mut(0) {
        base.position.x_advance = 600;
    }
    let report = Simulator::new(compiled.machine())
        .with_categories(&categories)
        .run(&mut sequence);
    assert_eq!(report.applied, 1);
    let mark = sequence.glyphs()[2].position;
    assert_eq!(mark.x_offset, 100 - 20 - 600);
    assert_eq!(mark.y_offset, 400);
}

#[test]
fn reverse_chain_from_json() {
    init_logs();
    let json = r#"[{
        "kind": {"ReverseChainSingle": {
            "coverage": {"List": {"glyphs": [5]}},
            "backtrack": [],
            "lookahead": [{"List": {"glyphs": [6, 7]}}],
            "substitutes": [6]
        }}
    }]"#;
    let lookups: Vec<TransformationTable> = serde_json::from_str(json).unwrap();
    let compiled = compile(&lookups, &CompileOptions::default()).unwrap();
    assert_eq!(simulate(compiled.machine(), &[5, 5, 5, 7]).ids(), vec![6, 6, 6, 7]);
    assert_eq!(simulate(compiled.machine(), &[5, 5, 8]).ids(), vec![5, 5, 8]);
}

#[test]
fn packed_form_simulates_identically() {
    init_logs();
    let compiled = compile(&[ligatures(), replace(), kerning()], &CompileOptions::default()).unwrap();
    let packed = compiled.pack();
    let unpacked = packed.unpack();
    assert!(machines_equal(compiled.machine(), &unpacked));
    assert!(packed.matchers().iter().any(|m| matches!(m, GlyphMatcher::Set(_))));
    for input in all_inputs(&[10, 11, 20, 21], 3) {
        assert_eq!(simulate(compiled.machine(), &input), simulate(&unpacked, &input));
    }
}
