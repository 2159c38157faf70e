// Executes a finished automaton over a glyph sequence.
//
// At each cursor position the search walks the automaton depth-first in
// transition order, backtracking on failure, until an accept transition is
// reached. The search runs on an explicit stack (see `config`) bounded both in
// depth and in total steps, so cyclic automata cannot hang it.

use glyphfsm_core::{GlyphSequence, ProcessingDirection, ShapedGlyph};
use glyphfsm_tables::{GlyphCategory, GlyphClassDefinition, LookupFlag};
use serde::{Deserialize, Serialize};

use crate::MAX_LOOP_COUNT;
use crate::config::MatchConfig;
use crate::machine::StateMachine;
use crate::transition::{Action, GlyphMatcher, Predicate};

/// Simulator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorOptions {
    /// Longest transition path a single match may follow. Values above
    /// `MAX_LOOP_COUNT` behave like `MAX_LOOP_COUNT`.
    pub max_match_depth: usize,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            max_match_depth: 256,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// Rules applied.
    pub applied: usize,
    /// Cursor positions where the search gave up on a limit.
    pub limit_hits: usize,
}

enum Search {
    Matched,
    Exhausted,
    LimitReached,
}

enum Step {
    Probe(i16, usize),
    Consume(usize),
}

/// Runs an automaton over glyph sequences.
///
/// The simulator only reads the automaton, so one machine can drive several
/// simulators at once.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'a> {
    machine: &'a StateMachine,
    categories: Option<&'a GlyphClassDefinition>,
    options: SimulatorOptions,
}

impl<'a> Simulator<'a> {
    pub fn new(machine: &'a StateMachine) -> Self {
        Self {
            machine,
            categories: None,
            options: SimulatorOptions::default(),
        }
    }

    /// Use a glyph-category class definition (1 base, 2 ligature, 3 mark,
    /// 4 component) so lookup flags can skip glyphs. Without one nothing is
    /// skipped.
    pub fn with_categories(mut self, categories: &'a GlyphClassDefinition) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_options(mut self, options: SimulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply the automaton to `sequence` in place.
    pub fn run(&self, sequence: &mut GlyphSequence) -> SimulationReport {
        let direction = self.machine.direction();
        let mut report = SimulationReport::default();
        let mut config = MatchConfig::new(self.options.max_match_depth);
        let mut cursor = sequence.start(direction);
        while let Some(at) = cursor {
            cursor = match self.search(sequence, at, &mut config) {
                Search::Matched => {
                    report.applied += 1;
                    self.apply(sequence, at, &config)
                }
                Search::Exhausted => sequence.step(at, direction, 1),
                Search::LimitReached => {
                    report.limit_hits += 1;
                    sequence.step(at, direction, 1)
                }
            };
        }
        log::trace!(
            "simulated {} glyphs: {} rules applied",
            sequence.len(),
            report.applied
        );
        report
    }

    fn skips(&self, flags: LookupFlag, glyph: &ShapedGlyph) -> bool {
        flags.filters_glyphs()
            && self
                .categories
                .is_some_and(|categories| flags.skips(GlyphCategory::of(categories, glyph.id)))
    }

    fn accepts(&self, sequence: &GlyphSequence, index: usize, matcher: &GlyphMatcher, flags: LookupFlag) -> bool {
        sequence
            .get(index)
            .is_some_and(|glyph| !self.skips(flags, glyph) && matcher.matches(glyph.id))
    }

    fn probe(
        &self,
        sequence: &GlyphSequence,
        cursor: usize,
        offset: i16,
        matcher: &GlyphMatcher,
        flags: LookupFlag,
    ) -> Option<usize> {
        let direction = if offset < 0 {
            ProcessingDirection::Backward
        } else {
            ProcessingDirection::Forward
        };
        let index = sequence.step_filtered(cursor, direction, offset.unsigned_abs() as usize, |g| {
            self.skips(flags, g)
        })?;
        self.accepts(sequence, index, matcher, flags).then_some(index)
    }

    /// Find the highest-priority rule matching at `cursor`, leaving its path
    /// on `config`.
    fn search(&self, sequence: &GlyphSequence, cursor: usize, config: &mut MatchConfig) -> Search {
        config.reset(self.machine.entry());
        let mut loop_counter: u32 = 0;

        'outer: while loop_counter < MAX_LOOP_COUNT {
            let start = config.transition_stack[config.stack_depth];
            let transitions = self.machine.transitions(config.state());
            for (index, transition) in transitions.iter().enumerate().skip(start) {
                let step = match transition.predicate() {
                    Predicate::Accept => {
                        config.transition_stack[config.stack_depth] = index;
                        return Search::Matched;
                    }
                    Predicate::Probe {
                        offset,
                        matcher,
                        flags,
                    } => self
                        .probe(sequence, cursor, *offset, matcher, *flags)
                        .map(|hit| Step::Probe(*offset, hit)),
                    Predicate::Match { matcher, flags } => {
                        let next = match config.consumed_stack.last() {
                            None => Some(cursor),
                            Some(&last) => sequence.step_filtered(
                                last,
                                ProcessingDirection::Forward,
                                1,
                                |g| self.skips(*flags, g),
                            ),
                        };
                        next.filter(|&i| self.accepts(sequence, i, matcher, *flags))
                            .map(Step::Consume)
                    }
                };
                let Some(step) = step else {
                    continue;
                };

                if config.is_full() {
                    log::warn!(
                        "match depth limit {} reached at glyph {cursor}",
                        config.buffer_size
                    );
                    return Search::LimitReached;
                }
                match step {
                    Step::Probe(offset, hit) => config.probe_stack.push((offset, hit)),
                    Step::Consume(hit) => config.consumed_stack.push(hit),
                }
                config.push(index, transition.target);
                loop_counter += 1;
                continue 'outer;
            }

            // Every alternative at this depth failed.
            if config.stack_depth == 0 {
                return Search::Exhausted;
            }
            config.stack_depth -= 1;
            let taken = config.transition_stack[config.stack_depth];
            match self.machine.transitions(config.state())[taken].predicate() {
                Predicate::Match { .. } => {
                    config.consumed_stack.pop();
                }
                Predicate::Probe { .. } => {
                    config.probe_stack.pop();
                }
                Predicate::Accept => {}
            }
            config.transition_stack[config.stack_depth] += 1;
            loop_counter += 1;
        }

        log::warn!("search step limit {MAX_LOOP_COUNT} reached at glyph {cursor}");
        Search::LimitReached
    }

    /// Apply the matched rule's actions and return the next cursor.
    fn apply(&self, sequence: &mut GlyphSequence, cursor: usize, config: &MatchConfig) -> Option<usize> {
        let mut consumed = config.consumed_stack.iter().copied();
        // Current positions of the glyphs consumed so far.
        let mut placed: Vec<usize> = Vec::with_capacity(config.consumed_stack.len());
        let mut shift: isize = 0;
        let mut last_original = cursor;
        let mut retains_last = false;

        for (state, index) in config.taken() {
            let transition = &self.machine.transitions(state)[index];
            if !matches!(transition.predicate(), Predicate::Match { .. }) {
                continue;
            }
            let Some(original) = consumed.next() else {
                break;
            };
            last_original = original;
            let at = original.checked_add_signed(shift)?;
            placed.push(at);
            retains_last = transition.action().is_some_and(Action::retains_last);
            if let Some(action) = transition.action() {
                shift += self.act(sequence, action, &mut placed, config);
            }
        }

        match self.machine.direction() {
            ProcessingDirection::Forward => {
                let end = last_original.checked_add_signed(1 + shift)?;
                // A retained glyph is only revisited when it lies past the cursor.
                let next = if retains_last && end > cursor + 1 { end - 1 } else { end };
                (next < sequence.len()).then_some(next)
            }
            ProcessingDirection::Backward => cursor.checked_sub(1),
        }
    }

    /// Apply one action to the most recently placed glyph. Returns the change
    /// in sequence length.
    fn act(
        &self,
        sequence: &mut GlyphSequence,
        action: &Action,
        placed: &mut Vec<usize>,
        config: &MatchConfig,
    ) -> isize {
        let Some(&at) = placed.last() else {
            return 0;
        };
        let previous = placed.len().checked_sub(2).map(|i| placed[i]);
        match action {
            Action::Delta(delta) => {
                if let Some(glyph) = sequence.get_mut(at) {
                    glyph.id = glyph.id.wrapping_add_signed(*delta);
                }
                0
            }
            Action::Replace(map) => {
                if let Some(glyph) = sequence.get_mut(at) {
                    if let Some(&substitute) = map.get(&glyph.id) {
                        glyph.id = substitute;
                    }
                }
                0
            }
            Action::Expand(glyphs) => {
                let replacement: Vec<ShapedGlyph> = glyphs.iter().copied().map(ShapedGlyph::new).collect();
                sequence.splice(at, &replacement)
            }
            Action::Ligate { glyph, components } => {
                let n = (*components as usize).clamp(1, placed.len());
                let first = placed.len() - n;
                let merged = placed.split_off(first + 1);
                if let Some(target) = sequence.get_mut(placed[first]) {
                    target.id = *glyph;
                    target.position = Default::default();
                }
                // Highest index first so earlier indices stay valid.
                for &index in merged.iter().rev() {
                    sequence.remove(index);
                }
                -(merged.len() as isize)
            }
            Action::Position(record) => {
                if let Some(glyph) = sequence.get_mut(at) {
                    record.apply_to(&mut glyph.position);
                }
                0
            }
            Action::PairAdjust { first, second } => {
                if let Some(glyph) = previous.and_then(|p| sequence.get_mut(p)) {
                    first.apply_to(&mut glyph.position);
                }
                if let Some(glyph) = sequence.get_mut(at) {
                    second.apply_to(&mut glyph.position);
                }
                0
            }
            Action::CursiveLink(table) => {
                let Some(previous) = previous else {
                    return 0;
                };
                let exit = sequence
                    .get(previous)
                    .and_then(|g| table.entry_exit(g.id))
                    .and_then(|ee| ee.exit);
                let entry = sequence
                    .get(at)
                    .and_then(|g| table.entry_exit(g.id))
                    .and_then(|ee| ee.entry);
                if let (Some(exit), Some(entry)) = (exit, entry) {
                    let mut y_offset = 0;
                    if let Some(glyph) = sequence.get_mut(previous) {
                        glyph.position.x_advance = i32::from(exit.x);
                        y_offset = glyph.position.y_offset;
                    }
                    if let Some(glyph) = sequence.get_mut(at) {
                        glyph.position.x_offset = -i32::from(entry.x);
                        glyph.position.y_offset = y_offset + i32::from(exit.y) - i32::from(entry.y);
                    }
                }
                0
            }
            Action::MarkAttach(table) => {
                let Some(base) = config
                    .probe_stack
                    .iter()
                    .find(|(offset, _)| *offset == -1)
                    .map(|&(_, index)| index)
                else {
                    return 0;
                };
                let (Some(base_glyph), Some(mark_glyph)) = (sequence.get(base), sequence.get(at)) else {
                    return 0;
                };
                let Some(mark) = table.mark(mark_glyph.id) else {
                    return 0;
                };
                let Some(anchor) = table.base_anchor(base_glyph.id, mark.class) else {
                    return 0;
                };
                let base_position = base_glyph.position;
                let advance: i32 = sequence
                    .glyphs()
                    .get(base..at)
                    .map_or(0, |between| between.iter().map(|g| g.position.x_advance).sum());
                if let Some(glyph) = sequence.get_mut(at) {
                    glyph.position.x_offset = base_position.x_offset + i32::from(anchor.x)
                        - i32::from(mark.anchor.x)
                        - advance;
                    glyph.position.y_offset =
                        base_position.y_offset + i32::from(anchor.y) - i32::from(mark.anchor.y);
                }
                0
            }
        }
    }
}
