use std::collections::BTreeMap;
use std::fmt::Write;

use log::debug;

use crate::error::Result;
use crate::nfa::Nfa;

#[derive(Clone, Debug, Default)]
pub struct DfaState {
    pub is_final: bool,
    /// Label → target. At most one target per label; a missing entry is a
    /// dead transition with no accepting extension.
    pub arcs: BTreeMap<u8, u32>,
}

/// Deterministic finite automaton, possibly partial.
#[derive(Clone, Debug, Default)]
pub struct Dfa {
    pub start: u32,
    pub states: Vec<DfaState>,
}

impl Dfa {
    pub fn add_state(&mut self) -> u32 {
        let id = self.states.len() as u32;
        self.states.push(DfaState::default());
        id
    }

    pub fn add_arc(&mut self, src: u32, label: u8, dst: u32) {
        debug_assert!((src as usize) < self.states.len());
        debug_assert!((dst as usize) < self.states.len());
        let prev = self.states[src as usize].arcs.insert(label, dst);
        debug_assert!(prev.is_none(), "duplicate transition ({}, {})", src, label);
    }

    /// Compile a pattern into a minimal DFA.
    ///
    /// Brzozowski: determinize, then reverse and determinize twice more.
    /// The result is the minimal DFA for the pattern's language, canonical
    /// up to state renumbering.
    pub fn from_pattern(pattern: &str) -> Result<Dfa> {
        let nfa = Nfa::from_pattern(pattern)?;
        let dfa = nfa.determinize();
        debug!("determinized: {} states", dfa.states.len());
        let dfa = dfa.reverse().determinize();
        let dfa = dfa.reverse().determinize();
        debug!("minimized: {} states", dfa.states.len());
        Ok(dfa)
    }

    /// Reverse into an NFA: arc `u --c--> v` becomes `v --c--> u`, the finals
    /// become the initial set, and the old start becomes the single final.
    pub fn reverse(&self) -> Nfa {
        let mut nfa = Nfa::default();
        for _ in 0..self.states.len() {
            nfa.add_state();
        }
        for (u, st) in self.states.iter().enumerate() {
            for (&label, &v) in &st.arcs {
                nfa.add_arc(v, label, u as u32);
            }
            if st.is_final {
                nfa.start.insert(u as u32);
            }
        }
        nfa.states[self.start as usize].is_final = true;
        nfa
    }

    /// Serialize to FST text: one `src\tdst\tin\tout` line per transition
    /// (`out == in`), one bare `state` line per final state, LF endings.
    pub fn to_fst(&self) -> String {
        let mut out = String::new();
        for (i, st) in self.states.iter().enumerate() {
            for (&label, &dst) in &st.arcs {
                let _ = writeln!(out, "{}\t{}\t{}\t{}", i, dst, label, label);
            }
            if st.is_final {
                let _ = writeln!(out, "{}", i);
            }
        }
        out
    }

    /// Serialize to Graphviz text. Debug aid only; nothing consumes this.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph {\n");
        out.push_str("  node[shape=circle];\n");
        out.push_str("  edge[arrowhead=vee];\n");
        out.push_str("  START[shape=point, color=white];\n");
        for (i, st) in self.states.iter().enumerate() {
            if st.is_final {
                let _ = writeln!(out, "  {}[shape=doublecircle];", i);
            }
        }
        let _ = writeln!(out, "  START -> {} [label=start];", self.start);
        for (i, st) in self.states.iter().enumerate() {
            for (&label, &dst) in &st.arcs {
                let _ = writeln!(out, "  {} -> {} [label=\"{}\"];", i, dst, dot_label(label));
            }
        }
        out.push_str("}\n");
        out
    }
}

fn dot_label(label: u8) -> String {
    match label {
        b'"' => "\\\"".to_string(),
        b'\\' => "\\\\".to_string(),
        b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
        b => format!("0x{:02x}", b),
    }
}
