use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::FxHashMap;

use crate::dfa::Dfa;
use crate::error::{Error, Result};

/// Byte 0 is reserved as the ε label; real symbols are 1..=255.
pub const EPSILON: u8 = 0;

fn is_meta(b: u8) -> bool {
    matches!(b, b'\\' | b'(' | b')' | b'|' | b'?' | b'*' | b'+')
}

#[derive(Clone, Debug, Default)]
pub struct NfaState {
    pub is_final: bool,
    /// Label → target set. Ordered so that determinization and
    /// serialization walk labels in byte order.
    pub arcs: BTreeMap<u8, BTreeSet<u32>>,
}

/// ε-NFA over a pool of states with a set of initial states.
///
/// The initial member is a set rather than a single state because reversal
/// of a DFA with several finals starts from all of them.
#[derive(Clone, Debug, Default)]
pub struct Nfa {
    pub start: BTreeSet<u32>,
    pub states: Vec<NfaState>,
}

impl Nfa {
    pub fn add_state(&mut self) -> u32 {
        let id = self.states.len() as u32;
        self.states.push(NfaState::default());
        id
    }

    pub fn add_arc(&mut self, src: u32, label: u8, dst: u32) {
        debug_assert!((src as usize) < self.states.len());
        debug_assert!((dst as usize) < self.states.len());
        self.states[src as usize]
            .arcs
            .entry(label)
            .or_default()
            .insert(dst);
    }

    /// Extend `set` to its ε-closure in place. Idempotent.
    pub fn eps_close(&self, set: &mut BTreeSet<u32>) {
        let mut worklist: VecDeque<u32> = set.iter().copied().collect();
        while let Some(q) = worklist.pop_front() {
            if let Some(dsts) = self.states[q as usize].arcs.get(&EPSILON) {
                for &d in dsts {
                    if set.insert(d) {
                        worklist.push_back(d);
                    }
                }
            }
        }
    }

    /// Compile a pattern into an ε-NFA by Thompson's construction.
    ///
    /// Grammar: a byte or `\b` escape is an atom; postfix `?`, `*`, `+`
    /// bind tightest, then concatenation, then `|`; `(…)` groups. Every
    /// sub-pattern gets an entry and an exit state stitched with
    /// ε-transitions. States 0 and 1 are the overall entry and (final)
    /// exit; the initial set is ε-closed before returning.
    pub fn from_pattern(pattern: &str) -> Result<Nfa> {
        let pat = pattern.as_bytes();
        if pat.is_empty() {
            return Err(Error::InvalidRegex("empty pattern".to_string()));
        }

        // One scan up front catches unbalanced parens and a dangling
        // escape; the recursion below only sees repairable shapes.
        let mut depth = 0usize;
        let mut i = 0;
        while i < pat.len() {
            match pat[i] {
                b'\\' => {
                    if i + 1 == pat.len() {
                        return Err(Error::InvalidRegex("dangling escape".to_string()));
                    }
                    i += 1;
                }
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        return Err(Error::InvalidRegex(format!(
                            "unbalanced ')' at byte {}",
                            i
                        )));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            i += 1;
        }
        if depth != 0 {
            return Err(Error::InvalidRegex("unbalanced '('".to_string()));
        }

        let mut nfa = Nfa::default();
        let s = nfa.add_state();
        let t = nfa.add_state();
        nfa.states[t as usize].is_final = true;
        nfa.start.insert(s);
        nfa.build(s, t, pat, 0, pat.len())?;
        let mut start = std::mem::take(&mut nfa.start);
        nfa.eps_close(&mut start);
        nfa.start = start;
        Ok(nfa)
    }

    /// Build the sub-pattern `pat[lo..hi]` between entry `s` and exit `t`.
    fn build(&mut self, s: u32, t: u32, pat: &[u8], lo: usize, hi: usize) -> Result<()> {
        if lo == hi {
            return Err(Error::InvalidRegex(format!(
                "missing operand at byte {}",
                lo
            )));
        }
        if hi - lo == 1 {
            let b = pat[lo];
            if is_meta(b) {
                return Err(Error::InvalidRegex(format!(
                    "stray '{}' at byte {}",
                    b as char, lo
                )));
            }
            self.add_arc(s, b, t);
            return Ok(());
        }
        if hi - lo == 2 && pat[lo] == b'\\' {
            self.add_arc(s, pat[lo + 1], t);
            return Ok(());
        }

        // Scan for the last top-level '|' and the last top-level atom
        // start (the concatenation split point), respecting escapes,
        // groups, and postfix operators.
        let mut option = None;
        let mut concat = None;
        let mut depth = 0usize;
        let mut i = lo;
        while i < hi {
            match pat[i] {
                b'\\' => {
                    if depth == 0 {
                        concat = Some(i);
                    }
                    i += 1;
                }
                b'(' => {
                    if depth == 0 {
                        concat = Some(i);
                    }
                    depth += 1;
                }
                b')' => {
                    debug_assert!(depth > 0);
                    depth -= 1;
                }
                b'|' => {
                    if depth == 0 {
                        option = Some(i);
                    }
                }
                b'?' | b'*' | b'+' => {}
                _ => {
                    if depth == 0 {
                        concat = Some(i);
                    }
                }
            }
            i += 1;
        }

        if let Some(k) = option {
            let i0 = self.add_state();
            let i1 = self.add_state();
            self.add_arc(s, EPSILON, i0);
            self.add_arc(i1, EPSILON, t);
            self.build(i0, i1, pat, lo, k)?;
            let j0 = self.add_state();
            let j1 = self.add_state();
            self.add_arc(s, EPSILON, j0);
            self.add_arc(j1, EPSILON, t);
            return self.build(j0, j1, pat, k + 1, hi);
        }

        if let Some(k) = concat {
            if k != lo {
                let i0 = self.add_state();
                let i1 = self.add_state();
                self.add_arc(i0, EPSILON, i1);
                self.build(s, i0, pat, lo, k)?;
                return self.build(i1, t, pat, k, hi);
            }
        }

        match pat[hi - 1] {
            b'?' => {
                let i0 = self.add_state();
                let i1 = self.add_state();
                self.add_arc(s, EPSILON, i0);
                self.add_arc(s, EPSILON, t);
                self.add_arc(i1, EPSILON, t);
                self.build(i0, i1, pat, lo, hi - 1)
            }
            b'*' => {
                let i0 = self.add_state();
                let i1 = self.add_state();
                self.add_arc(s, EPSILON, i0);
                self.add_arc(s, EPSILON, t);
                self.add_arc(i1, EPSILON, i0);
                self.add_arc(i1, EPSILON, t);
                self.build(i0, i1, pat, lo, hi - 1)
            }
            b'+' => {
                // One mandatory copy followed by a star segment.
                let i0 = self.add_state();
                let i1 = self.add_state();
                self.add_arc(i0, EPSILON, i1);
                self.build(s, i0, pat, lo, hi - 1)?;
                let j0 = self.add_state();
                let j1 = self.add_state();
                self.add_arc(i1, EPSILON, j0);
                self.add_arc(i1, EPSILON, t);
                self.add_arc(j1, EPSILON, j0);
                self.add_arc(j1, EPSILON, t);
                self.build(j0, j1, pat, lo, hi - 1)
            }
            _ => {
                if pat[lo] == b'(' && pat[hi - 1] == b')' {
                    self.build(s, t, pat, lo + 1, hi - 1)
                } else {
                    Err(Error::InvalidRegex(format!(
                        "cannot parse sub-pattern at bytes {}..{}",
                        lo, hi
                    )))
                }
            }
        }
    }

    /// Subset construction.
    ///
    /// Subsets are identified by their sorted member list and interned
    /// through a hash map, so the resulting DFA is determined by the NFA
    /// alone. Labels are expanded in byte order.
    pub fn determinize(&self) -> Dfa {
        let mut init = self.start.clone();
        self.eps_close(&mut init);

        let mut dfa = Dfa::default();
        let d0 = dfa.add_state();
        dfa.states[d0 as usize].is_final =
            init.iter().any(|&q| self.states[q as usize].is_final);

        let init_key: Vec<u32> = init.iter().copied().collect();
        let mut subset_ids: FxHashMap<Vec<u32>, u32> = FxHashMap::default();
        subset_ids.insert(init_key.clone(), d0);

        let mut worklist: VecDeque<(u32, Vec<u32>)> = VecDeque::new();
        worklist.push_back((d0, init_key));

        while let Some((u, members)) = worklist.pop_front() {
            let mut by_label: BTreeMap<u8, BTreeSet<u32>> = BTreeMap::new();
            for &q in &members {
                for (&label, dsts) in &self.states[q as usize].arcs {
                    if label == EPSILON {
                        continue;
                    }
                    by_label.entry(label).or_default().extend(dsts.iter().copied());
                }
            }
            for (label, mut set) in by_label {
                self.eps_close(&mut set);
                let key: Vec<u32> = set.iter().copied().collect();
                let v = match subset_ids.get(&key) {
                    Some(&v) => v,
                    None => {
                        let v = dfa.add_state();
                        dfa.states[v as usize].is_final =
                            set.iter().any(|&q| self.states[q as usize].is_final);
                        subset_ids.insert(key.clone(), v);
                        worklist.push_back((v, key));
                        v
                    }
                };
                dfa.add_arc(u, label, v);
            }
        }

        dfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(dfa: &Dfa, word: &[u8]) -> bool {
        let mut q = dfa.start;
        for &b in word {
            match dfa.states[q as usize].arcs.get(&b) {
                Some(&d) => q = d,
                None => return false,
            }
        }
        dfa.states[q as usize].is_final
    }

    #[test]
    fn test_single_byte() {
        let dfa = Nfa::from_pattern("a").unwrap().determinize();
        assert!(accepts(&dfa, b"a"));
        assert!(!accepts(&dfa, b""));
        assert!(!accepts(&dfa, b"b"));
        assert!(!accepts(&dfa, b"aa"));
    }

    #[test]
    fn test_concatenation() {
        let dfa = Nfa::from_pattern("abc").unwrap().determinize();
        assert!(accepts(&dfa, b"abc"));
        assert!(!accepts(&dfa, b"ab"));
        assert!(!accepts(&dfa, b"abcc"));
    }

    #[test]
    fn test_alternation() {
        let dfa = Nfa::from_pattern("a|b|c").unwrap().determinize();
        assert!(accepts(&dfa, b"a"));
        assert!(accepts(&dfa, b"b"));
        assert!(accepts(&dfa, b"c"));
        assert!(!accepts(&dfa, b"d"));
        assert!(!accepts(&dfa, b"ab"));
    }

    #[test]
    fn test_postfix_operators() {
        let dfa = Nfa::from_pattern("ab?").unwrap().determinize();
        assert!(accepts(&dfa, b"a"));
        assert!(accepts(&dfa, b"ab"));
        assert!(!accepts(&dfa, b"abb"));

        let dfa = Nfa::from_pattern("ab*").unwrap().determinize();
        assert!(accepts(&dfa, b"a"));
        assert!(accepts(&dfa, b"abbb"));
        assert!(!accepts(&dfa, b"b"));

        let dfa = Nfa::from_pattern("ab+").unwrap().determinize();
        assert!(!accepts(&dfa, b"a"));
        assert!(accepts(&dfa, b"ab"));
        assert!(accepts(&dfa, b"abbb"));
    }

    #[test]
    fn test_groups_and_precedence() {
        // Postfix binds tighter than concatenation, which binds tighter
        // than alternation.
        let dfa = Nfa::from_pattern("ab|c*").unwrap().determinize();
        assert!(accepts(&dfa, b"ab"));
        assert!(accepts(&dfa, b""));
        assert!(accepts(&dfa, b"ccc"));
        assert!(!accepts(&dfa, b"abc"));

        let dfa = Nfa::from_pattern("(ab)*").unwrap().determinize();
        assert!(accepts(&dfa, b""));
        assert!(accepts(&dfa, b"abab"));
        assert!(!accepts(&dfa, b"aba"));
    }

    #[test]
    fn test_escapes() {
        let dfa = Nfa::from_pattern("\\(a\\)").unwrap().determinize();
        assert!(accepts(&dfa, b"(a)"));
        assert!(!accepts(&dfa, b"a"));

        let dfa = Nfa::from_pattern("\\\\").unwrap().determinize();
        assert!(accepts(&dfa, b"\\"));

        let dfa = Nfa::from_pattern("a\\+").unwrap().determinize();
        assert!(accepts(&dfa, b"a+"));
        assert!(!accepts(&dfa, b"aa"));
    }

    #[test]
    fn test_malformed_patterns() {
        assert!(matches!(
            Nfa::from_pattern(""),
            Err(Error::InvalidRegex(_))
        ));
        for pat in ["(a", "a)", "a\\", "*", "*a", "|a", "a|", "()", "(|)", "a(?)"] {
            assert!(
                matches!(Nfa::from_pattern(pat), Err(Error::InvalidRegex(_))),
                "pattern {:?} should be rejected",
                pat
            );
        }
    }

    #[test]
    fn test_eps_closure_idempotent() {
        let nfa = Nfa::from_pattern("a*b*").unwrap();
        let mut once = nfa.start.clone();
        nfa.eps_close(&mut once);
        let mut twice = once.clone();
        nfa.eps_close(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_determinize_is_deterministic() {
        let dfa = Nfa::from_pattern("(a|b)*abb").unwrap().determinize();
        for st in &dfa.states {
            // BTreeMap keys are unique per construction; every label maps
            // to exactly one target.
            assert!(st.arcs.keys().all(|&l| l != EPSILON));
        }
        assert!(accepts(&dfa, b"abb"));
        assert!(accepts(&dfa, b"aababb"));
        assert!(!accepts(&dfa, b"ab"));
    }
}
