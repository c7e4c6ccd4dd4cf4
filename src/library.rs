//! Candidate library: maps a cut function to a replacement template.
//!
//! Functions are canonized up to NPN equivalence first, so synthesis runs at
//! most once per class. The synthesized template is a Shannon decomposition
//! of the canonical table with shared subfunctions, with the usual shortcuts
//! for constant and single-literal cofactors.

use std::collections::HashMap;

use crate::dgraph::{Builder, DecisionGraph, TEdge};
use crate::npn::{Canon, Canonizer};
use crate::truth::{self, ONES, VARS};

pub struct Library {
    canonizer: Canonizer,
    graphs: HashMap<u16, DecisionGraph>,
}

impl Library {
    pub fn new() -> Self {
        Self {
            canonizer: Canonizer::new(),
            graphs: HashMap::new(),
        }
    }

    /// Canonical form of `tt`; see [`Canon`] for the leaf binding it encodes.
    pub fn canonize(&mut self, tt: u16) -> Canon {
        self.canonizer.canonize(tt)
    }

    /// The replacement template of a canonical class.
    pub fn graph_for(&mut self, class: u16) -> &DecisionGraph {
        self.graphs
            .entry(class)
            .or_insert_with(|| synthesize(class))
    }

    /// Number of synthesized classes so far.
    pub fn num_classes(&self) -> usize {
        self.graphs.len()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

fn synthesize(tt: u16) -> DecisionGraph {
    let mut builder = Builder::new();
    let mut memo = HashMap::new();
    let root = synth(&mut builder, &mut memo, tt);
    builder.finish(root)
}

/// Shannon decomposition on the lowest variable the function depends on.
fn synth(builder: &mut Builder, memo: &mut HashMap<u16, TEdge>, tt: u16) -> TEdge {
    if tt == 0 {
        return TEdge::zero();
    }
    if tt == ONES {
        return TEdge::one();
    }
    for (i, &var) in VARS.iter().enumerate() {
        if tt == var {
            return TEdge::leaf(i as u8);
        }
        if tt == !var {
            return TEdge::leaf(i as u8).complement();
        }
    }
    if let Some(&e) = memo.get(&tt) {
        return e;
    }
    if let Some(&e) = memo.get(&!tt) {
        return e.complement();
    }

    let var = (0..4)
        .find(|&v| truth::depends_on(tt, v))
        .expect("non-constant function depends on some variable");
    let x = TEdge::leaf(var as u8);
    let lo = truth::cofactor0(tt, var);
    let hi = truth::cofactor1(tt, var);

    let result = if lo == 0 {
        let h = synth(builder, memo, hi);
        builder.and(x, h)
    } else if hi == 0 {
        let l = synth(builder, memo, lo);
        builder.and(x.complement(), l)
    } else if lo == ONES {
        // f = !x | hi
        let h = synth(builder, memo, hi);
        builder.and(x, h.complement()).complement()
    } else if hi == ONES {
        // f = x | lo
        let l = synth(builder, memo, lo);
        builder.and(x.complement(), l.complement()).complement()
    } else {
        // Full multiplexer: f = (x & hi) | (!x & lo), as three ANDs.
        let h = synth(builder, memo, hi);
        let l = synth(builder, memo, lo);
        let p = builder.and(x, h);
        let q = builder.and(x.complement(), l);
        builder.and(p.complement(), q.complement()).complement()
    };

    memo.insert(tt, result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npn::Canonizer;

    #[test]
    fn test_synthesis_is_functionally_correct() {
        let mut canonizer = Canonizer::new();
        for tt in (0..=u16::MAX as u32).step_by(61) {
            let tt = tt as u16;
            let class = canonizer.canonize(tt).tt;
            let graph = synthesize(class);
            assert_eq!(graph.eval(&VARS), class, "class = {:#06x}", class);
        }
    }

    #[test]
    fn test_simple_shapes() {
        assert_eq!(synthesize(0).num_ops(), 0);
        assert_eq!(synthesize(VARS[0]).num_ops(), 0);
        assert_eq!(synthesize(VARS[0] & VARS[1]).num_ops(), 1);
        assert_eq!(synthesize(VARS[0] | VARS[1]).num_ops(), 1);
        // xor needs three ANDs.
        assert_eq!(synthesize(VARS[0] ^ VARS[1]).num_ops(), 3);
    }

    #[test]
    fn test_subfunction_sharing() {
        // mux(x0, g, !g) with g = x1 & x2 reuses the synthesized g.
        let g = VARS[1] & VARS[2];
        let tt = (VARS[0] & g) | (!VARS[0] & !g);
        let graph = synthesize(tt);
        assert_eq!(graph.eval(&VARS), tt);
        // One AND for g, two MUX legs, one output OR.
        assert_eq!(graph.num_ops(), 4);
    }

    #[test]
    fn test_library_caches_classes() {
        let mut library = Library::new();
        let f = VARS[0] & VARS[1];
        let class = library.canonize(f).tt;
        library.graph_for(class);
        library.graph_for(class);
        assert_eq!(library.num_classes(), 1);
    }
}
