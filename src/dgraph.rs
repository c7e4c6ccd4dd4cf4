//! Decision graphs: acyclic templates of two-input AND operations over named
//! leaves, used as replacement candidates during rewriting.
//!
//! A template is realized into the network bottom-up by the substitution
//! engine; here it is only a compact description plus a truth-table
//! evaluator used for verification and by the candidate library.

use crate::truth::ONES;

/// Target of a template edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TRef {
    /// The constant-one function.
    Const1,
    /// Leaf slot `i` (bound to a network edge at realization time).
    Leaf(u8),
    /// Internal operation `i` of the template.
    Op(u8),
}

/// A template edge: a target with a complement attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TEdge {
    pub target: TRef,
    pub compl: bool,
}

impl TEdge {
    pub const fn new(target: TRef, compl: bool) -> Self {
        Self { target, compl }
    }

    pub const fn leaf(i: u8) -> Self {
        Self::new(TRef::Leaf(i), false)
    }

    pub const fn one() -> Self {
        Self::new(TRef::Const1, false)
    }

    pub const fn zero() -> Self {
        Self::new(TRef::Const1, true)
    }

    pub const fn complement(self) -> Self {
        Self::new(self.target, !self.compl)
    }

    pub const fn complement_if(self, c: bool) -> Self {
        if c {
            self.complement()
        } else {
            self
        }
    }
}

/// An acyclic template of two-input ANDs with one final optional
/// complementation (the root edge's attribute).
#[derive(Debug, Clone)]
pub struct DecisionGraph {
    ops: Vec<(TEdge, TEdge)>,
    root: TEdge,
}

impl DecisionGraph {
    /// A template with no operations: a constant or a (possibly complemented)
    /// leaf copy.
    pub fn copy(root: TEdge) -> Self {
        Self { ops: Vec::new(), root }
    }

    pub fn ops(&self) -> &[(TEdge, TEdge)] {
        &self.ops
    }

    pub fn root(&self) -> TEdge {
        self.root
    }

    /// Number of AND operations in the template.
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Evaluate the template over truth tables bound to its leaf slots.
    pub fn eval(&self, leaf_tts: &[u16]) -> u16 {
        let mut values = Vec::with_capacity(self.ops.len());
        let edge = |values: &Vec<u16>, e: TEdge| -> u16 {
            let v = match e.target {
                TRef::Const1 => ONES,
                TRef::Leaf(i) => leaf_tts[i as usize],
                TRef::Op(i) => values[i as usize],
            };
            if e.compl {
                !v
            } else {
                v
            }
        };
        for &(a, b) in &self.ops {
            let v = edge(&values, a) & edge(&values, b);
            values.push(v);
        }
        edge(&values, self.root)
    }
}

/// Builder with trivial folding, so templates never contain constant
/// operands or `x & x` operations.
#[derive(Debug, Default)]
pub struct Builder {
    ops: Vec<(TEdge, TEdge)>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, a: TEdge, b: TEdge) -> TEdge {
        if a == TEdge::one() {
            return b;
        }
        if b == TEdge::one() {
            return a;
        }
        if a == TEdge::zero() || b == TEdge::zero() {
            return TEdge::zero();
        }
        if a == b {
            return a;
        }
        if a == b.complement() {
            return TEdge::zero();
        }
        // Reuse an identical operation if the builder already has one.
        for (i, &(x, y)) in self.ops.iter().enumerate() {
            if (x, y) == (a, b) || (x, y) == (b, a) {
                return TEdge::new(TRef::Op(i as u8), false);
            }
        }
        let i = self.ops.len() as u8;
        self.ops.push((a, b));
        TEdge::new(TRef::Op(i), false)
    }

    pub fn finish(self, root: TEdge) -> DecisionGraph {
        DecisionGraph { ops: self.ops, root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::VARS;

    #[test]
    fn test_eval_and() {
        let mut builder = Builder::new();
        let root = builder.and(TEdge::leaf(0), TEdge::leaf(1).complement());
        let graph = builder.finish(root);
        assert_eq!(graph.eval(&VARS), VARS[0] & !VARS[1]);
        assert_eq!(graph.num_ops(), 1);
    }

    #[test]
    fn test_eval_xor() {
        // xor(a, b) = !(!(a & !b) & !(!a & b))
        let mut builder = Builder::new();
        let a = TEdge::leaf(0);
        let b = TEdge::leaf(1);
        let p = builder.and(a, b.complement());
        let q = builder.and(a.complement(), b);
        let root = builder.and(p.complement(), q.complement()).complement();
        let graph = builder.finish(root);
        assert_eq!(graph.eval(&VARS), VARS[0] ^ VARS[1]);
        assert_eq!(graph.num_ops(), 3);
    }

    #[test]
    fn test_builder_folds() {
        let mut builder = Builder::new();
        let a = TEdge::leaf(0);
        assert_eq!(builder.and(a, TEdge::one()), a);
        assert_eq!(builder.and(a, TEdge::zero()), TEdge::zero());
        assert_eq!(builder.and(a, a), a);
        assert_eq!(builder.and(a, a.complement()), TEdge::zero());
        assert_eq!(builder.ops.len(), 0);
    }

    #[test]
    fn test_builder_shares_ops() {
        let mut builder = Builder::new();
        let a = TEdge::leaf(0);
        let b = TEdge::leaf(1);
        let p = builder.and(a, b);
        let q = builder.and(b, a);
        assert_eq!(p, q);
        assert_eq!(builder.ops.len(), 1);
    }

    #[test]
    fn test_copy_graph() {
        let graph = DecisionGraph::copy(TEdge::leaf(2).complement());
        assert_eq!(graph.eval(&VARS), !VARS[2]);
        assert_eq!(graph.num_ops(), 0);
    }
}
