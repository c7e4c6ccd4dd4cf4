use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Dense arena index of a node. Index 0 is a sentry, index 1 is the constant.
pub type NodeId = u32;

/// A polarity-carrying reference to a node.
///
/// The sign encodes the complement attribute of the edge, the magnitude is the
/// node id. `Edge(5)` reads node 5 directly, `Edge(-5)` reads its negation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Edge(i32);

impl Edge {
    pub const fn new(id: NodeId, complement: bool) -> Self {
        debug_assert!(id != 0, "Node id 0 is reserved");
        if complement {
            Self(-(id as i32))
        } else {
            Self(id as i32)
        }
    }

    pub const fn positive(id: NodeId) -> Self {
        Self::new(id, false)
    }

    /// The constant-one edge (node 1, plain polarity).
    pub const fn one() -> Self {
        Self(1)
    }
    /// The constant-zero edge (node 1, complemented).
    pub const fn zero() -> Self {
        Self(-1)
    }

    pub const fn is_complement(&self) -> bool {
        self.0 < 0
    }

    pub const fn is_const(&self) -> bool {
        self.0 == 1 || self.0 == -1
    }

    pub const fn complement(self) -> Self {
        Self(-self.0)
    }

    /// Complement the edge iff `c` is set.
    pub const fn complement_if(self, c: bool) -> Self {
        if c {
            self.complement()
        } else {
            self
        }
    }

    /// The node this edge points at, polarity stripped.
    pub const fn index(self) -> NodeId {
        self.0.unsigned_abs()
    }

    /// Return the internal signed representation.
    pub const fn inner(self) -> i32 {
        self.0
    }

    /// Encode as `2*id + complement`, used as a hash ingredient and for
    /// deterministic ordering of fanin pairs.
    pub const fn code(self) -> u32 {
        (self.0.unsigned_abs() << 1) | (self.0 < 0) as u32
    }
}

impl Neg for Edge {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.complement()
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_complement() { "~" } else { "" },
            self.index()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity() {
        let e = Edge::new(5, false);
        assert_eq!(e.index(), 5);
        assert!(!e.is_complement());
        assert!((-e).is_complement());
        assert_eq!(-(-e), e);
        assert_eq!(e.complement_if(true), -e);
        assert_eq!(e.complement_if(false), e);
    }

    #[test]
    fn test_const_edges() {
        assert_eq!(Edge::one(), -Edge::zero());
        assert!(Edge::one().is_const());
        assert!(Edge::zero().is_const());
        assert!(!Edge::positive(2).is_const());
    }

    #[test]
    fn test_code_ordering() {
        // Plain polarity sorts before complemented for the same node.
        assert!(Edge::positive(3).code() < Edge::new(3, true).code());
        assert!(Edge::new(3, true).code() < Edge::positive(4).code());
    }

    #[test]
    fn test_display() {
        assert_eq!(Edge::positive(7).to_string(), "@7");
        assert_eq!((-Edge::positive(7)).to_string(), "~@7");
    }
}
