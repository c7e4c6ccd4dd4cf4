//! NPN canonicalization of 4-variable truth tables.
//!
//! Two functions are NPN-equivalent when one can be obtained from the other
//! by permuting inputs, complementing inputs, and complementing the output.
//! The canonical representative of a class is the numerically smallest table
//! reachable by the 24 * 16 * 2 transforms. Candidate synthesis works on
//! canonical tables only, so each class is synthesized once per pass.

use std::collections::HashMap;

/// All permutations of four elements, in lexicographic order.
const PERMS: [[u8; 4]; 24] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [0, 3, 2, 1],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [1, 2, 0, 3],
    [1, 2, 3, 0],
    [1, 3, 0, 2],
    [1, 3, 2, 0],
    [2, 0, 1, 3],
    [2, 0, 3, 1],
    [2, 1, 0, 3],
    [2, 1, 3, 0],
    [2, 3, 0, 1],
    [2, 3, 1, 0],
    [3, 0, 1, 2],
    [3, 0, 2, 1],
    [3, 1, 0, 2],
    [3, 1, 2, 0],
    [3, 2, 0, 1],
    [3, 2, 1, 0],
];

/// A canonical form together with the transform that produced it.
///
/// The transform maps the original table `tt` to the canonical table:
/// minterm `y` of the canonical table reads the original on the minterm `x`
/// with `x[perm[i]] = y[i] ^ flip(i)`, and the result bit is complemented
/// when `out_compl` holds. Inverting the transform binds canonical variable
/// `i` to the original variable `perm[i]` with polarity `flip(i)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Canon {
    /// The canonical truth table of the class.
    pub tt: u16,
    pub perm: [u8; 4],
    /// Bit `i` set means canonical variable `i` is the complement of the
    /// original variable `perm[i]`.
    pub flips: u8,
    pub out_compl: bool,
}

impl Canon {
    /// Apply the recorded transform to an arbitrary table.
    pub fn transform(&self, tt: u16) -> u16 {
        let mut out = 0u16;
        for y in 0..16u32 {
            let mut x = 0u32;
            for i in 0..4 {
                let bit = (y >> i & 1) ^ (self.flips >> i & 1) as u32;
                x |= bit << self.perm[i];
            }
            if tt >> x & 1 != 0 {
                out |= 1 << y;
            }
        }
        if self.out_compl {
            !out
        } else {
            out
        }
    }
}

/// Canonicalizer with a per-instance memo of already-seen tables.
#[derive(Debug, Default)]
pub struct Canonizer {
    cache: HashMap<u16, Canon>,
}

impl Canonizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical form of `tt`, via exhaustive search over all transforms.
    pub fn canonize(&mut self, tt: u16) -> Canon {
        if let Some(&canon) = self.cache.get(&tt) {
            return canon;
        }

        let mut best: Option<Canon> = None;
        for perm in PERMS {
            for flips in 0..16u8 {
                let candidate = Canon {
                    tt: 0,
                    perm,
                    flips,
                    out_compl: false,
                };
                let image = candidate.transform(tt);
                for out_compl in [false, true] {
                    let image = if out_compl { !image } else { image };
                    if best.map_or(true, |b| image < b.tt) {
                        best = Some(Canon {
                            tt: image,
                            perm,
                            flips,
                            out_compl,
                        });
                    }
                }
            }
        }

        let canon = best.expect("non-empty transform set");
        self.cache.insert(tt, canon);
        canon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::VARS;

    #[test]
    fn test_transform_round_trip() {
        // canonize(tt).transform(tt) reproduces the canonical table.
        let mut canonizer = Canonizer::new();
        for tt in (0..=u16::MAX as u32).step_by(89) {
            let tt = tt as u16;
            let canon = canonizer.canonize(tt);
            assert_eq!(canon.transform(tt), canon.tt, "tt = {:#06x}", tt);
        }
    }

    #[test]
    fn test_class_members_share_canon() {
        let mut canonizer = Canonizer::new();
        // and(a, b), its input-swapped, input-complemented, and
        // output-complemented variants are all one class.
        let f = VARS[0] & VARS[1];
        let class = canonizer.canonize(f).tt;
        assert_eq!(canonizer.canonize(VARS[1] & VARS[0]).tt, class);
        assert_eq!(canonizer.canonize(!VARS[0] & VARS[1]).tt, class);
        assert_eq!(canonizer.canonize(!f).tt, class);
        assert_eq!(canonizer.canonize(VARS[2] & VARS[3]).tt, class);
    }

    #[test]
    fn test_distinct_classes() {
        let mut canonizer = Canonizer::new();
        let and2 = canonizer.canonize(VARS[0] & VARS[1]).tt;
        let xor2 = canonizer.canonize(VARS[0] ^ VARS[1]).tt;
        let mux = canonizer
            .canonize((VARS[0] & VARS[1]) | (!VARS[0] & VARS[2]))
            .tt;
        assert_ne!(and2, xor2);
        assert_ne!(and2, mux);
        assert_ne!(xor2, mux);
    }

    #[test]
    fn test_constants_are_fixed_points() {
        let mut canonizer = Canonizer::new();
        assert_eq!(canonizer.canonize(0).tt, 0);
        // The constant-one canonizes to constant-zero by output complement.
        let ones = canonizer.canonize(crate::truth::ONES);
        assert_eq!(ones.tt, 0);
        assert!(ones.out_compl);
    }

    #[test]
    fn test_canonical_is_minimal() {
        let mut canonizer = Canonizer::new();
        let canon = canonizer.canonize(VARS[3]);
        // A single variable canonizes to the smallest variable table,
        // possibly complemented further down by the flip search.
        assert!(canon.tt <= VARS[0]);
        assert_eq!(canonizer.canonize(canon.tt).tt, canon.tt);
    }
}
