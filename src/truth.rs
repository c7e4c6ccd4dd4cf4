//! Truth tables of functions over at most 4 variables, packed into a `u16`.
//!
//! Bit `m` of the table is the function value on the minterm `m`, where bit `i`
//! of `m` is the value of variable `i`.

/// Identity tables: `VARS[i]` is the function "variable i".
pub const VARS: [u16; 4] = [0xAAAA, 0xCCCC, 0xF0F0, 0xFF00];

/// The constant-one function.
pub const ONES: u16 = 0xFFFF;

/// Positive cofactor w.r.t. variable `var`, expanded back to a full table.
pub fn cofactor1(tt: u16, var: usize) -> u16 {
    let shift = 1 << var;
    let hi = tt & VARS[var];
    hi | (hi >> shift)
}

/// Negative cofactor w.r.t. variable `var`, expanded back to a full table.
pub fn cofactor0(tt: u16, var: usize) -> u16 {
    let shift = 1 << var;
    let lo = tt & !VARS[var];
    lo | (lo << shift)
}

/// Check whether the function depends on variable `var`.
pub fn depends_on(tt: u16, var: usize) -> bool {
    cofactor0(tt, var) != cofactor1(tt, var)
}

/// Re-express `tt`, a function over the variables `small`, as a function over
/// the variable set `big`.
///
/// Both slices are sorted leaf-id lists and `small` must be a subset of `big`.
pub fn expand(tt: u16, small: &[u32], big: &[u32]) -> u16 {
    debug_assert!(small.iter().all(|l| big.contains(l)));
    // Position of each small variable inside the big leaf set.
    let mut pos = [0usize; 4];
    for (i, leaf) in small.iter().enumerate() {
        pos[i] = big.iter().position(|b| b == leaf).unwrap();
    }
    let mut out = 0u16;
    for m in 0..16u32 {
        let mut sm = 0u32;
        for (i, _) in small.iter().enumerate() {
            if m >> pos[i] & 1 != 0 {
                sm |= 1 << i;
            }
        }
        if tt >> sm & 1 != 0 {
            out |= 1 << m;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cofactors() {
        let x0 = VARS[0];
        let x1 = VARS[1];
        let f = x0 & x1;
        assert_eq!(cofactor1(f, 0), x1);
        assert_eq!(cofactor0(f, 0), 0);
        assert_eq!(cofactor1(f, 1), x0);
        assert_eq!(cofactor0(f, 1), 0);
    }

    #[test]
    fn test_depends_on() {
        let f = VARS[0] ^ VARS[2];
        assert!(depends_on(f, 0));
        assert!(!depends_on(f, 1));
        assert!(depends_on(f, 2));
        assert!(!depends_on(f, 3));
        assert!(!depends_on(ONES, 0));
    }

    #[test]
    fn test_expand_identity() {
        let big = [3u32, 7, 9, 12];
        for (i, leaf) in big.iter().enumerate() {
            // A single variable re-expressed over the big set lands on its slot.
            assert_eq!(expand(VARS[0], &[*leaf], &big), VARS[i]);
        }
    }

    #[test]
    fn test_expand_and() {
        let small = [3u32, 9];
        let big = [3u32, 7, 9, 12];
        // and(a, b) over {3, 9} becomes and(x0, x2) over {3, 7, 9, 12}.
        let f = VARS[0] & VARS[1];
        assert_eq!(expand(f, &small, &big), VARS[0] & VARS[2]);
    }
}
