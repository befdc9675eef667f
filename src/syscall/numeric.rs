//! Numeric Utility Calls
//!
//! Two pure computations dispatched through the same numeric protocol
//! as the boundary operations. They touch no process state: a bad
//! argument is an ordinary -1 result, never a termination.

use log::warn;

/// Fibonacci number for `n` (0, 1, 1, 2, 3, 5, ...).
///
/// Returns -1 for negative `n`.
pub fn fibonacci(n: i32) -> i32 {
    match n {
        n if n < 0 => {
            warn!("fibonacci: negative argument {n}");
            -1
        }
        0 => 0,
        1 | 2 => 1,
        _ => {
            let (mut first, mut second) = (1i32, 1i32);
            for _ in 3..=n {
                let next = first.wrapping_add(second);
                first = second;
                second = next;
            }
            second
        }
    }
}

/// Maximum of four integers by pairwise comparison.
pub fn max_of_four_int(a: i32, b: i32, c: i32, d: i32) -> i32 {
    let first = if a > b { a } else { b };
    let second = if c > d { c } else { d };
    if first > second {
        first
    } else {
        second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_matches_canonical_sequence() {
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(fibonacci(n as i32), *want, "n = {n}");
        }
    }

    #[test]
    fn fibonacci_negative_is_minus_one() {
        assert_eq!(fibonacci(-1), -1);
        assert_eq!(fibonacci(-100), -1);
    }

    #[test]
    fn max_is_permutation_symmetric() {
        let inputs = [7, -3, 0, 7];
        let perms: [[i32; 4]; 4] = [
            [inputs[0], inputs[1], inputs[2], inputs[3]],
            [inputs[3], inputs[2], inputs[1], inputs[0]],
            [inputs[1], inputs[3], inputs[0], inputs[2]],
            [inputs[2], inputs[0], inputs[3], inputs[1]],
        ];
        for [a, b, c, d] in perms {
            assert_eq!(max_of_four_int(a, b, c, d), 7);
        }
    }

    #[test]
    fn max_handles_ties_and_orderings() {
        assert_eq!(max_of_four_int(5, 5, 5, 5), 5);
        assert_eq!(max_of_four_int(1, 2, 3, 4), 4);
        assert_eq!(max_of_four_int(4, 3, 2, 1), 4);
        assert_eq!(max_of_four_int(i32::MIN, -1, i32::MAX, 0), i32::MAX);
    }
}
