//! Permutation: bijection over alphabet indices given in cycle notation.
//!
//! The cycle string is parsed once into forward and inverse index tables,
//! so every lookup afterwards is a single array access.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::RotorCryptError;

/// Bijection on `[0, N)` built from disjoint cycles over an [`Alphabet`].
///
/// Symbols that appear in no cycle map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Parses `cycles`, a string of the form `"(cccc) (cc) ..."`.
    ///
    /// Whitespace is ignored everywhere. An empty string is the identity.
    ///
    /// # Errors
    /// - [`RotorCryptError::InvalidSymbol`] if a cycle holds a symbol outside
    ///   the alphabet.
    /// - [`RotorCryptError::MalformedCycles`] for unbalanced parentheses,
    ///   symbols outside any cycle, or a symbol that appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use rotorcrypt::{Alphabet, Permutation};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCDE").unwrap());
    /// let perm = Permutation::new("(AB) (CD)", alpha).unwrap();
    /// assert_eq!(perm.permute_symbol('A').unwrap(), 'B');
    /// assert_eq!(perm.permute_symbol('E').unwrap(), 'E');
    /// assert_eq!(perm.invert_symbol('B').unwrap(), 'A');
    /// ```
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self, RotorCryptError> {
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        let mut seen = vec![false; size];

        for cycle in Self::split_cycles(cycles)? {
            let mut members = Vec::with_capacity(cycle.len());
            for c in cycle {
                let index = alphabet.index_of(c)?;
                if seen[index] {
                    return Err(RotorCryptError::MalformedCycles(format!(
                        "symbol '{}' appears more than once",
                        c
                    )));
                }
                seen[index] = true;
                members.push(index);
            }
            for (j, &from) in members.iter().enumerate() {
                forward[from] = members[(j + 1) % members.len()];
            }
        }

        let mut inverse = vec![0usize; size];
        for (from, &to) in forward.iter().enumerate() {
            inverse[to] = from;
        }

        Ok(Permutation {
            alphabet,
            forward,
            inverse,
        })
    }

    /// Returns the identity permutation over `alphabet`.
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let forward: Vec<usize> = (0..alphabet.size()).collect();
        let inverse = forward.clone();
        Permutation {
            alphabet,
            forward,
            inverse,
        }
    }

    /// Splits cycle notation into the symbol lists of each cycle.
    fn split_cycles(cycles: &str) -> Result<Vec<Vec<char>>, RotorCryptError> {
        let mut result = Vec::new();
        let mut current: Option<Vec<char>> = None;

        for c in cycles.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '(' => {
                    if current.is_some() {
                        return Err(RotorCryptError::MalformedCycles(
                            "nested '('".to_string(),
                        ));
                    }
                    current = Some(Vec::new());
                }
                ')' => match current.take() {
                    Some(cycle) => result.push(cycle),
                    None => {
                        return Err(RotorCryptError::MalformedCycles(
                            "unmatched ')'".to_string(),
                        ))
                    }
                },
                _ => match current.as_mut() {
                    Some(cycle) => cycle.push(c),
                    None => {
                        return Err(RotorCryptError::MalformedCycles(format!(
                            "symbol '{}' outside of a cycle",
                            c
                        )))
                    }
                },
            }
        }

        if current.is_some() {
            return Err(RotorCryptError::MalformedCycles(
                "unclosed '('".to_string(),
            ));
        }
        Ok(result)
    }

    /// Returns `p` modulo the alphabet size, in `[0, N)`.
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    /// Returns the size of the alphabet this permutation acts on.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns the alphabet this permutation was built over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Applies the permutation to index `p`, taken modulo the size.
    pub fn permute(&self, p: isize) -> usize {
        self.forward[self.wrap(p)]
    }

    /// Applies the inverse permutation to index `c`, taken modulo the size.
    pub fn invert(&self, c: isize) -> usize {
        self.inverse[self.wrap(c)]
    }

    /// Applies the permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::InvalidSymbol`] if `p` is not in the alphabet.
    pub fn permute_symbol(&self, p: char) -> Result<char, RotorCryptError> {
        let index = self.alphabet.index_of(p)?;
        self.alphabet.symbol_at(self.forward[index])
    }

    /// Applies the inverse permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::InvalidSymbol`] if `c` is not in the alphabet.
    pub fn invert_symbol(&self, c: char) -> Result<char, RotorCryptError> {
        let index = self.alphabet.index_of(c)?;
        self.alphabet.symbol_at(self.inverse[index])
    }

    /// Returns true iff no index maps to itself.
    pub fn is_derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &to)| i != to)
    }
}

impl fmt::Display for Permutation {
    /// Renders canonical cycle notation, omitting fixed points.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.alphabet.symbols();
        let mut visited = vec![false; self.size()];
        let mut first = true;

        for (start, &to) in self.forward.iter().enumerate() {
            if visited[start] || to == start {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;

            write!(f, "(")?;
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                write!(f, "{}", symbols[i])?;
                i = self.forward[i];
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(symbols: &str) -> Arc<Alphabet> {
        Arc::new(Alphabet::new(symbols).unwrap())
    }

    /// Checks that `perm` maps each symbol of `from` to the matching symbol
    /// of `to`, by symbol and by index, in both directions.
    fn check_perm(perm: &Permutation, from: &str, to: &str) {
        assert_eq!(perm.size(), from.chars().count());
        let alpha = perm.alphabet().clone();
        for (c, e) in from.chars().zip(to.chars()) {
            assert_eq!(perm.permute_symbol(c).unwrap(), e, "wrong translation of '{}'", c);
            assert_eq!(perm.invert_symbol(e).unwrap(), c, "wrong inverse of '{}'", e);
            let ci = alpha.index_of(c).unwrap() as isize;
            let ei = alpha.index_of(e).unwrap();
            assert_eq!(perm.permute(ci), ei);
            assert_eq!(perm.invert(ei as isize), ci as usize);
        }
    }

    #[test]
    fn test_two_cycles_with_fixed_point() {
        let perm = Permutation::new("(abc) (def)", alphabet("abcdefg")).unwrap();
        assert_eq!(perm.size(), 7);
        check_perm(&perm, "abcdefg", "bcaefdg");
        assert!(!perm.is_derangement());
    }

    #[test]
    fn test_index_mapping() {
        let perm = Permutation::new("(ade) (fhc)", alphabet("abcdefgh")).unwrap();
        assert_eq!(perm.permute(0), 3);
        assert_eq!(perm.permute(3), 4);
        assert_eq!(perm.permute(4), 0);
        assert_eq!(perm.permute(2), 5);
        assert_eq!(perm.invert(0), 4);
        assert_eq!(perm.invert(3), 0);
        assert_eq!(perm.invert(4), 3);
        assert_eq!(perm.invert(2), 7);
        assert!(!perm.is_derangement());
    }

    #[test]
    fn test_identity_from_empty_string() {
        let upper = Arc::new(Alphabet::upper());
        let perm = Permutation::new("", upper.clone()).unwrap();
        let letters = upper.to_string();
        check_perm(&perm, &letters, &letters);
        assert_eq!(perm, Permutation::identity(upper));
        assert!(!perm.is_derangement());
    }

    #[test]
    fn test_swap_vectors() {
        let perm = Permutation::new("(AB)(CD)", alphabet("ABCDE")).unwrap();
        assert_eq!(perm.permute_symbol('A').unwrap(), 'B');
        assert_eq!(perm.permute_symbol('E').unwrap(), 'E');
        assert_eq!(perm.invert_symbol('B').unwrap(), 'A');
    }

    #[test]
    fn test_wrap_handles_negative_and_large() {
        let perm = Permutation::new("(AB)", alphabet("ABCDE")).unwrap();
        assert_eq!(perm.wrap(-1), 4);
        assert_eq!(perm.wrap(-10), 0);
        assert_eq!(perm.wrap(12), 2);
        assert_eq!(perm.permute(5), 1);
        assert_eq!(perm.permute(-4), 0);
        assert_eq!(perm.invert(6), 0);
    }

    #[test]
    fn test_derangement() {
        let perm = Permutation::new("(AB) (CDE)", alphabet("ABCDE")).unwrap();
        assert!(perm.is_derangement());
        let perm = Permutation::new("(AB) (CD)", alphabet("ABCDE")).unwrap();
        assert!(!perm.is_derangement());
    }

    #[test]
    fn test_whitespace_ignored() {
        let a = Permutation::new(" ( A B )\t(C D) ", alphabet("ABCDE")).unwrap();
        let b = Permutation::new("(AB)(CD)", alphabet("ABCDE")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_symbol_in_cycle() {
        let result = Permutation::new("(AZ)", alphabet("ABCDE"));
        assert_eq!(result, Err(RotorCryptError::InvalidSymbol('Z')));
    }

    #[test]
    fn test_malformed_cycles() {
        let alpha = alphabet("ABCDE");
        for bad in ["(AB", "AB)", "(A(B))", "A (BC)", "(AB) (BC)"] {
            assert!(
                matches!(
                    Permutation::new(bad, alpha.clone()),
                    Err(RotorCryptError::MalformedCycles(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_canonical_cycles() {
        let perm = Permutation::new("(CD) (BA) (E)", alphabet("ABCDE")).unwrap();
        assert_eq!(perm.to_string(), "(AB) (CD)");
        let perm = Permutation::new("(ECA)", alphabet("ABCDE")).unwrap();
        assert_eq!(perm.to_string(), "(AEC)");
    }
}
