//! Alphabet: ordered set of distinct symbols with dense indices.
//!
//! Every permutation, rotor and machine is built against one alphabet,
//! which maps each symbol to an index in `[0, N)` and back.

use std::collections::HashMap;
use std::fmt;

use crate::error::RotorCryptError;

/// Ordered sequence of distinct symbols.
///
/// Immutable after construction. Wrap it in an [`Arc`](std::sync::Arc) to
/// share one alphabet between the permutations and rotors of a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    text: String,
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Creates an alphabet from the characters of `symbols`, in order.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::EmptyAlphabet`] if `symbols` is empty and
    /// [`RotorCryptError::DuplicateSymbol`] if any character repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotorcrypt::Alphabet;
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// assert_eq!(alpha.size(), 4);
    /// assert_eq!(alpha.index_of('C').unwrap(), 2);
    /// assert!(Alphabet::new("ABCA").is_err());
    /// ```
    pub fn new(symbols: &str) -> Result<Self, RotorCryptError> {
        if symbols.is_empty() {
            return Err(RotorCryptError::EmptyAlphabet);
        }
        match Self::build(symbols.chars()) {
            (_, Some(c)) => Err(RotorCryptError::DuplicateSymbol(c)),
            (alphabet, None) => Ok(alphabet),
        }
    }

    /// The 26 upper-case Latin letters.
    pub fn upper() -> Self {
        Self::build('A'..='Z').0
    }

    /// Indexes `symbols` in order, also returning the first symbol seen twice.
    fn build<I: IntoIterator<Item = char>>(symbols: I) -> (Self, Option<char>) {
        let symbols: Vec<char> = symbols.into_iter().collect();
        let mut index = HashMap::with_capacity(symbols.len());
        let mut duplicate = None;
        for (i, &c) in symbols.iter().enumerate() {
            if index.insert(c, i).is_some() && duplicate.is_none() {
                duplicate = Some(c);
            }
        }
        let alphabet = Alphabet {
            text: symbols.iter().collect(),
            symbols,
            index,
        };
        (alphabet, duplicate)
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the index of `symbol`.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::InvalidSymbol`] if `symbol` is not present.
    pub fn index_of(&self, symbol: char) -> Result<usize, RotorCryptError> {
        self.index
            .get(&symbol)
            .copied()
            .ok_or(RotorCryptError::InvalidSymbol(symbol))
    }

    /// Returns the symbol at `index`.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::IndexOutOfRange`] if `index >= size()`.
    pub fn symbol_at(&self, index: usize) -> Result<char, RotorCryptError> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(RotorCryptError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Returns true iff `symbol` is in the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    /// Returns the symbols in index order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Returns the symbols as a string, in index order.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
