//! Rotor: a permutation mounted at a rotational offset.
//!
//! Three variants share one contract: reflectors turn the signal around in
//! slot 0, fixed rotors never move, and moving rotors advance under a pawl
//! and carry notches that engage the pawl of their left-hand neighbour.
//!
//! The wiring is fixed relative to the rotor's internal contacts, so a
//! rotor at offset `k` maps `c` to `permute(c + k) - k`.

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::RotorCryptError;
use crate::permutation::Permutation;

/// The closed set of rotor variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Non-rotating turn-around rotor for slot 0.
    Reflector,
    /// Non-rotating, notchless rotor.
    Fixed,
    /// Rotating rotor; `notches` holds the indices of its notch positions.
    Moving { notches: Vec<usize> },
}

/// A named rotor with its wiring and current setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
}

impl Rotor {
    /// Creates a reflector named `name`.
    ///
    /// The derangement requirement on its wiring is checked when the
    /// reflector is installed in a machine.
    pub fn reflector(name: &str, permutation: Permutation) -> Self {
        Self::build(name, permutation, RotorKind::Reflector)
    }

    /// Creates a fixed (non-rotating) rotor named `name`.
    pub fn fixed(name: &str, permutation: Permutation) -> Self {
        Self::build(name, permutation, RotorKind::Fixed)
    }

    /// Creates a moving rotor named `name` with notches at the symbols of
    /// `notches`.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::InvalidSymbol`] if a notch symbol is not in
    /// the permutation's alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use rotorcrypt::{Alphabet, Permutation, Rotor};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
    /// let perm = Permutation::new("(ABCD)", alpha).unwrap();
    /// let mut rotor = Rotor::moving("I", perm, "C").unwrap();
    /// rotor.advance().unwrap();
    /// rotor.advance().unwrap();
    /// assert!(rotor.at_notch());
    /// ```
    pub fn moving(name: &str, permutation: Permutation, notches: &str) -> Result<Self, RotorCryptError> {
        let alphabet = permutation.alphabet().clone();
        let mut indices = Vec::with_capacity(notches.len());
        for c in notches.chars() {
            let index = alphabet.index_of(c)?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(Self::build(
            name,
            permutation,
            RotorKind::Moving { notches: indices },
        ))
    }

    /// Internal constructor shared by the variant constructors.
    fn build(name: &str, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name: name.to_string(),
            permutation,
            kind,
            setting: 0,
        }
    }

    /// Returns the rotor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rotor's variant.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns the wiring at setting 0.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns the alphabet the rotor is built over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    /// Returns the alphabet size.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Returns true for moving rotors.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns true for reflectors.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns the current setting, in `[0, size)`.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Sets the current setting to index `posn`.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::OutOfRange`] if `posn >= size()`.
    pub fn set(&mut self, posn: usize) -> Result<(), RotorCryptError> {
        if posn >= self.size() {
            return Err(RotorCryptError::OutOfRange {
                rotor: self.name.clone(),
                setting: posn.to_string(),
            });
        }
        self.setting = posn;
        Ok(())
    }

    /// Sets the current setting to the position of symbol `c`.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::OutOfRange`] if `c` is not in the alphabet.
    pub fn set_symbol(&mut self, c: char) -> Result<(), RotorCryptError> {
        let posn = self
            .alphabet()
            .index_of(c)
            .map_err(|_| RotorCryptError::OutOfRange {
                rotor: self.name.clone(),
                setting: c.to_string(),
            })?;
        self.setting = posn;
        Ok(())
    }

    /// Converts `c` entering on the right-hand contacts.
    pub fn convert_forward(&self, c: usize) -> usize {
        let offset = self.setting as isize;
        let out = self.permutation.permute(c as isize + offset);
        self.permutation.wrap(out as isize - offset)
    }

    /// Converts `e` entering on the left-hand contacts.
    pub fn convert_backward(&self, e: usize) -> usize {
        let offset = self.setting as isize;
        let out = self.permutation.invert(e as isize + offset);
        self.permutation.wrap(out as isize - offset)
    }

    /// Returns true iff a moving rotor sits on one of its notches.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&self.setting),
            _ => false,
        }
    }

    /// Advances a moving rotor by one position.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::NotRotating`] for reflectors and fixed rotors.
    pub fn advance(&mut self) -> Result<(), RotorCryptError> {
        if !self.rotates() {
            return Err(RotorCryptError::NotRotating(self.name.clone()));
        }
        self.step();
        Ok(())
    }

    /// Unchecked advance used by the machine after it has checked `rotates()`.
    pub(crate) fn step(&mut self) {
        self.setting = (self.setting + 1) % self.size();
    }
}
