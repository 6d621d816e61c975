//! Machine: an ordered stack of rotors behind a plugboard.
//!
//! Slot 0 holds the reflector and the rightmost `num_pawls` slots hold the
//! moving rotors; the last slot is the fast rotor. Each converted symbol
//! first steps the moving rotors, then travels plugboard → rotors right to
//! left → reflector → rotors left to right → plugboard.
//!
//! Rotors live in a catalog owned by the machine and are referenced from
//! the slots by [`RotorId`], so the same rotor keeps its state across
//! setups without shared ownership.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::alphabet::Alphabet;
use crate::error::RotorCryptError;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Index of a rotor in a machine's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RotorId(usize);

/// A complete rotor cipher machine.
///
/// A `Machine` is a unit of mutable state; conversions must be issued in
/// order from a single owner.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_slots: usize,
    num_pawls: usize,
    catalog: Vec<Rotor>,
    by_name: HashMap<String, RotorId>,
    slots: Vec<RotorId>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine over `alphabet` with `num_slots` rotor slots
    /// (reflector included) and `num_pawls` moving-rotor slots, choosing its
    /// rotors from `rotors`.
    ///
    /// No rotors are installed and the plugboard is the identity.
    ///
    /// # Errors
    /// - [`RotorCryptError::InvalidMachineShape`] unless
    ///   `1 < num_slots` and `num_pawls < num_slots`.
    /// - [`RotorCryptError::DuplicateRotorName`] if two rotors share a name.
    /// - [`RotorCryptError::AlphabetMismatch`] if a rotor is built over a
    ///   different alphabet.
    pub fn new<I>(
        alphabet: Arc<Alphabet>,
        num_slots: usize,
        num_pawls: usize,
        rotors: I,
    ) -> Result<Self, RotorCryptError>
    where
        I: IntoIterator<Item = Rotor>,
    {
        if num_slots < 2 || num_pawls >= num_slots {
            return Err(RotorCryptError::InvalidMachineShape {
                slots: num_slots,
                pawls: num_pawls,
            });
        }

        let mut catalog = Vec::new();
        let mut by_name = HashMap::new();
        for rotor in rotors {
            if !same_alphabet(rotor.alphabet(), &alphabet) {
                return Err(RotorCryptError::AlphabetMismatch(rotor.name().to_string()));
            }
            let id = RotorId(catalog.len());
            if by_name.insert(rotor.name().to_string(), id).is_some() {
                return Err(RotorCryptError::DuplicateRotorName(rotor.name().to_string()));
            }
            catalog.push(rotor);
        }

        debug!(
            slots = num_slots,
            pawls = num_pawls,
            catalog = catalog.len(),
            "machine built"
        );

        Ok(Machine {
            plugboard: Permutation::identity(alphabet.clone()),
            alphabet,
            num_slots,
            num_pawls,
            catalog,
            by_name,
            slots: Vec::with_capacity(num_slots),
        })
    }

    /// Returns the number of rotor slots, reflector included.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Returns the number of pawls, which equals the number of moving rotors.
    pub fn num_pawls(&self) -> usize {
        self.num_pawls
    }

    /// Returns the machine alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Returns all rotors available to this machine.
    pub fn catalog(&self) -> &[Rotor] {
        &self.catalog
    }

    /// Returns true once rotors have been installed.
    pub fn is_configured(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Returns the rotor in slot `k`, where slot 0 is the reflector and slot
    /// `num_slots() - 1` the fast rotor.
    pub fn rotor(&self, k: usize) -> Option<&Rotor> {
        self.slots.get(k).map(|id| &self.catalog[id.0])
    }

    /// Returns the installed rotors, reflector first.
    pub fn rotors(&self) -> impl Iterator<Item = &Rotor> + '_ {
        self.slots.iter().map(|id| &self.catalog[id.0])
    }

    /// Returns the current settings of slots 1.. as symbols.
    pub fn settings(&self) -> String {
        self.rotors()
            .skip(1)
            .map(|r| self.alphabet.symbols()[r.setting()])
            .collect()
    }

    /// Installs the rotors named by `names` into the slots, reflector first,
    /// and resets each to setting 0.
    ///
    /// On error the previous installation is left untouched.
    ///
    /// # Errors
    /// - [`RotorCryptError::SlotCountMismatch`] if `names.len() != num_slots()`.
    /// - [`RotorCryptError::UnknownRotorName`] for a name not in the catalog.
    /// - [`RotorCryptError::RepeatedRotor`] if a name appears twice.
    /// - [`RotorCryptError::ReflectorPositionError`] if slot 0 does not reflect.
    /// - [`RotorCryptError::ReflectorNotDerangement`] if the reflector has a
    ///   fixed point.
    /// - [`RotorCryptError::PawlCountMismatch`] if the number of moving rotors
    ///   differs from `num_pawls()`.
    /// - [`RotorCryptError::MisplacedRotor`] for a reflector past slot 0 or a
    ///   moving rotor outside the rightmost `num_pawls()` slots.
    pub fn install_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), RotorCryptError> {
        if names.len() != self.num_slots {
            return Err(RotorCryptError::SlotCountMismatch {
                expected: self.num_slots,
                found: names.len(),
            });
        }

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let id = *self
                .by_name
                .get(name)
                .ok_or_else(|| RotorCryptError::UnknownRotorName(name.to_string()))?;
            if ids.contains(&id) {
                return Err(RotorCryptError::RepeatedRotor(name.to_string()));
            }
            ids.push(id);
        }

        let reflector = &self.catalog[ids[0].0];
        if !reflector.reflecting() {
            return Err(RotorCryptError::ReflectorPositionError(
                reflector.name().to_string(),
            ));
        }
        if !reflector.permutation().is_derangement() {
            return Err(RotorCryptError::ReflectorNotDerangement(
                reflector.name().to_string(),
            ));
        }

        let moving = ids
            .iter()
            .filter(|id| self.catalog[id.0].rotates())
            .count();
        if moving != self.num_pawls {
            return Err(RotorCryptError::PawlCountMismatch {
                expected: self.num_pawls,
                found: moving,
            });
        }

        let first_moving = self.num_slots - self.num_pawls;
        for (slot, id) in ids.iter().enumerate().skip(1) {
            let rotor = &self.catalog[id.0];
            if rotor.reflecting() || rotor.rotates() != (slot >= first_moving) {
                return Err(RotorCryptError::MisplacedRotor {
                    slot,
                    rotor: rotor.name().to_string(),
                });
            }
        }

        for id in &ids {
            self.catalog[id.0].set(0)?;
        }
        self.slots = ids;

        debug!(
            rotors = ?self.rotors().map(Rotor::name).collect::<Vec<_>>(),
            "rotors installed"
        );
        Ok(())
    }

    /// Sets slots 1.. to the positions named by the symbols of `setting`,
    /// leftmost first.
    ///
    /// On error no rotor setting changes.
    ///
    /// # Errors
    /// - [`RotorCryptError::NotConfigured`] if no rotors are installed.
    /// - [`RotorCryptError::OffsetCountMismatch`] if `setting` does not hold
    ///   exactly `num_slots() - 1` symbols.
    /// - [`RotorCryptError::OutOfRange`] for a symbol not in the alphabet.
    pub fn set_offsets(&mut self, setting: &str) -> Result<(), RotorCryptError> {
        if !self.is_configured() {
            return Err(RotorCryptError::NotConfigured);
        }

        let symbols: Vec<char> = setting.chars().collect();
        if symbols.len() != self.num_slots - 1 {
            return Err(RotorCryptError::OffsetCountMismatch {
                expected: self.num_slots - 1,
                found: symbols.len(),
            });
        }

        let mut positions = Vec::with_capacity(symbols.len());
        for (slot, &c) in symbols.iter().enumerate() {
            let posn = self
                .alphabet
                .index_of(c)
                .map_err(|_| RotorCryptError::OutOfRange {
                    rotor: self.catalog[self.slots[slot + 1].0].name().to_string(),
                    setting: c.to_string(),
                })?;
            positions.push(posn);
        }

        for (slot, posn) in positions.into_iter().enumerate() {
            let id = self.slots[slot + 1];
            self.catalog[id.0].set(posn)?;
        }

        debug!(settings = %self.settings(), "offsets set");
        Ok(())
    }

    /// Replaces the plugboard.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::AlphabetMismatch`] if `plugboard` is built
    /// over a different alphabet.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), RotorCryptError> {
        if !same_alphabet(plugboard.alphabet(), &self.alphabet) {
            return Err(RotorCryptError::AlphabetMismatch("plugboard".to_string()));
        }
        debug!(plugboard = %plugboard, "plugboard set");
        self.plugboard = plugboard;
        Ok(())
    }

    /// Converts the symbol index `c` after first stepping the rotors.
    ///
    /// # Errors
    /// - [`RotorCryptError::NotConfigured`] if no rotors are installed.
    /// - [`RotorCryptError::IndexOutOfRange`] if `c` is not a valid index.
    pub fn convert_index(&mut self, c: usize) -> Result<usize, RotorCryptError> {
        if !self.is_configured() {
            return Err(RotorCryptError::NotConfigured);
        }
        if c >= self.alphabet.size() {
            return Err(RotorCryptError::IndexOutOfRange {
                index: c,
                size: self.alphabet.size(),
            });
        }
        Ok(self.convert_unchecked(c))
    }

    /// Converts every symbol of `msg` in order, stepping before each one.
    ///
    /// All symbols are validated before the first conversion, so a bad
    /// message leaves the rotor settings unchanged.
    ///
    /// # Errors
    /// - [`RotorCryptError::NotConfigured`] if no rotors are installed.
    /// - [`RotorCryptError::InvalidSymbol`] for a symbol not in the alphabet,
    ///   whitespace included.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use rotorcrypt::{Alphabet, Machine, Permutation, Rotor};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
    /// let rotors = vec![
    ///     Rotor::reflector("R", Permutation::new("(AC) (BD)", alpha.clone()).unwrap()),
    ///     Rotor::moving("M", Permutation::new("(ABD)", alpha.clone()).unwrap(), "A").unwrap(),
    /// ];
    /// let mut machine = Machine::new(alpha, 2, 1, rotors).unwrap();
    /// machine.install_rotors(&["R", "M"]).unwrap();
    ///
    /// machine.set_offsets("B").unwrap();
    /// let cipher = machine.convert("ABBA").unwrap();
    /// machine.set_offsets("B").unwrap();
    /// assert_eq!(machine.convert(&cipher).unwrap(), "ABBA");
    /// ```
    pub fn convert(&mut self, msg: &str) -> Result<String, RotorCryptError> {
        if !self.is_configured() {
            return Err(RotorCryptError::NotConfigured);
        }

        let indices = msg
            .chars()
            .map(|c| self.alphabet.index_of(c))
            .collect::<Result<Vec<_>, _>>()?;

        let alphabet = Arc::clone(&self.alphabet);
        let symbols = alphabet.symbols();
        Ok(indices
            .into_iter()
            .map(|c| symbols[self.convert_unchecked(c)])
            .collect())
    }

    /// Steps the rotors and runs `c` along the signal path.
    fn convert_unchecked(&mut self, c: usize) -> usize {
        self.advance_rotors();
        let plugged = self.plugboard.permute(c as isize);
        let out = self.plugboard.permute(self.apply_rotors(plugged) as isize);

        let symbols = self.alphabet.symbols();
        trace!(
            settings = %self.settings(),
            input = %symbols[c],
            plugboard = %symbols[plugged],
            output = %symbols[out],
            "converted"
        );
        out
    }

    /// Advances the moving rotors by one keypress.
    ///
    /// The fast rotor always advances. A moving rotor whose right-hand
    /// neighbour sits on a notch advances together with that neighbour,
    /// which produces the double step of the middle rotor. All decisions
    /// are taken from the notch positions before anything moves, and each
    /// rotor advances at most once.
    fn advance_rotors(&mut self) {
        if self.num_pawls == 0 {
            return;
        }
        let last = self.num_slots - 1;
        let first_moving = self.num_slots - self.num_pawls;

        let at_notch: Vec<bool> = self
            .slots
            .iter()
            .map(|id| self.catalog[id.0].at_notch())
            .collect();

        let turning: Vec<usize> = (first_moving..=last)
            .filter(|&k| {
                k == last || at_notch[k + 1] || (k > first_moving && at_notch[k])
            })
            .collect();

        for k in turning {
            let id = self.slots[k];
            self.catalog[id.0].step();
        }
    }

    /// Passes `c` through the rotors towards the reflector and back.
    fn apply_rotors(&self, c: usize) -> usize {
        let inbound = self
            .slots
            .iter()
            .rev()
            .fold(c, |c, id| self.catalog[id.0].convert_forward(c));
        self.slots
            .iter()
            .skip(1)
            .fold(inbound, |c, id| self.catalog[id.0].convert_backward(c))
    }
}

/// Returns true iff `a` and `b` describe the same alphabet.
fn same_alphabet(a: &Arc<Alphabet>, b: &Arc<Alphabet>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}
