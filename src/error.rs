//! Error types for the rotorcrypt library.

use thiserror::Error;

/// Errors produced by the rotorcrypt library.
///
/// All of them are configuration or usage errors detected at the point of
/// misuse; none are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotorCryptError {
    /// Alphabet built from an empty symbol sequence.
    #[error("Alphabet must contain at least one symbol")]
    EmptyAlphabet,
    /// Alphabet symbol sequence contains a repeat.
    #[error("Duplicate symbol '{0}' in alphabet")]
    DuplicateSymbol(char),
    /// Symbol is not a member of the alphabet.
    #[error("Symbol '{0}' is not in the alphabet")]
    InvalidSymbol(char),
    /// Index lookup outside `[0, size)`.
    #[error("Index {index} is outside the alphabet range [0, {size})")]
    IndexOutOfRange { index: usize, size: usize },
    /// Cycle notation could not be parsed.
    #[error("Malformed cycle notation: {0}")]
    MalformedCycles(String),
    /// A permutation or rotor was built over a different alphabet.
    #[error("'{0}' is not built over the machine alphabet")]
    AlphabetMismatch(String),
    /// Rotor setting is not a valid position.
    #[error("Setting {setting} is out of range for rotor {rotor}")]
    OutOfRange { rotor: String, setting: String },
    /// Advance requested on a reflector or fixed rotor.
    #[error("Rotor {0} does not rotate")]
    NotRotating(String),
    /// Slot and pawl counts violate `1 < slots` and `pawls < slots`.
    #[error("Invalid machine shape: {slots} slots with {pawls} pawls")]
    InvalidMachineShape { slots: usize, pawls: usize },
    /// Two catalog rotors share a name.
    #[error("Duplicate rotor name {0} in catalog")]
    DuplicateRotorName(String),
    /// Requested rotor is not in the catalog.
    #[error("Unknown rotor name {0}")]
    UnknownRotorName(String),
    /// The same rotor was selected for two slots.
    #[error("Rotor {0} is selected more than once")]
    RepeatedRotor(String),
    /// Number of selected rotors differs from the slot count.
    #[error("Expected {expected} rotors, found {found}")]
    SlotCountMismatch { expected: usize, found: usize },
    /// Slot 0 does not hold a reflector.
    #[error("First rotor {0} should reflect")]
    ReflectorPositionError(String),
    /// Reflector wiring has a fixed point.
    #[error("Reflector {0} wiring is not a derangement")]
    ReflectorNotDerangement(String),
    /// Reflector outside slot 0, or a moving rotor outside the pawl slots.
    #[error("Rotor {rotor} cannot occupy slot {slot}")]
    MisplacedRotor { slot: usize, rotor: String },
    /// Number of moving rotors differs from the pawl count.
    #[error("Expected {expected} moving rotors, found {found}")]
    PawlCountMismatch { expected: usize, found: usize },
    /// Offset string length differs from `slots - 1`.
    #[error("Expected {expected} settings, found {found}")]
    OffsetCountMismatch { expected: usize, found: usize },
    /// Conversion requested before rotors and offsets were set.
    #[error("Machine has no rotors installed")]
    NotConfigured,
    /// Machine description ended before its header was complete.
    #[error("Configuration truncated: {0}")]
    ConfigTruncated(String),
    /// The slot or pawl count in the machine file is not a number.
    #[error("Bad machine header: {0}")]
    BadHeader(String),
    /// A rotor description in the machine file is malformed.
    #[error("Bad rotor description: {0}")]
    BadRotorDescription(String),
    /// A setting line is malformed.
    #[error("Bad setting line: {0}")]
    BadSetting(String),
    /// A message arrived before any setting line.
    #[error("Message before the first setting line")]
    MissingSetting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_duplicate_symbol() {
        let err = RotorCryptError::DuplicateSymbol('A');
        assert_eq!(format!("{}", err), "Duplicate symbol 'A' in alphabet");
    }

    #[test]
    fn test_display_reflector_position() {
        let err = RotorCryptError::ReflectorPositionError("Beta".to_string());
        assert_eq!(format!("{}", err), "First rotor Beta should reflect");
    }

    #[test]
    fn test_display_pawl_count_mismatch() {
        let err = RotorCryptError::PawlCountMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(format!("{}", err), "Expected 3 moving rotors, found 2");
    }

    #[test]
    fn test_display_offset_count_mismatch() {
        let err = RotorCryptError::OffsetCountMismatch {
            expected: 4,
            found: 3,
        };
        assert_eq!(format!("{}", err), "Expected 4 settings, found 3");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            RotorCryptError::NotRotating("B".to_string()),
            RotorCryptError::NotRotating("B".to_string())
        );
        assert_ne!(
            RotorCryptError::InvalidSymbol('a'),
            RotorCryptError::DuplicateSymbol('a')
        );
    }

    #[test]
    fn test_error_clone() {
        let err = RotorCryptError::UnknownRotorName("IX".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
