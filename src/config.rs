//! Text formats for machine descriptions and setting lines.
//!
//! A machine description holds the alphabet on its first line, then the
//! slot and pawl counts, then one description per available rotor:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//!  I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!  Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!  B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!            (RX) (SZ) (TV)
//! ```
//!
//! The type letter is `M` (moving, followed by its notches), `N` (fixed) or
//! `R` (reflector). A setting line selects rotors, offsets and plugboard:
//!
//! ```text
//! * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)
//! ```

use std::iter::Peekable;
use std::sync::Arc;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::error::RotorCryptError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Symbols with a meaning of their own in the text formats.
const RESERVED_SYMBOLS: [char; 3] = ['(', ')', '*'];

/// Builds a machine from a machine description.
///
/// # Errors
/// - [`RotorCryptError::ConfigTruncated`] if the alphabet or counts are missing.
/// - [`RotorCryptError::BadHeader`] if a count is not a number.
/// - [`RotorCryptError::InvalidSymbol`] if the alphabet holds whitespace
///   or one of `(`, `)`, `*`.
/// - [`RotorCryptError::BadRotorDescription`] for a malformed rotor entry.
/// - Any error from building the alphabet, permutations, rotors or machine.
///
/// # Examples
///
/// ```
/// use rotorcrypt::config::parse_machine;
///
/// let text = "ABCD\n2 1\nR R (AC) (BD)\nM MA (ABD)\n";
/// let machine = parse_machine(text).unwrap();
/// assert_eq!(machine.num_slots(), 2);
/// assert_eq!(machine.catalog().len(), 2);
/// ```
pub fn parse_machine(text: &str) -> Result<Machine, RotorCryptError> {
    let mut lines = text.lines();
    let first = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| RotorCryptError::ConfigTruncated("missing alphabet".to_string()))?;

    if let Some(c) = first
        .chars()
        .find(|c| c.is_whitespace() || RESERVED_SYMBOLS.contains(c))
    {
        return Err(RotorCryptError::InvalidSymbol(c));
    }
    let alphabet = Arc::new(Alphabet::new(first)?);

    let mut tokens = lines.flat_map(str::split_whitespace).peekable();
    let num_slots = next_count(&mut tokens, "slot")?;
    let num_pawls = next_count(&mut tokens, "pawl")?;

    let mut rotors = Vec::new();
    while let Some(name) = tokens.next() {
        rotors.push(parse_rotor(name, &mut tokens, &alphabet)?);
    }

    debug!(
        alphabet = %alphabet,
        rotors = rotors.len(),
        "machine description parsed"
    );
    Machine::new(alphabet, num_slots, num_pawls, rotors)
}

/// Reads one of the two header counts.
fn next_count<'a, I>(tokens: &mut I, what: &str) -> Result<usize, RotorCryptError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or_else(|| RotorCryptError::ConfigTruncated(format!("missing {} count", what)))?;
    token
        .parse()
        .map_err(|_| RotorCryptError::BadHeader(format!("{} count '{}' is not a number", what, token)))
}

/// Parses the rotor description that starts with `name`.
fn parse_rotor<'a, I>(
    name: &str,
    tokens: &mut Peekable<I>,
    alphabet: &Arc<Alphabet>,
) -> Result<Rotor, RotorCryptError>
where
    I: Iterator<Item = &'a str>,
{
    if name.starts_with('(') {
        return Err(RotorCryptError::BadRotorDescription(format!(
            "cycle {} has no rotor",
            name
        )));
    }

    let type_and_notches = tokens.next().ok_or_else(|| {
        RotorCryptError::BadRotorDescription(format!("rotor {} has no type", name))
    })?;
    let mut chars = type_and_notches.chars();
    let kind = chars.next();
    let notches = chars.as_str();

    let mut cycles = String::new();
    while let Some(token) = tokens.next_if(|t| t.starts_with('(')) {
        if !token.ends_with(')') {
            return Err(RotorCryptError::BadRotorDescription(format!(
                "rotor {} has unclosed cycle {}",
                name, token
            )));
        }
        cycles.push_str(token);
        cycles.push(' ');
    }
    let permutation = Permutation::new(&cycles, alphabet.clone())?;

    match kind {
        Some('M') => Rotor::moving(name, permutation, notches),
        Some('N') | Some('R') if !notches.is_empty() => Err(RotorCryptError::BadRotorDescription(
            format!("rotor {} cannot have notches", name),
        )),
        Some('N') => Ok(Rotor::fixed(name, permutation)),
        Some('R') => Ok(Rotor::reflector(name, permutation)),
        _ => Err(RotorCryptError::BadRotorDescription(format!(
            "rotor {} has unknown type {}",
            name, type_and_notches
        ))),
    }
}

/// One parsed setting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Rotor names, reflector first.
    pub rotors: Vec<String>,
    /// Initial positions of slots 1.., leftmost first.
    pub offsets: String,
    /// Plugboard in cycle notation, possibly empty.
    pub plugboard: String,
}

impl Setting {
    /// Parses a setting line for a machine with `num_slots` slots.
    ///
    /// # Errors
    /// Returns [`RotorCryptError::BadSetting`] if the line does not start
    /// with `*` or lacks rotor names or offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotorcrypt::config::Setting;
    ///
    /// let setting = Setting::parse("* B Beta III IV I AXLE (YF) (ZH)", 5).unwrap();
    /// assert_eq!(setting.rotors, ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(setting.offsets, "AXLE");
    /// assert_eq!(setting.plugboard, "(YF) (ZH)");
    /// ```
    pub fn parse(line: &str, num_slots: usize) -> Result<Self, RotorCryptError> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("*") {
            return Err(RotorCryptError::BadSetting(
                "setting lines start with '*'".to_string(),
            ));
        }

        let mut rotors = Vec::with_capacity(num_slots);
        for _ in 0..num_slots {
            match tokens.next() {
                Some(name) if !name.starts_with('(') => rotors.push(name.to_string()),
                _ => {
                    return Err(RotorCryptError::BadSetting(format!(
                        "expected {} rotor names, found {}",
                        num_slots,
                        rotors.len()
                    )))
                }
            }
        }

        let offsets = match tokens.next() {
            Some(offsets) if !offsets.starts_with('(') => offsets.to_string(),
            _ => {
                return Err(RotorCryptError::BadSetting(
                    "missing rotor offsets".to_string(),
                ))
            }
        };

        let plugboard = tokens.collect::<Vec<_>>().join(" ");
        Ok(Setting {
            rotors,
            offsets,
            plugboard,
        })
    }

    /// Installs the rotors, offsets and plugboard into `machine`.
    ///
    /// Either every part is applied or, on error, `machine` is unchanged.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), RotorCryptError> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet().clone())?;

        let mut staged = machine.clone();
        staged.install_rotors(self.rotors.as_slice())?;
        staged.set_offsets(&self.offsets)?;
        staged.set_plugboard(plugboard)?;
        *machine = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "ABCDE\n 3 1\n R1 R (AB) (CE) (D\n";

    const CONFIG: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ
 5 3
 I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
 II ME     (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
 III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
 IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
 Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
 B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
           (RX) (SZ) (TV)
";

    #[test]
    fn test_parse_catalog() {
        let machine = parse_machine(CONFIG).unwrap();
        assert_eq!(machine.num_slots(), 5);
        assert_eq!(machine.num_pawls(), 3);
        let names: Vec<&str> = machine.catalog().iter().map(Rotor::name).collect();
        assert_eq!(names, ["I", "II", "III", "IV", "Beta", "B"]);

        let reflector = &machine.catalog()[5];
        assert!(reflector.reflecting());
        assert!(reflector.permutation().is_derangement());
        assert_eq!(reflector.permutation().permute_symbol('T').unwrap(), 'V');

        let rotor_i = &machine.catalog()[0];
        assert!(rotor_i.rotates());
        assert_eq!(rotor_i.permutation().permute_symbol('A').unwrap(), 'E');
    }

    #[test]
    fn test_setting_then_convert() {
        let mut machine = parse_machine(CONFIG).unwrap();
        let setting = Setting::parse("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)", 5).unwrap();
        setting.apply(&mut machine).unwrap();
        assert_eq!(
            machine.convert("FROMHISSHOULDERHIAWATHA").unwrap(),
            "QVPQSOKOILPUBKJZPISFXDW"
        );
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            parse_machine(""),
            Err(RotorCryptError::ConfigTruncated(_))
        ));
        assert!(matches!(
            parse_machine("ABC\n3"),
            Err(RotorCryptError::ConfigTruncated(_))
        ));
        assert!(matches!(
            parse_machine("ABC\nthree 1"),
            Err(RotorCryptError::BadHeader(_))
        ));
    }

    #[test]
    fn test_reserved_alphabet_symbol() {
        assert!(matches!(
            parse_machine("AB(C\n2 1\n"),
            Err(RotorCryptError::InvalidSymbol('('))
        ));
    }

    #[test]
    fn test_unclosed_cycle() {
        assert!(matches!(
            parse_machine(SMALL),
            Err(RotorCryptError::BadRotorDescription(_))
        ));
    }

    #[test]
    fn test_bad_rotor_types() {
        for text in [
            "ABC\n2 1\nX Q (AB)\n",
            "ABC\n2 1\nX NA (AB)\n",
            "ABC\n2 1\nX\n",
            "ABC\n2 1\n(AB)\n",
        ] {
            assert!(
                matches!(parse_machine(text), Err(RotorCryptError::BadRotorDescription(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_rotor_without_cycles_is_identity() {
        let machine = parse_machine("ABC\n2 1\nR R (AB)\nM MC\n").unwrap();
        let moving = &machine.catalog()[1];
        assert_eq!(moving.permutation().to_string(), "");
    }

    #[test]
    fn test_setting_errors() {
        assert!(matches!(
            Setting::parse("B Beta III IV I AXLE", 5),
            Err(RotorCryptError::BadSetting(_))
        ));
        assert!(matches!(
            Setting::parse("* B Beta III IV", 5),
            Err(RotorCryptError::BadSetting(_))
        ));
        assert!(matches!(
            Setting::parse("* B Beta III IV I (AB)", 5),
            Err(RotorCryptError::BadSetting(_))
        ));
    }

    #[test]
    fn test_setting_without_plugboard() {
        let setting = Setting::parse("* B Beta III IV I AAAA", 5).unwrap();
        assert_eq!(setting.plugboard, "");
    }

    #[test]
    fn test_failed_apply_leaves_machine() {
        let mut machine = parse_machine(CONFIG).unwrap();
        Setting::parse("* B Beta III IV I AXLE", 5)
            .unwrap()
            .apply(&mut machine)
            .unwrap();

        let bad = Setting::parse("* B Beta II IV I AXL", 5).unwrap();
        assert!(matches!(
            bad.apply(&mut machine),
            Err(RotorCryptError::OffsetCountMismatch { .. })
        ));
        assert_eq!(machine.rotor(2).unwrap().name(), "III");
        assert_eq!(machine.settings(), "AXLE");
    }
}
