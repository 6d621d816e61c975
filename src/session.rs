//! Session: drives a machine through a sequence of input lines.
//!
//! Setting lines (first token `*`) reconfigure the machine, blank lines are
//! echoed, and every other line is converted and printed in groups of five.

use tracing::debug;

use crate::config::Setting;
use crate::error::RotorCryptError;
use crate::machine::Machine;
use crate::utils::text;

/// Output group width for converted messages.
const GROUP_SIZE: usize = 5;

/// A machine together with the line protocol that configures and feeds it.
#[derive(Debug, Clone)]
pub struct Session {
    machine: Machine,
    has_setting: bool,
}

impl Session {
    /// Creates a session around a freshly built `machine`.
    ///
    /// A setting line must be processed before the first message.
    pub fn new(machine: Machine) -> Self {
        Session {
            machine,
            has_setting: false,
        }
    }

    /// Returns the underlying machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Processes one input line.
    ///
    /// # Returns
    /// `None` for setting lines, otherwise the line to emit: empty for a
    /// blank input line, or the converted message in groups of five.
    ///
    /// # Errors
    /// - [`RotorCryptError::MissingSetting`] for a message before any setting.
    /// - Any error from parsing or applying a setting, or converting a message.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotorcrypt::config::parse_machine;
    /// use rotorcrypt::Session;
    ///
    /// let machine = parse_machine("ABCD\n2 1\nR R (AC) (BD)\nM MA (ABD)\n").unwrap();
    /// let mut session = Session::new(machine);
    /// assert_eq!(session.process_line("* R M B").unwrap(), None);
    /// let cipher = session.process_line("AB BA").unwrap().unwrap();
    ///
    /// session.process_line("* R M B").unwrap();
    /// assert_eq!(session.process_line(&cipher).unwrap().unwrap(), "ABBA");
    /// ```
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>, RotorCryptError> {
        if line.trim_start().starts_with('*') {
            let setting = Setting::parse(line, self.machine.num_slots())?;
            setting.apply(&mut self.machine)?;
            self.has_setting = true;
            debug!(
                rotors = ?setting.rotors,
                offsets = %setting.offsets,
                "setting applied"
            );
            return Ok(None);
        }

        let message = text::strip_whitespace(line);
        if message.is_empty() {
            return Ok(Some(String::new()));
        }
        if !self.has_setting {
            return Err(RotorCryptError::MissingSetting);
        }

        let converted = self.machine.convert(&message)?;
        Ok(Some(text::group(&converted, GROUP_SIZE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_machine;

    const CONFIG: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ
 5 3
 I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
 III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
 IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
 Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
 B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
           (RX) (SZ) (TV)
";

    fn session() -> Session {
        Session::new(parse_machine(CONFIG).unwrap())
    }

    #[test]
    fn test_message_before_setting() {
        let mut session = session();
        assert_eq!(
            session.process_line("HELLO"),
            Err(RotorCryptError::MissingSetting)
        );
    }

    #[test]
    fn test_blank_line_echoed() {
        let mut session = session();
        assert_eq!(session.process_line("").unwrap(), Some(String::new()));
        assert_eq!(session.process_line("   ").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_grouped_output_continues_across_lines() {
        let mut session = session();
        assert_eq!(
            session
                .process_line("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)")
                .unwrap(),
            None
        );
        assert_eq!(
            session.process_line("FROM his shoulder Hiawatha"),
            Err(RotorCryptError::InvalidSymbol('h'))
        );
        assert_eq!(
            session.process_line("FROM HIS SHOULDER HIAWATHA").unwrap().unwrap(),
            "QVPQS OKOIL PUBKJ ZPISF XDW"
        );
        assert_eq!(
            session.process_line("TOOK THE CAMERA OF ROSEWOOD").unwrap().unwrap(),
            "BHCNS CXNUO AATZX SRCFY DGU"
        );
        assert_eq!(session.machine().settings(), "AXNY");
    }

    #[test]
    fn test_new_setting_resets() {
        let mut session = session();
        let setting = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)";
        session.process_line(setting).unwrap();
        let first = session.process_line("HIAWATHA").unwrap();
        session.process_line(setting).unwrap();
        let second = session.process_line("HIAWATHA").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_setting_line() {
        let mut session = session();
        assert!(matches!(
            session.process_line("* B Beta III IV I"),
            Err(RotorCryptError::BadSetting(_))
        ));
        assert_eq!(
            session.process_line("HELLO"),
            Err(RotorCryptError::MissingSetting)
        );
    }
}
