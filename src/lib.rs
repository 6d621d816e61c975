//! Rotor cipher machine engine.
//!
//! rotorcrypt simulates an electromechanical rotor cipher: a stack of
//! rotating substitution wheels behind a plugboard, closed by a reflector.
//! The resulting transform is its own inverse, so the same machine setting
//! both encrypts and decrypts.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbols <-> dense indices [0, N))
//!     ↓ shared by
//! Permutation  (cycle notation, precomputed forward and inverse tables)
//!     ↓ wired into
//! Rotor        (Reflector | Fixed | Moving, plus a rotational offset)
//!     ↓ N slots, reflector in slot 0, moving rotors on the right
//! Machine      (double-stepping pawls + plugboard signal path)
//!     ↓ driven by
//! Session      (setting lines and grouped message lines)
//! ```
//!
//! # Examples
//!
//! Build a small machine by hand and check that it is reciprocal:
//!
//! ```
//! use std::sync::Arc;
//! use rotorcrypt::{Alphabet, Machine, Permutation, Rotor};
//!
//! let alpha = Arc::new(Alphabet::new("ABCDEF").unwrap());
//! let rotors = vec![
//!     Rotor::reflector("R", Permutation::new("(AD) (BE) (CF)", alpha.clone()).unwrap()),
//!     Rotor::moving("M1", Permutation::new("(ABCDEF)", alpha.clone()).unwrap(), "C").unwrap(),
//!     Rotor::moving("M2", Permutation::new("(AFB) (CE)", alpha.clone()).unwrap(), "E").unwrap(),
//! ];
//! let mut machine = Machine::new(alpha.clone(), 3, 2, rotors).unwrap();
//! machine.install_rotors(&["R", "M1", "M2"]).unwrap();
//! machine.set_plugboard(Permutation::new("(AB)", alpha).unwrap()).unwrap();
//!
//! machine.set_offsets("BD").unwrap();
//! let cipher = machine.convert("FACADE").unwrap();
//! assert_ne!(cipher, "FACADE");
//!
//! machine.set_offsets("BD").unwrap();
//! assert_eq!(machine.convert(&cipher).unwrap(), "FACADE");
//! ```
//!
//! Or read the text formats:
//!
//! ```
//! use rotorcrypt::config::parse_machine;
//! use rotorcrypt::Session;
//!
//! let config = "ABCDEFGHIJKLMNOPQRSTUVWXYZ
//!  5 3
//!  I MQ   (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!  III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//!  IV MJ  (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
//!  Beta N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!  B R    (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
//! ";
//! let mut session = Session::new(parse_machine(config).unwrap());
//! session.process_line("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)").unwrap();
//! let line = session.process_line("FROM HIS SHOULDER HIAWATHA").unwrap();
//! assert_eq!(line.as_deref(), Some("QVPQS OKOIL PUBKJ ZPISF XDW"));
//! ```

#![deny(clippy::all)]

pub mod config;
pub mod error;

mod alphabet;
mod machine;
mod permutation;
mod rotor;
mod session;
pub(crate) mod utils;

pub use alphabet::Alphabet;
pub use error::RotorCryptError;
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};
pub use session::Session;
