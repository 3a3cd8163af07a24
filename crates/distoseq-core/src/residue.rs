//! Amino-acid alphabet and its numeric codes.
//!
//! Codes are 1-indexed so that `0` is free for padding. Anything outside the
//! twenty standard residues (U, Z, X, B, O, lowercase noise, ...) maps to
//! [`UNKNOWN_CODE`], which is a class of its own and never collides with padding.
use strum::{Display, EnumIter, IntoEnumIterator};

pub const PAD_CODE: u32 = 0;
pub const UNKNOWN_CODE: u32 = 21;
/// Padding + 20 standard residues + unknown.
pub const VOCAB_SIZE: usize = 22;

pub const STANDARD_AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";
pub const NON_STANDARD_AMINO_ACIDS: &str = "UZX";

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AminoAcid {
    A = 1,  C = 2,  D = 3,  E = 4,  F = 5,
    G = 6,  H = 7,  I = 8,  K = 9,  L = 10,
    M = 11, N = 12, P = 13, Q = 14, R = 15,
    S = 16, T = 17, V = 18, W = 19, Y = 20,
}

impl AminoAcid {
    #[rustfmt::skip]
    pub fn from_char(aa: char) -> Option<Self> {
        match aa.to_ascii_uppercase() {
            'A' => Some(Self::A), 'C' => Some(Self::C), 'D' => Some(Self::D),
            'E' => Some(Self::E), 'F' => Some(Self::F), 'G' => Some(Self::G),
            'H' => Some(Self::H), 'I' => Some(Self::I), 'K' => Some(Self::K),
            'L' => Some(Self::L), 'M' => Some(Self::M), 'N' => Some(Self::N),
            'P' => Some(Self::P), 'Q' => Some(Self::Q), 'R' => Some(Self::R),
            'S' => Some(Self::S), 'T' => Some(Self::T), 'V' => Some(Self::V),
            'W' => Some(Self::W), 'Y' => Some(Self::Y), _   => None,
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn letter(&self) -> char {
        // Display renders the variant name, which is the one-letter code.
        self.to_string().chars().next().unwrap_or('X')
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::iter().find(|aa| aa.code() == code)
    }
}

/// Map a residue letter to its model code.
pub fn aa1_to_code(aa: char) -> u32 {
    AminoAcid::from_char(aa).map_or(UNKNOWN_CODE, |aa| aa.code())
}

/// Inverse of [`aa1_to_code`]; padding renders as `-`, unknown as `X`.
pub fn code_to_aa1(code: u32) -> char {
    match code {
        PAD_CODE => '-',
        _ => AminoAcid::from_code(code).map_or('X', |aa| aa.letter()),
    }
}
