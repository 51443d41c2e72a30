//! Invite codes: short, human-typed match identifiers

use rand::Rng;
use serde::Serialize;
use std::fmt;

pub const INVITE_LEN: usize = 5;

/// Uppercase letters and digits without I, O, 0 and 1
pub const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Canonical (uppercase) invite code
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    /// Draw a fresh code; uniqueness is the registry's job
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..INVITE_LEN)
            .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Canonical form of user input. Only case is normalized; unknown codes
    /// simply fail lookup.
    pub fn normalize(input: &str) -> Self {
        Self(input.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
