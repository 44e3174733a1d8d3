//! STOWAWAY Protocol - Crypto Layer
//!
//! Implements the cipher suites that protect the embedded identity payload:
//! - AES-256-GCM AEAD (confidentiality + integrity)
//! - Ed25519 signatures (integrity/authenticity without confidentiality)
//! - Key material handling and on-demand key production
//!
//! Every suite turns a plaintext into an ordered list of binary sections
//! and reverses the process. Sections are meaningless individually; only a
//! suite bound to the matching key can decode them.

mod aead;
mod ed25519;
mod key;
mod suite;

pub use aead::*;
pub use ed25519::*;
pub use key::*;
pub use suite::*;
