//! STOWAWAY Protocol - Codec Layer
//!
//! Turns the ordered binary sections produced by a cipher suite into one
//! string that is safe for the constrained free-text channel, and back:
//!
//! - [`joiner`]: reversible packing of N sections into one text-safe string
//! - [`sniffer`]: cheap structural classification of candidate tokens
//! - [`PayloadCodec`]: header framing + joining + cipher suite, composed
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ^Stowaway^ V  b64(nonce) ! b64(ct‖tag)      │
//! │  └───header───┘└────────joined sections────┘ │
//! └──────────────────────────────────────────────┘
//! ```

mod payload;

pub mod joiner;
pub mod sniffer;

pub use payload::*;
