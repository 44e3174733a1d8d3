//! STOWAWAY Protocol - Link Layer
//!
//! Pairs a platform-native (Bedrock) identity with a primary-realm (Java)
//! identity through short, time-limited link codes:
//!
//! - [`LinkRequest`] / [`LinkedPlayer`]: the pending and durable records
//! - [`LinkRequestStore`] / [`LinkedPlayerStore`]: storage seams with
//!   atomic, exactly-once consumption
//! - [`MemoryLinkStore`]: mutex-guarded reference implementation
//! - [`LinkAuthority`]: optional remote service that knows links this
//!   deployment does not
//! - [`LinkService`]: code creation, verification and lookup

mod remote;
mod request;
mod service;
mod store;

pub use remote::*;
pub use request::*;
pub use service::*;
pub use store::*;
