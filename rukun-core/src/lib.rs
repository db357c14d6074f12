//! Rukun Core - Entity Types
//!
//! Pure data structures shared by the data-access layer: domain records,
//! lifecycle enums, request bodies, response envelopes and the typed API
//! error. This crate contains ONLY data types - no I/O.

use chrono::{DateTime, Utc};

pub mod entities;
pub mod enums;
pub mod envelope;
pub mod error;
pub mod requests;

pub use entities::*;
pub use enums::*;
pub use envelope::*;
pub use error::*;
pub use requests::*;

/// Server-assigned identifier. Ids are opaque strings on the wire.
pub type EntityId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Amount of money in whole Rupiah.
pub type Rupiah = i64;
