//! Domain models for special orders and their lifecycle.

mod directory;
mod draft;
mod order;
mod reason;

pub use directory::{Client, Supplier, client_phone_for};
pub use draft::{IMEI_MAX_LEN, OrderDraft, OrderUpdate};
pub use order::{CartonGrade, ItemType, OrderError, OrderStatus, SpecialOrder, StatusChange};
pub use reason::{CancellationReason, ReplacementReason};
