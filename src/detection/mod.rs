//! Detection ingestion contract
//!
//! Payloads arrive from the detector on their own thread or task, land in a
//! single-slot buffer, and are polled by the engine at tick boundaries.

pub mod feed;
pub mod frame;
pub mod payload;

pub use feed::{DetectionFeed, DetectionSlot, DetectionSource};
pub use frame::{Detection, DetectionFrame};
pub use payload::{DetectionPayload, PayloadDefect};
