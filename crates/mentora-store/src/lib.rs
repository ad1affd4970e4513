//! # mentora-store
//!
//! Local document store for Mentora, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for profiles,
//! offerings and bookings, plus the durable key/value slots the booking flow
//! uses to survive a reload while a payment is in progress.

pub mod bookings;
pub mod database;
pub mod migrations;
pub mod offerings;
pub mod profiles;
pub mod slots;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
