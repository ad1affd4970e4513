//! # mentora-client
//!
//! Client core of the Mentora booking site: the access gate for protected
//! pages and the booking flow with payment hand-off and reconciliation.

pub mod backend;
pub mod booking;
pub mod collab;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod payment;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use booking::{BookingFlow, BookingState, Recovered};
pub use config::ClientConfig;
pub use error::FlowError;
pub use gate::GateDecision;
pub use session::{SessionContext, SessionHandle};
pub use state::AppState;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mentora_client=debug,mentora_store=info,warn"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if installed.is_ok() {
        tracing::info!("Starting Mentora client");
    }
}
