/// Message bus: registry, registration, unregistration and dispatch.
pub mod bus;
/// Settings loading (bus policy, logging).
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Logging initialization (filters, formats).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Bus API.
pub use bus::{
    init_messenger, messenger, BusStatsSnapshot, Handler, MessageBus, Receiver,
    SubscriptionHandle, SubscriptionId,
};
/// Configuration.
pub use config::{BusConfig, DispatchPolicy, Settings};
/// Errors and result types.
pub use error::{BusError, BusResult, HandlerFailure, SettingsError, StackError};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};
