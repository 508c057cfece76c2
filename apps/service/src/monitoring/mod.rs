/// Monitoring engine
///
/// This module is responsible for:
/// - Checking whether the monitor itself is online (connectivity gate)
/// - Probing sites over HTTP and classifying the outcome
/// - Driving the per-tick cycle that stores results and raises one alert
pub mod checker;
pub mod classifier;
pub mod connectivity;
pub mod executor;
pub mod scheduler;
pub mod types;


pub use checker::HttpChecker;
pub use connectivity::HttpConnectivityGate;
pub use executor::MonitoringExecutor;
pub use scheduler::{MonitoringScheduler, TickReport};
