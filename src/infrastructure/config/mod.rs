//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;
pub mod solver;
pub mod store;

pub use logging::LoggingConfig;
pub use settings::Config;
pub use solver::SolverConfig;
pub use store::StoreConfig;
