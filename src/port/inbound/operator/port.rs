//! Unified operator capability surface for inbound adapters.

use super::configuration::ConfigurationOperator;
use super::run::RunOperator;
use super::store::StoreOperator;

/// Unified operator capability surface consumed by inbound adapters.
pub trait OperatorPort: ConfigurationOperator + RunOperator + StoreOperator {}

impl<T> OperatorPort for T where T: ConfigurationOperator + RunOperator + StoreOperator {}
