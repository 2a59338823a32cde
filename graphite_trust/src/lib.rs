//! GraphiteTrust: wallet trust scores, compliance metrics and account
//! activity from the Graphite explorer API, plus the development proxy that
//! fronts it.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod proxy;
pub mod query;

pub use api::{ClientError, ExplorerApi, GraphiteClient};
pub use config::{Config, ConfigError};
pub use dashboard::Dashboard;
pub use query::{QueryCache, QueryState, Queries};
