//! Performance helpers: backend selection, metrics and a generic pool

pub mod monitor;
pub mod optimizer;
pub mod pool;

pub use monitor::{MetricSummary, PerformanceMonitor};
pub use optimizer::{Backends, CompressionBackend, HashBackend, JsonStyle, PerformanceOptimizer};
pub use pool::{ConnectionFactory, ConnectionPool};
