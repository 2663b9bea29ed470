//! Change-propagation analyses over a document collection: impact of changing
//! one document, dependency chains with their risk factors, and the
//! implementation critical path.

mod chains;
mod critical_path;
mod impact;

pub use chains::{find_chains, DependencyChain};
pub use critical_path::{critical_path, CriticalPath};
pub use impact::{analyze_impact, ImpactAnalysis, RiskLevel};
