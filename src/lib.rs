//! exsim-dashboards - Decision-support Excel dashboards for the ExSim business simulation
//!
//! This crate reads the previous round's ExSim report workbooks and writes one
//! formula-driven decision workbook per department (CMO, Production, Purchasing,
//! CLO, CPO, ESG, CFO). Inputs that are missing or unreadable fall back to
//! neutral defaults, so every dashboard can always be generated.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use exsim_dashboards::{DashboardSelector, GeneratorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reports/ and data/ are read; dashboards/ is written
//!     let generator = GeneratorBuilder::new().build()?;
//!
//!     for (dashboard, result) in generator.generate_all(&DashboardSelector::All) {
//!         match result {
//!             Ok(report) => println!("{}: {} tabs", dashboard, report.tabs.len()),
//!             Err(e) => eprintln!("{} failed: {}", dashboard, e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Single Dashboard
//!
//! ```rust,no_run
//! use exsim_dashboards::{Dashboard, GeneratorBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = GeneratorBuilder::new()
//!     .with_reports_dir("round3/Reports")
//!     .with_output_dir("round3/dashboards")
//!     .with_case_parameters(true)
//!     .build()?;
//!
//! let report = generator.generate(Dashboard::Finance)?;
//! println!("inputs defaulted: {:?}", report.inputs_defaulted);
//! # Ok(())
//! # }
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use exsim_dashboards::{validate_workbook, Dashboard};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = validate_workbook("dashboards/Logistics_Dashboard.xlsx", Dashboard::Logistics)?;
//! assert!(report.is_valid(), "{:?}", report.issues);
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
pub mod case;
pub mod compute;
mod dashboards;
mod error;
mod layout;
pub mod logger;
mod parser;
mod security;
mod shared;
mod types;
mod validate;

// 公開API
pub use api::{Dashboard, DashboardSelector, GenerationReport};
pub use builder::{Generator, GeneratorBuilder, GeneratorConfig};
pub use error::DashboardError;
pub use shared::{SharedOutputs, SHARED_OUTPUTS_FILE};
pub use types::{Segment, Zone, ZoneMap};
pub use validate::{
    detect_dashboard, validate_workbook, PackageSummary, ValidationIssue, ValidationReport,
};
