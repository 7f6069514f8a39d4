//! Weekly team status report pipeline.
//!
//! This crate builds a weekly status report by combining an issue tracker
//! section and a code host section for one Wednesday-to-Tuesday window. It
//! owns window validation, the on-disk report cache, layered source
//! configuration, failure isolation between the sources, and the optional
//! executive summary instructions.
//!
//! The sources themselves are collaborators behind [`GeneratorFactory`] and
//! [`ReportGenerator`], so the pipeline can be exercised without network access.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use team_status_core::{
//!     ConfigResolver, Credentials, GeneratorFactory, ReportCache, ReportPipeline,
//!     ReportRequest, SourceAggregator,
//! };
//!
//! # async fn example(factory: Arc<dyn GeneratorFactory>) -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ReportPipeline::new(
//!     ReportCache::new("Reports"),
//!     ConfigResolver::new("config"),
//!     SourceAggregator::new(factory),
//! );
//!
//! let request = ReportRequest {
//!     start_date: Some("2024-01-10".to_string()),
//!     ..ReportRequest::default()
//! };
//! let outcome = pipeline.run(&request, &Credentials::from_env()).await?;
//! println!("Report stored at {:?}", outcome.path());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod pipeline;
pub mod sources;
pub mod summary;
pub mod window;

pub use cache::ReportCache;
pub use config::{ConfigMap, ConfigResolver, EffectiveConfig, SourceName};
pub use credentials::{Credentials, ValidatedCredentials};
pub use errors::{ReportError, ReportResult, TemplateError, WindowError};
pub use pipeline::{Clock, ReportOutcome, ReportPipeline, ReportRequest, SystemClock};
pub use sources::{
    GeneratedReport, GeneratorFactory, ReportGenerator, SourceAggregator, SourceReport,
};
pub use summary::{SummaryEnricher, DEFAULT_SUMMARY_PROMPT};
pub use window::ReportingWindow;
