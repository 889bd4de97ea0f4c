#![forbid(unsafe_code)]

//! `allotax` drives the allotaxonometer chart pipeline and keeps its benchmark history.
//!
//! - [`chart`]: feed two ranked datasets and a divergence parameter to the Node renderer,
//!   store the HTML it prints and convert it with a [`pdf::PdfStrategy`].
//! - [`bench`]: rolling benchmark history with regression printouts.
//!
//! The rank-turbulence divergence itself is computed by the external JS library; nothing in
//! this crate re-implements it.

pub mod bench;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pdf;

pub use chart::{
    Alpha, ChartOutcome, ChartOutputs, ChartRenderer, ChartRequest, PdfOutcome, ProcessRenderer,
    Rendered, generate_chart,
};
pub use config::ChartConfig;
pub use dataset::{Dataset, strip_export_statement};
pub use error::{Error, Result};
pub use pdf::PdfStrategy;
