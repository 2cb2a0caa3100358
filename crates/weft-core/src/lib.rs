//! # Weft Core
//!
//! A columnar full-join engine for heterogeneous, sparsely-covered
//! time-series tables.
//!
//! Weft merges independent "variable tables" — observations keyed by entity
//! and year or day, each with its own sparse time coverage — into one
//! denormalized table usable for charting and export.
//!
//! ## Features
//!
//! - **Columnar tables**: slug → typed value array, immutable by
//!   construction; transformations return new tables over shared storage
//! - **Full outer join** with a primary composite key and prioritized
//!   fallback keys for tables with partial key coverage
//! - **Day/year time duality**: epoch normalization and cross-resolution
//! - **Target-time pinning** with tolerance and later-time tie-breaks
//! - **Gaps are data**: unresolved cells hold typed error sentinels, never
//!   abort a join
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weft_core::{full_join_tables, JoinDiagnostics};
//! use weft_core::column::slugs;
//!
//! // One table per variable, built from raw payloads
//! let gdp = weft_core::variable_table(&gdp_payload, &gdp_dimension, &config)?;
//! let population = weft_core::variable_table(&pop_payload, &pop_dimension, &config)?;
//!
//! // Merge on year+entity, falling back to entity-only
//! let mut diagnostics = JoinDiagnostics::new();
//! let merged = full_join_tables(
//!     &[gdp, population],
//!     &[slugs::YEAR, slugs::ENTITY_NAME],
//!     &[&[slugs::ENTITY_NAME]],
//!     &mut diagnostics,
//! );
//!
//! // Finalize and export
//! let merged = weft_core::inject_time_column(&merged, "time");
//! let csv = weft_core::to_csv(&merged, &Default::default())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod column;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod error;
pub mod export;
pub mod index;
pub mod join;
pub mod postprocess;
pub mod table;
#[cfg(test)]
mod table_tests;
pub mod target_time;
pub mod time;
pub mod value;
pub mod variable;
#[cfg(test)]
mod variable_tests;

pub use column::{ColumnDef, ColumnType};
pub use config::{EngineConfig, WeftConfig};
pub use error::{Error, Result};
pub use export::{sorted_by, to_csv, write_csv, ExportOptions};
pub use index::RowIndex;
pub use join::{full_join_tables, DuplicateKeyWarning, JoinDiagnostics};
pub use postprocess::{append_entity_colors, inject_time_column};
pub use table::{Column, Table};
pub use target_time::filter_to_target_time;
pub use value::{ErrorValueKind, Value};
pub use variable::{variable_table, DimensionConfig, VariablePayload};
