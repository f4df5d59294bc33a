//! # safe-regroup
//!
//! Regroup very wide feature tables without exhausting memory: the table is
//! split into chunks of samples, each chunk is regrouped by an external tool
//! such as `humann_regroup_table`, and the regrouped chunks are joined back
//! together in their original sample order.
//!
//! ## Usage
//!
//! ```bash
//! safe-regroup regroup genefamilies.biom uniref90_ko ko.biom --chunk-size 100
//! safe-regroup convert counts.mtx rows.txt cols.txt genefamilies.biom
//! ```
//!
//! ## Modules
//!
//! - `config` - Layered configuration (defaults, TOML files, environment)
//! - `error` - Pipeline error type and error code registry
//! - `pipeline` - Partition, per-chunk regroup and join, driven by a state machine
//! - `regroup` - Grouping specs and the transformer backends
//! - `storage` - Where chunk files live during a run
//! - `subprocess` - Process runner abstraction with a scriptable mock
//! - `table` - Sparse tables and their BIOM and Matrix Market encodings
pub mod config;
pub mod error;
pub mod pipeline;
pub mod regroup;
pub mod storage;
pub mod subprocess;
pub mod table;

#[cfg(test)]
mod property_tests;
