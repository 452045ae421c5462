//! Backend for a chemical space visualization dashboard.
//!
//! A molecular dataset (SMILES strings plus an optional numeric target) is
//! projected into 2D by an external plotting engine; this crate owns the
//! glue around it: runtime prediction for live runs, resolution of parameter
//! combinations to precomputed demo plots, an append-only request log, and
//! the dashboard HTTP server.

pub mod assets;
pub mod cli;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod weblog;
