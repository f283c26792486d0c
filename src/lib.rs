//! pdfscope: terminal navigation for sectioned PDF documents and cited search answers.
//!
//! The library reconstructs the section hierarchy the analysis backend delivers as a flat,
//! parent-referencing list, tracks which section is current, and turns search citations into
//! ranked, deep-linkable entries. The binary drives this model from a ratatui interface.
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app_state;
pub mod citation;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod section;
pub mod selection;
pub mod tree;
pub mod ui;
pub mod worker;

pub use error::{Error, Result};
