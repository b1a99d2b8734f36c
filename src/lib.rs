//! flexitex: restructure LaTeX projects.
//!
//! A token stream of the main file is built into a section-aware document
//! tree, split into several files according to declarative rules and written
//! to an output folder together with relocated graphics and static assets.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
