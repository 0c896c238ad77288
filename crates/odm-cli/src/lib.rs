//! Command-line front-end components for the ODM document builder.

pub mod cli;
pub mod commands;
pub mod logging;
