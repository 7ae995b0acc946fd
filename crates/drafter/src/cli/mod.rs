//! Operator command line: index, search, prompt and draft

pub mod commands;
pub mod display;
