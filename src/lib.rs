//! Command-line front end for the task board.

pub mod cli;
pub mod render;
