//! Core library for the sf2-tools command line application.
//!
//! The library turns a class roster and its daily attendance marks into the
//! monthly SF2 attendance report. The modules keep responsibilities narrow
//! and composable: school-day resolution lives in [`sf2::tools::calendar`],
//! placement onto the report grid in [`sf2::tools::layout`], roster
//! splitting and output naming in [`sf2::tools::partition`], input and
//! workbook adapters under [`sf2::tools::io`], and the end-to-end pipeline
//! in [`sf2::tools::compose`].

pub mod sf2;

pub use sf2::tools::{
    Result, ToolError, calendar, compose, error, io, layout, lint, logging, model, partition,
};
