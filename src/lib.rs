//! Descriptive statistics over a catalogue of volcanic eruptions.
//!
//! Load a dataset once with [`data::loader::load`], hand the records to
//! [`data::VolcanoQuery`], then ask it questions.

pub mod data;
pub mod report;
