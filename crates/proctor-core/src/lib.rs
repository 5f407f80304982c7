//! proctor-core: timed assessment engine, scoring, and exam model.
//!
//! This crate defines the exam data model, the attempt state machine and its
//! countdown, scoring with bounded negative marking, and the collaborator
//! traits the rest of the proctor system builds on.

pub mod bank;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timer;
pub mod traits;
