//! Core types and definitions for the MEST QSR rules engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! positions, enums, components, commands, events, snapshots, the mission
//! wire format, errors and rules constants. It has no rules logic.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod mission;
pub mod state;
pub mod types;
