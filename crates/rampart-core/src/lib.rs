//! Core types and definitions for the Rampart tower-defense simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! configuration, commands, state snapshots, events, constants and the
//! deferred-mutation list the simulation iterates over.
//! It has no dependency on threads, randomness or any runtime framework.

pub mod commands;
pub mod config;
pub mod constants;
pub mod deferred;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
