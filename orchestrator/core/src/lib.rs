// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Explore Orchestrator Core
//!
//! Gateway logic for composite elements split between the directory service
//! and the per-type content services.
//!
//! # Architecture
//!
//! - **domain:** elements, ports, type registry, saga bookkeeping, configuration
//! - **application:** authorization gate, element saga, metadata aggregator
//! - **infrastructure:** HTTP adapters, in-memory backends, event bus
//! - **presentation:** axum router

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
