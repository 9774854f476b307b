// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Elements, permissions, the type registry and the ports to the backing
//! services.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure model and trait definitions; no I/O

pub mod content;
pub mod directory;
pub mod element;
pub mod error;
pub mod events;
pub mod gateway_config;
pub mod permission;
pub mod saga;
pub mod type_registry;
pub mod user_admin;
