// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod backends;
pub mod event_bus;
pub mod http;
pub mod in_memory;

pub use backends::{build_type_registry, Backends};
