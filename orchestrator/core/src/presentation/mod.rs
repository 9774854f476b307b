// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`explore-orchestrator-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. **No business logic lives here**: all real work is delegated to
//! application services in `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Element lifecycle and metadata listing endpoints |

pub mod api;
