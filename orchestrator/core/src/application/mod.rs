// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod authorization;
pub mod element_saga;
pub mod metadata_aggregator;

// Re-export services for convenience
pub use authorization::{AuthorizationGate, DirectoryAuthorizationGate};
pub use element_saga::{BulkDeletionReport, ElementDeletionOutcome, ElementService, StandardElementService};
pub use metadata_aggregator::{MetadataAggregator, MetadataQuery};
