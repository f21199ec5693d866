// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The deployment pipeline and its compensating status patch.

pub mod failure;
pub mod pipeline;
pub mod step;

pub use pipeline::{Collaborators, DeployOutcome, Pipeline};
pub use step::Step;
