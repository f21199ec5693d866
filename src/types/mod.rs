// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types and identity values shared across the deployer.

pub mod application;
pub mod identity;

pub use application::{Application, ApplicationSpec, AssemblyPhase};
pub use identity::{AppIdentity, ApplicationRef};
