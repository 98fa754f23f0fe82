// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types: health check descriptions and ingress views.

pub mod health_check;
pub mod ingress;

pub use health_check::{CreateRequest, HealthCheckKind, HealthCheckRecord, HealthCheckSpec, ResourceKey};
pub use ingress::{plan, IngressExt, Plan};
