// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and ingress ownership metadata.

pub mod client;
pub mod ingress;

pub use client::create_client;
