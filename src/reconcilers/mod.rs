// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcilers that react to Kubernetes resource changes.

pub mod ingress;

pub use ingress::IngressReconciler;
