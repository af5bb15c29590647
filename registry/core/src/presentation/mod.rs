// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`agent-registry-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. No business logic lives here; all real work is delegated to
//! `crate::application`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Axum router and handlers for `/api/v1` and `/health` |
//! | [`dto`] | Request payloads and their validation |
//! | [`error`] | Mapping of service errors to HTTP responses |

pub mod api;
pub mod dto;
pub mod error;
