// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # agent-registry-core
//!
//! Agent records with roles, profile info and postal address, exposed over
//! a small REST API.
//!
//! # Architecture
//!
//! - **domain** - `Agent` aggregate, identifier generator, repository
//!   contract, service configuration manifest
//! - **application** - `AgentService` use cases and repository wiring
//! - **infrastructure** - PostgreSQL pool, migrations, repositories
//! - **presentation** - axum router, request validation, error responses

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
