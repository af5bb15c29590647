// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model for the agent registry.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Agent aggregate, identifier generation, persistence contract

pub mod agent;
pub mod identifier;
pub mod repository;
pub mod service_config;
pub mod timestamp;
