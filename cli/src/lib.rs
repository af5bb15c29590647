// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent registry CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Server bootstrap, management commands and the HTTP client
//!   they use

pub mod client;
pub mod commands;
pub mod server;
