// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod lifecycle;
pub mod repository_factory;

pub use agent::{AgentService, AgentServiceError};
pub use lifecycle::StandardAgentService;
