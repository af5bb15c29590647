// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agent Aggregate
//!
//! An `Agent` is the aggregate root: it owns its `Role` set, at most one
//! `AgentInfo` and at most one `AgentAddress`. Child records never outlive
//! their owner and are always persisted together with it.
//!
//! Caller-supplied data arrives as an `AgentDraft` (already validated by the
//! presentation layer). `Agent::register` turns a draft into a brand-new
//! aggregate and `Agent::apply_update` merges a draft into an existing one.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::repository::RoleSync;
use crate::domain::timestamp;

/// Role granted to every newly registered agent.
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// Status given to an `AgentInfo` created without caller input.
pub const DEFAULT_INFO_STATUS: &str = "active";

/// Zip code given to an `AgentAddress` created without caller input.
pub const DEFAULT_ZIP_CODE: i32 = 0;

/// Seven character public identifier, see `domain::identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub user_id: AgentId,
    pub username: String,
    pub full_name: String,
    pub gender: String,
    pub email: String,
    /// Secondary (certified) email address
    #[serde(default)]
    pub email_pec: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, with = "timestamp::optional")]
    pub last_login: Option<NaiveDateTime>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    pub active: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(rename = "userInfo", default)]
    pub info: Option<AgentInfo>,
    #[serde(rename = "userAddress", default)]
    pub address: Option<AgentAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Assigned by the store; `None` until persisted
    pub id: Option<i64>,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub id: Option<i64>,
    pub status: String,
    #[serde(default, with = "timestamp::optional")]
    pub delete_date: Option<NaiveDateTime>,
    pub admin_user: bool,
    pub email_pec_verified: bool,
    pub temporal_password: bool,
}

impl AgentInfo {
    pub fn with_defaults() -> Self {
        Self {
            id: None,
            status: DEFAULT_INFO_STATUS.to_string(),
            delete_date: None,
            admin_user: false,
            email_pec_verified: false,
            temporal_password: false,
        }
    }

    fn from_draft(draft: InfoDraft) -> Self {
        let mut info = Self::with_defaults();
        info.overwrite(draft);
        info
    }

    fn overwrite(&mut self, draft: InfoDraft) {
        self.status = draft.status;
        self.delete_date = draft.delete_date;
        self.admin_user = draft.admin_user;
        self.email_pec_verified = draft.email_pec_verified;
        self.temporal_password = draft.temporal_password;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAddress {
    pub id: Option<i64>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub address_line: Option<String>,
    pub zip_code: i32,
}

impl AgentAddress {
    pub fn with_defaults() -> Self {
        Self {
            id: None,
            country: None,
            state: None,
            address_line: None,
            zip_code: DEFAULT_ZIP_CODE,
        }
    }

    fn from_draft(draft: AddressDraft) -> Self {
        let mut address = Self::with_defaults();
        address.overwrite(draft);
        address
    }

    fn overwrite(&mut self, draft: AddressDraft) {
        self.country = draft.country;
        self.state = draft.state;
        self.address_line = draft.address_line;
        self.zip_code = draft.zip_code;
    }
}

/// Validated caller input for create and update.
///
/// `roles` distinguishes "not supplied" (`None`) from "supplied but empty"
/// (`Some(vec![])`); the two mean different things on update.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDraft {
    pub username: String,
    pub full_name: String,
    pub gender: String,
    pub email: String,
    pub email_pec: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub active: bool,
    pub roles: Option<Vec<String>>,
    pub info: Option<InfoDraft>,
    pub address: Option<AddressDraft>,
}

impl AgentDraft {
    /// Minimal draft with only the required fields set.
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        gender: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            gender: gender.into(),
            email: email.into(),
            email_pec: None,
            date_of_birth: None,
            active: true,
            roles: None,
            info: None,
            address: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoDraft {
    pub status: String,
    pub delete_date: Option<NaiveDateTime>,
    pub admin_user: bool,
    pub email_pec_verified: bool,
    pub temporal_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    pub country: Option<String>,
    pub state: Option<String>,
    pub address_line: Option<String>,
    pub zip_code: i32,
}

impl Agent {
    /// Build a brand-new aggregate.
    ///
    /// `active` is forced on and any roles in the draft are discarded in
    /// favour of the single default role. Missing info/address records are
    /// created with their defaults.
    pub fn register(user_id: AgentId, draft: AgentDraft, now: NaiveDateTime) -> Self {
        let info = draft
            .info
            .map(AgentInfo::from_draft)
            .unwrap_or_else(AgentInfo::with_defaults);
        let address = draft
            .address
            .map(AgentAddress::from_draft)
            .unwrap_or_else(AgentAddress::with_defaults);

        Self {
            user_id,
            username: draft.username,
            full_name: draft.full_name,
            gender: draft.gender,
            email: draft.email,
            email_pec: draft.email_pec,
            date_of_birth: draft.date_of_birth,
            last_login: None,
            created_at: now,
            active: true,
            roles: vec![Role::new(DEFAULT_ROLE)],
            info: Some(info),
            address: Some(address),
        }
    }

    /// Merge a draft into this aggregate.
    ///
    /// Identifier and creation time are never touched. Returns how the
    /// stored role set must be synchronised.
    pub fn apply_update(&mut self, draft: AgentDraft, now: NaiveDateTime) -> RoleSync {
        self.username = draft.username;
        self.full_name = draft.full_name;
        self.gender = draft.gender;
        self.email = draft.email;
        self.email_pec = draft.email_pec;
        self.date_of_birth = draft.date_of_birth;
        self.active = draft.active;
        self.last_login = Some(now);

        if let Some(info_draft) = draft.info {
            self.info
                .get_or_insert_with(AgentInfo::with_defaults)
                .overwrite(info_draft);
        }

        if let Some(address_draft) = draft.address {
            self.address
                .get_or_insert_with(AgentAddress::with_defaults)
                .overwrite(address_draft);
        }

        match draft.roles {
            Some(names) => {
                self.roles = names.into_iter().map(Role::new).collect();
                RoleSync::Replace
            }
            None => RoleSync::Retain,
        }
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }
}
