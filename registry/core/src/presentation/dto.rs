// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Request payloads for the agent endpoints.
//!
//! Every field is optional at the serde level so that a missing required
//! field becomes a readable validation message instead of a deserializer
//! error. `AgentRequest::validate` turns a payload into an `AgentDraft`.
//!
//! Server-owned fields (`userId`, `createdAt`, `lastLogin`, child ids) are
//! not part of the request and are ignored if present.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::domain::agent::{AddressDraft, AgentDraft, InfoDraft, DEFAULT_INFO_STATUS, DEFAULT_ZIP_CODE};
use crate::domain::timestamp;

// Column widths of the agents schema.
pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_CODE_LEN: usize = 64;
pub const MAX_ADDRESS_LINE_LEN: usize = 512;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("valid email regex")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub email_pec: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub active: Option<bool>,
    /// `None` for a missing field or `null`, `Some(vec![])` for `[]`
    pub roles: Option<Vec<RoleRequest>>,
    #[serde(rename = "userInfo")]
    pub info: Option<InfoRequest>,
    #[serde(rename = "userAddress")]
    pub address: Option<AddressRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoRequest {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, with = "timestamp::optional")]
    pub delete_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub admin_user: bool,
    #[serde(default)]
    pub email_pec_verified: bool,
    #[serde(default)]
    pub temporal_password: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub country: Option<String>,
    pub state: Option<String>,
    pub address_line: Option<String>,
    /// Missing or `null` falls back to `DEFAULT_ZIP_CODE`
    #[serde(default)]
    pub zip_code: Option<i32>,
}

fn default_status() -> String {
    DEFAULT_INFO_STATUS.to_string()
}

fn required(value: Option<String>, message: &'static str, errors: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            errors.push(message);
            String::new()
        }
    }
}

fn max_len(value: Option<&str>, max: usize, message: &'static str, errors: &mut Vec<&'static str>) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.push(message);
    }
}

impl AgentRequest {
    /// Check required fields, field lengths and email syntax. All failures
    /// are reported together, joined with `"; "`.
    pub fn validate(self) -> Result<AgentDraft, String> {
        let mut errors = Vec::new();

        let username = required(self.username, "Username is required", &mut errors);
        max_len(
            Some(username.as_str()),
            MAX_TEXT_LEN,
            "Username must be at most 255 characters",
            &mut errors,
        );
        let full_name = required(self.full_name, "Full name is required", &mut errors);
        max_len(
            Some(full_name.as_str()),
            MAX_TEXT_LEN,
            "Full name must be at most 255 characters",
            &mut errors,
        );
        let gender = required(self.gender, "Gender is required", &mut errors);
        max_len(
            Some(gender.as_str()),
            MAX_CODE_LEN,
            "Gender must be at most 64 characters",
            &mut errors,
        );
        let email = required(self.email, "Email is required", &mut errors);
        max_len(
            Some(email.as_str()),
            MAX_TEXT_LEN,
            "Email must be at most 255 characters",
            &mut errors,
        );
        if !email.is_empty() && !is_valid_email(&email) {
            errors.push("Email should be valid");
        }

        let email_pec = self.email_pec.filter(|v| !v.is_empty());
        if let Some(pec) = &email_pec {
            max_len(
                Some(pec.as_str()),
                MAX_TEXT_LEN,
                "Email PEC must be at most 255 characters",
                &mut errors,
            );
            if !is_valid_email(pec) {
                errors.push("Email PEC should be valid");
            }
        }

        let roles = self.roles.map(|roles| {
            roles
                .into_iter()
                .map(|role| {
                    let name = required(role.name, "Role name is required", &mut errors);
                    max_len(
                        Some(name.as_str()),
                        MAX_TEXT_LEN,
                        "Role name must be at most 255 characters",
                        &mut errors,
                    );
                    name
                })
                .collect::<Vec<_>>()
        });

        if let Some(info) = &self.info {
            max_len(
                Some(info.status.as_str()),
                MAX_CODE_LEN,
                "Status must be at most 64 characters",
                &mut errors,
            );
        }

        if let Some(address) = &self.address {
            max_len(
                address.country.as_deref(),
                MAX_TEXT_LEN,
                "Country must be at most 255 characters",
                &mut errors,
            );
            max_len(
                address.state.as_deref(),
                MAX_TEXT_LEN,
                "State must be at most 255 characters",
                &mut errors,
            );
            max_len(
                address.address_line.as_deref(),
                MAX_ADDRESS_LINE_LEN,
                "Address line must be at most 512 characters",
                &mut errors,
            );
        }

        if !errors.is_empty() {
            let mut seen = HashSet::new();
            errors.retain(|message| seen.insert(*message));
            return Err(errors.join("; "));
        }

        Ok(AgentDraft {
            username,
            full_name,
            gender,
            email,
            email_pec,
            date_of_birth: self.date_of_birth,
            active: self.active.unwrap_or(true),
            roles,
            info: self.info.map(|info| InfoDraft {
                status: info.status,
                delete_date: info.delete_date,
                admin_user: info.admin_user,
                email_pec_verified: info.email_pec_verified,
                temporal_password: info.temporal_password,
            }),
            address: self.address.map(|address| AddressDraft {
                country: address.country,
                state: address.state,
                address_line: address.address_line,
                zip_code: address.zip_code.unwrap_or(DEFAULT_ZIP_CODE),
            }),
        })
    }
}
