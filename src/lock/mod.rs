/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *  
 */

mod backend;
mod blocking;
mod non_blocking;

pub use backend::*;
pub use blocking::*;
pub use non_blocking::*;

use std::fmt;
use std::time::Duration;

use crate::errors::SqlLockResult;
use crate::statements::{Reply, Statement};

/// Local view of whether this lock object holds the database lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Unlocked => f.write_str("unlocked"),
            LockState::Locked => f.write_str("locked"),
        }
    }
}

/// The backend-normalized key actually sent to the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActualKey {
    /// Lock name or resource, for name-based backends
    Name(String),
    /// Numeric lock id
    Id(i64),
}

impl fmt::Display for ActualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualKey::Name(name) => write!(f, "'{}'", name),
            ActualKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// How a single `acquire` call talks to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquirePlan {
    /// Blocks inside the server until granted; the reply carries no outcome.
    Wait(Statement),
    /// One statement whose reply decides the outcome.
    Once(Statement),
    /// Emulated timeout: repeat the try statement until it is granted or
    /// `timeout` has elapsed, sleeping `interval` between attempts.
    Poll {
        statement: Statement,
        timeout: Duration,
        interval: Duration,
    },
}

/// Per-backend statement catalog and reply-code table.
///
/// Implementations are pure: they build statements and interpret replies,
/// the lock state machine executes them.
pub trait LockProtocol {
    /// Human readable backend name.
    fn backend_name(&self) -> &'static str;

    fn actual_key(&self) -> &ActualKey;

    /// Chooses the statement(s) for an acquisition attempt.
    ///
    /// `interval` overrides the configured poll interval where a timeout has
    /// to be emulated; other backends ignore it.
    fn acquire_plan(
        &self,
        block: bool,
        timeout: Option<Duration>,
        interval: Option<Duration>,
    ) -> SqlLockResult<AcquirePlan>;

    /// `Ok(true)` granted, `Ok(false)` timed out or held elsewhere.
    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool>;

    /// `None` when the lock cannot be released explicitly.
    fn release_statement(&self) -> Option<Statement>;

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()>;
}
