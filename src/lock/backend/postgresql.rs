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

use std::time::Duration;

use crate::config::{PostgresqlConfig, PostgresqlLevel};
use crate::errors::{ProtocolFault, SqlLockError, SqlLockResult};
use crate::key::{normalize_int64_key, KeyConverter, LockKey};
use crate::lock::{AcquirePlan, ActualKey, LockProtocol};
use crate::statements::{postgresql, Param, Reply, Statement};

/// PostgreSQL advisory lock.
///
/// PostgreSQL has no way to wait for an advisory lock with a timeout, so a
/// bounded wait is emulated by polling the `pg_try_*` function every
/// `interval`. A large interval makes the timeout imprecise; a small one
/// costs round trips and CPU.
///
/// Session-level locks stack inside the server: a second lock object on the
/// same session and key succeeds and needs its own release.
#[derive(Debug, Clone)]
pub struct PostgresqlProtocol {
    key: ActualKey,
    id: i64,
    level: PostgresqlLevel,
    interval: Duration,
    min_interval: Duration,
}

impl PostgresqlProtocol {
    pub fn new(
        key: &LockKey,
        convert: Option<&KeyConverter>,
        config: &PostgresqlConfig,
    ) -> SqlLockResult<Self> {
        let id = normalize_int64_key(key, convert)?;
        check_interval(config.interval, config.min_interval)?;
        Ok(Self {
            key: ActualKey::Id(id),
            id,
            level: config.level,
            interval: config.interval,
            min_interval: config.min_interval,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn level(&self) -> PostgresqlLevel {
        self.level
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn statement(&self, sql: &'static str) -> Statement {
        Statement::new(sql).bind("key", Param::Int(self.id))
    }

    fn lock_sql(&self) -> &'static str {
        match self.level {
            PostgresqlLevel::Session => postgresql::LOCK,
            PostgresqlLevel::Shared => postgresql::LOCK_SHARED,
            PostgresqlLevel::Transaction => postgresql::LOCK_XACT,
            PostgresqlLevel::TransactionShared => postgresql::LOCK_XACT_SHARED,
        }
    }

    fn try_lock_sql(&self) -> &'static str {
        match self.level {
            PostgresqlLevel::Session => postgresql::TRY_LOCK,
            PostgresqlLevel::Shared => postgresql::TRY_LOCK_SHARED,
            PostgresqlLevel::Transaction => postgresql::TRY_LOCK_XACT,
            PostgresqlLevel::TransactionShared => postgresql::TRY_LOCK_XACT_SHARED,
        }
    }

    fn unlock_sql(&self) -> Option<&'static str> {
        match self.level {
            PostgresqlLevel::Session => Some(postgresql::UNLOCK),
            PostgresqlLevel::Shared => Some(postgresql::UNLOCK_SHARED),
            PostgresqlLevel::Transaction | PostgresqlLevel::TransactionShared => None,
        }
    }
}

fn check_interval(interval: Duration, minimum: Duration) -> SqlLockResult<()> {
    if interval < minimum {
        return Err(SqlLockError::InvalidInterval { interval, minimum });
    }
    Ok(())
}

impl LockProtocol for PostgresqlProtocol {
    fn backend_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn actual_key(&self) -> &ActualKey {
        &self.key
    }

    fn acquire_plan(
        &self,
        block: bool,
        timeout: Option<Duration>,
        interval: Option<Duration>,
    ) -> SqlLockResult<AcquirePlan> {
        match (block, timeout) {
            (false, _) => Ok(AcquirePlan::Once(self.statement(self.try_lock_sql()))),
            (true, None) => Ok(AcquirePlan::Wait(self.statement(self.lock_sql()))),
            (true, Some(timeout)) => {
                let interval = interval.unwrap_or(self.interval);
                check_interval(interval, self.min_interval)?;
                Ok(AcquirePlan::Poll {
                    statement: self.statement(self.try_lock_sql()),
                    timeout,
                    interval,
                })
            }
        }
    }

    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool> {
        reply.as_bool().ok_or_else(|| {
            SqlLockError::protocol("pg_try_advisory_lock", &self.key, reply, ProtocolFault::Unexpected)
        })
    }

    fn release_statement(&self) -> Option<Statement> {
        self.unlock_sql().map(|sql| self.statement(sql))
    }

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()> {
        match reply.as_bool() {
            Some(true) => Ok(()),
            Some(false) => Err(SqlLockError::protocol(
                "pg_advisory_unlock",
                &self.key,
                reply,
                ProtocolFault::NotHeld,
            )),
            None => Err(SqlLockError::protocol(
                "pg_advisory_unlock",
                &self.key,
                reply,
                ProtocolFault::Unexpected,
            )),
        }
    }
}
