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

use crate::config::{OracleConfig, OracleLockMode};
use crate::errors::{ProtocolFault, SqlLockError, SqlLockResult};
use crate::key::{normalize_wrapped_key, KeyConverter, LockKey};
use crate::lock::{AcquirePlan, ActualKey, LockProtocol};
use crate::statements::{oracle, Param, Reply, Statement};
use crate::util::num_seconds_capped;

/// Oracle user lock (`DBMS_LOCK.REQUEST` / `DBMS_LOCK.RELEASE`).
///
/// Lock ids live in `[0, 1073741823]`; integer keys outside that range wrap,
/// text and bytes are hashed and then wrapped. Timeouts are whole seconds.
///
/// `DBMS_LOCK` does not count re-acquisitions: a request for a lock the
/// session already owns answers "already own" and is reported as granted,
/// and a single release frees it.
#[derive(Debug, Clone)]
pub struct OracleProtocol {
    key: ActualKey,
    id: i64,
    mode: OracleLockMode,
    release_on_commit: bool,
}

impl OracleProtocol {
    pub fn new(
        key: &LockKey,
        convert: Option<&KeyConverter>,
        config: &OracleConfig,
    ) -> SqlLockResult<Self> {
        let id = normalize_wrapped_key(key, convert, oracle::LOCK_ID_MAX)?;
        Ok(Self {
            key: ActualKey::Id(id),
            id,
            mode: config.mode,
            release_on_commit: config.release_on_commit,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn mode(&self) -> OracleLockMode {
        self.mode
    }

    pub fn release_on_commit(&self) -> bool {
        self.release_on_commit
    }
}

impl LockProtocol for OracleProtocol {
    fn backend_name(&self) -> &'static str {
        "Oracle"
    }

    fn actual_key(&self) -> &ActualKey {
        &self.key
    }

    fn acquire_plan(
        &self,
        block: bool,
        timeout: Option<Duration>,
        _interval: Option<Duration>,
    ) -> SqlLockResult<AcquirePlan> {
        let timeout_sec = match (block, timeout) {
            (false, _) => 0,
            (true, None) => oracle::MAXWAIT,
            (true, Some(t)) => num_seconds_capped(&t, oracle::MAXWAIT),
        };
        Ok(AcquirePlan::Once(
            Statement::new(oracle::REQUEST)
                .bind("lock_id", Param::Int(self.id))
                .bind("lockmode", Param::Int(self.mode.as_i64()))
                .bind("timeout", Param::Int(timeout_sec))
                .bind("release_on_commit", Param::Int(self.release_on_commit as i64)),
        ))
    }

    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool> {
        let fault = match reply.as_i64() {
            Some(0) => return Ok(true),
            Some(1) => return Ok(false),
            Some(2) => ProtocolFault::Deadlock,
            Some(3) => ProtocolFault::ParameterError,
            // already own the lock
            Some(4) => return Ok(true),
            Some(5) => ProtocolFault::IllegalLockId,
            _ => ProtocolFault::Unexpected,
        };
        Err(SqlLockError::protocol("DBMS_LOCK.REQUEST", &self.key, reply, fault))
    }

    fn release_statement(&self) -> Option<Statement> {
        Some(Statement::new(oracle::RELEASE).bind("lock_id", Param::Int(self.id)))
    }

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()> {
        let fault = match reply.as_i64() {
            Some(0) => return Ok(()),
            Some(3) => ProtocolFault::ParameterError,
            Some(4) => ProtocolFault::NotHeld,
            Some(5) => ProtocolFault::IllegalLockId,
            _ => ProtocolFault::Unexpected,
        };
        Err(SqlLockError::protocol("DBMS_LOCK.RELEASE", &self.key, reply, fault))
    }
}
