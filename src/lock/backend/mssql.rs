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

use crate::config::{MssqlConfig, MssqlLockMode};
use crate::errors::{ProtocolFault, SqlLockError, SqlLockResult};
use crate::key::{normalize_str_key, KeyConverter, LockKey};
use crate::lock::{AcquirePlan, ActualKey, LockProtocol};
use crate::statements::{mssql, Param, Reply, Statement};
use crate::util::num_milliseconds_capped;

/// SQL Server application lock (`sp_getapplock` / `sp_releaseapplock`), owned by the session.
#[derive(Debug, Clone)]
pub struct MssqlProtocol {
    key: ActualKey,
    resource: String,
    mode: MssqlLockMode,
}

impl MssqlProtocol {
    pub fn new(
        key: &LockKey,
        convert: Option<&KeyConverter>,
        config: &MssqlConfig,
    ) -> SqlLockResult<Self> {
        let resource = normalize_str_key(
            key,
            convert,
            "SQL Server",
            mssql::LOCK_RESOURCE_MAX_LENGTH,
        )?;
        Ok(Self {
            key: ActualKey::Name(resource.clone()),
            resource,
            mode: config.mode,
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn mode(&self) -> MssqlLockMode {
        self.mode
    }

    fn lock_sql(&self) -> &'static str {
        match self.mode {
            MssqlLockMode::Shared => mssql::LOCK_SHARED,
            MssqlLockMode::Update => mssql::LOCK_UPDATE,
            MssqlLockMode::Exclusive => mssql::LOCK_EXCLUSIVE,
        }
    }
}

impl LockProtocol for MssqlProtocol {
    fn backend_name(&self) -> &'static str {
        "SQL Server"
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
        let timeout_ms = match (block, timeout) {
            (false, _) => 0,
            (true, None) => mssql::WAIT_FOREVER,
            (true, Some(t)) => num_milliseconds_capped(&t, mssql::MAX_LOCK_TIMEOUT),
        };
        Ok(AcquirePlan::Once(
            Statement::new(self.lock_sql())
                .bind("resource", Param::Text(self.resource.clone()))
                .bind("timeout", Param::Int(timeout_ms)),
        ))
    }

    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool> {
        let fault = match reply.as_i64() {
            // 0: granted synchronously, 1: granted after waiting
            Some(code) if code >= 0 => return Ok(true),
            Some(-1) => return Ok(false),
            Some(-2) => ProtocolFault::Cancelled,
            Some(-3) => ProtocolFault::Deadlock,
            Some(-999) => ProtocolFault::ParameterError,
            _ => ProtocolFault::Unexpected,
        };
        Err(SqlLockError::protocol("sp_getapplock", &self.key, reply, fault))
    }

    fn release_statement(&self) -> Option<Statement> {
        Some(Statement::new(mssql::UNLOCK).bind("resource", Param::Text(self.resource.clone())))
    }

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()> {
        match reply.as_i64() {
            Some(code) if code >= 0 => Ok(()),
            // -999 covers "lock not held" as well as parameter errors
            Some(-999) => Err(SqlLockError::protocol(
                "sp_releaseapplock",
                &self.key,
                reply,
                ProtocolFault::NotHeld,
            )),
            _ => Err(SqlLockError::protocol(
                "sp_releaseapplock",
                &self.key,
                reply,
                ProtocolFault::Unexpected,
            )),
        }
    }
}
