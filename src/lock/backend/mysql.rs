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

use crate::errors::{ProtocolFault, SqlLockError, SqlLockResult};
use crate::key::{normalize_str_key, KeyConverter, LockKey};
use crate::lock::{AcquirePlan, ActualKey, LockProtocol};
use crate::statements::{mysql, Param, Reply, Statement};

/// MySQL / MariaDB named lock (`GET_LOCK` / `RELEASE_LOCK`).
///
/// The server counts re-acquisitions of the same name by the same session;
/// each successful acquire on a lock object is paired with exactly one
/// `RELEASE_LOCK` by that object.
#[derive(Debug, Clone)]
pub struct MysqlProtocol {
    key: ActualKey,
    name: String,
}

impl MysqlProtocol {
    pub fn new(key: &LockKey, convert: Option<&KeyConverter>) -> SqlLockResult<Self> {
        let name = normalize_str_key(key, convert, "MySQL", mysql::LOCK_NAME_MAX_LENGTH)?;
        Ok(Self {
            key: ActualKey::Name(name.clone()),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn get_lock(&self, timeout: Param) -> Statement {
        Statement::new(mysql::GET_LOCK)
            .bind("str", Param::Text(self.name.clone()))
            .bind("timeout", timeout)
    }
}

impl LockProtocol for MysqlProtocol {
    fn backend_name(&self) -> &'static str {
        "MySQL"
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
        let timeout = match (block, timeout) {
            (false, _) => Param::Int(0),
            (true, None) => Param::Int(mysql::WAIT_FOREVER),
            (true, Some(t)) => Param::Float(t.as_secs_f64()),
        };
        Ok(AcquirePlan::Once(self.get_lock(timeout)))
    }

    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool> {
        match reply.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            // NULL: the server failed, e.g. out of memory or the thread was killed
            _ => Err(SqlLockError::protocol(
                "GET_LOCK",
                &self.key,
                reply,
                ProtocolFault::Unexpected,
            )),
        }
    }

    fn release_statement(&self) -> Option<Statement> {
        Some(Statement::new(mysql::RELEASE_LOCK).bind("str", Param::Text(self.name.clone())))
    }

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()> {
        let fault = match reply.as_i64() {
            Some(1) => return Ok(()),
            // 0: established by another session; NULL: no such lock
            Some(0) => ProtocolFault::NotHeld,
            None if reply.is_null() => ProtocolFault::NotHeld,
            _ => ProtocolFault::Unexpected,
        };
        Err(SqlLockError::protocol("RELEASE_LOCK", &self.key, reply, fault))
    }
}
