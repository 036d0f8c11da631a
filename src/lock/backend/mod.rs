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

mod mssql;
mod mysql;
mod oracle;
mod postgresql;

pub use mssql::*;
pub use mysql::*;
pub use oracle::*;
pub use postgresql::*;

use std::fmt;
use std::time::Duration;

use crate::config::LockConfig;
use crate::errors::SqlLockResult;
use crate::key::LockKey;
use crate::lock::{AcquirePlan, ActualKey, LockProtocol};
use crate::statements::{Reply, Statement};

/// The closed set of supported lock implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Mysql,
    Postgresql,
    Mssql,
    Oracle,
}

impl BackendKind {
    /// Normalizes `key` and builds the protocol for this backend.
    pub fn build(&self, key: &LockKey, config: &LockConfig) -> SqlLockResult<Backend> {
        let convert = config.convert.as_ref();
        Ok(match self {
            BackendKind::Mysql => Backend::Mysql(MysqlProtocol::new(key, convert)?),
            BackendKind::Postgresql => {
                Backend::Postgresql(PostgresqlProtocol::new(key, convert, &config.postgresql)?)
            }
            BackendKind::Mssql => Backend::Mssql(MssqlProtocol::new(key, convert, &config.mssql)?),
            BackendKind::Oracle => {
                Backend::Oracle(OracleProtocol::new(key, convert, &config.oracle)?)
            }
        })
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Mysql => f.write_str("mysql"),
            BackendKind::Postgresql => f.write_str("postgresql"),
            BackendKind::Mssql => f.write_str("mssql"),
            BackendKind::Oracle => f.write_str("oracle"),
        }
    }
}

/// A lock protocol for whichever backend the connection speaks.
#[derive(Debug, Clone)]
pub enum Backend {
    Mysql(MysqlProtocol),
    Postgresql(PostgresqlProtocol),
    Mssql(MssqlProtocol),
    Oracle(OracleProtocol),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Mysql(_) => BackendKind::Mysql,
            Backend::Postgresql(_) => BackendKind::Postgresql,
            Backend::Mssql(_) => BackendKind::Mssql,
            Backend::Oracle(_) => BackendKind::Oracle,
        }
    }

    fn protocol(&self) -> &dyn LockProtocol {
        match self {
            Backend::Mysql(p) => p,
            Backend::Postgresql(p) => p,
            Backend::Mssql(p) => p,
            Backend::Oracle(p) => p,
        }
    }
}

impl LockProtocol for Backend {
    fn backend_name(&self) -> &'static str {
        self.protocol().backend_name()
    }

    fn actual_key(&self) -> &ActualKey {
        self.protocol().actual_key()
    }

    fn acquire_plan(
        &self,
        block: bool,
        timeout: Option<Duration>,
        interval: Option<Duration>,
    ) -> SqlLockResult<AcquirePlan> {
        self.protocol().acquire_plan(block, timeout, interval)
    }

    fn interpret_acquire(&self, reply: &Reply) -> SqlLockResult<bool> {
        self.protocol().interpret_acquire(reply)
    }

    fn release_statement(&self) -> Option<Statement> {
        self.protocol().release_statement()
    }

    fn interpret_release(&self, reply: &Reply) -> SqlLockResult<()> {
        self.protocol().interpret_release(reply)
    }
}
