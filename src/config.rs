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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::SqlLockError;
use crate::statements::{oracle, postgresql};
use crate::KeyConverter;

/// PostgreSQL advisory lock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostgresqlLevel {
    /// Exclusive, held until released or the session ends.
    #[default]
    Session,
    /// Like `Session`, but compatible with other shared holders.
    Shared,
    /// Exclusive, released only when the enclosing transaction ends.
    Transaction,
    /// Shared, released only when the enclosing transaction ends.
    TransactionShared,
}

impl PostgresqlLevel {
    pub fn is_transaction(&self) -> bool {
        matches!(self, PostgresqlLevel::Transaction | PostgresqlLevel::TransactionShared)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, PostgresqlLevel::Shared | PostgresqlLevel::TransactionShared)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostgresqlLevel::Session => "session",
            PostgresqlLevel::Shared => "shared",
            PostgresqlLevel::Transaction => "transaction",
            PostgresqlLevel::TransactionShared => "transaction_shared",
        }
    }
}

impl fmt::Display for PostgresqlLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostgresqlLevel {
    type Err = SqlLockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "session" => Ok(PostgresqlLevel::Session),
            "shared" => Ok(PostgresqlLevel::Shared),
            "transaction" | "xact" => Ok(PostgresqlLevel::Transaction),
            "transaction_shared" | "xact_shared" => Ok(PostgresqlLevel::TransactionShared),
            _ => Err(SqlLockError::ConfigError(format!(
                "PostgreSQL lock level must be one of session, shared, transaction, transaction_shared; got {:?}",
                s
            ))),
        }
    }
}

/// SQL Server application lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MssqlLockMode {
    Shared,
    Update,
    #[default]
    Exclusive,
}

impl MssqlLockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MssqlLockMode::Shared => "Shared",
            MssqlLockMode::Update => "Update",
            MssqlLockMode::Exclusive => "Exclusive",
        }
    }
}

impl fmt::Display for MssqlLockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MssqlLockMode {
    type Err = SqlLockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(MssqlLockMode::Shared),
            "update" => Ok(MssqlLockMode::Update),
            "exclusive" => Ok(MssqlLockMode::Exclusive),
            _ => Err(SqlLockError::ConfigError(format!(
                "SQL Server lock mode must be one of Shared, Update, Exclusive; got {:?}",
                s
            ))),
        }
    }
}

/// Oracle `DBMS_LOCK` mode.
///
/// Compatibility (held vs requested, `+` granted):
///
/// ```text
/// held\get | NL | SS | SX | S  | SSX | X
/// ---------|----|----|----|----|-----|---
/// NL       | +  | +  | +  | +  | +   | +
/// SS       | +  | +  | +  | +  | +   | -
/// SX       | +  | +  | +  | -  | -   | -
/// S        | +  | +  | -  | +  | -   | -
/// SSX      | +  | +  | -  | -  | -   | -
/// X        | +  | -  | -  | -  | -   | -
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OracleLockMode {
    /// Null
    NL,
    /// Sub-shared
    SS,
    /// Sub-exclusive (row exclusive)
    SX,
    /// Shared
    S,
    /// Shared sub-exclusive (share row exclusive)
    SSX,
    /// Exclusive
    #[default]
    X,
}

impl OracleLockMode {
    pub fn as_i64(&self) -> i64 {
        match self {
            OracleLockMode::NL => oracle::NL_MODE,
            OracleLockMode::SS => oracle::SS_MODE,
            OracleLockMode::SX => oracle::SX_MODE,
            OracleLockMode::S => oracle::S_MODE,
            OracleLockMode::SSX => oracle::SSX_MODE,
            OracleLockMode::X => oracle::X_MODE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OracleLockMode::NL => "NL",
            OracleLockMode::SS => "SS",
            OracleLockMode::SX => "SX",
            OracleLockMode::S => "S",
            OracleLockMode::SSX => "SSX",
            OracleLockMode::X => "X",
        }
    }

    /// Whether a lock held in `self` lets another session obtain `requested`.
    pub fn is_compatible_with(&self, requested: OracleLockMode) -> bool {
        use OracleLockMode::*;
        match (self, requested) {
            (NL, _) | (_, NL) => true,
            (SS, X) => false,
            (SS, _) => true,
            (SX, SS) | (SX, SX) => true,
            (S, SS) | (S, S) => true,
            (SSX, SS) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OracleLockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OracleLockMode {
    type Err = SqlLockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NL" => Ok(OracleLockMode::NL),
            "SS" => Ok(OracleLockMode::SS),
            "SX" => Ok(OracleLockMode::SX),
            "S" => Ok(OracleLockMode::S),
            "SSX" => Ok(OracleLockMode::SSX),
            "X" => Ok(OracleLockMode::X),
            _ => Err(SqlLockError::ConfigError(format!(
                "Oracle lock mode must be one of NL, S, SS, SSX, SX, X; got {:?}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresqlConfig {
    pub level: PostgresqlLevel,
    /// Sleep between polls when a timeout has to be emulated
    pub interval: Duration,
    /// Smallest accepted poll interval
    pub min_interval: Duration,
}

impl Default for PostgresqlConfig {
    fn default() -> Self {
        Self {
            level: PostgresqlLevel::Session,
            interval: postgresql::SLEEP_INTERVAL_DEFAULT,
            min_interval: postgresql::SLEEP_INTERVAL_MIN,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MssqlConfig {
    pub mode: MssqlLockMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    pub mode: OracleLockMode,
    /// Release the lock when the transaction ends instead of when the session ends
    pub release_on_commit: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockConfig {
    /// Timeout applied when the lock is entered as a scope; `None` waits forever
    pub contextual_timeout: Option<Duration>,
    pub postgresql: PostgresqlConfig,
    pub mssql: MssqlConfig,
    pub oracle: OracleConfig,
    /// Replaces the default key conversion of the selected backend
    #[serde(skip)]
    pub convert: Option<KeyConverter>,
}

impl LockConfig {
    pub fn with_contextual_timeout(mut self, timeout: Duration) -> Self {
        self.contextual_timeout = Some(timeout);
        self
    }

    pub fn with_postgresql_level(mut self, level: PostgresqlLevel) -> Self {
        self.postgresql.level = level;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.postgresql.interval = interval;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.postgresql.min_interval = min_interval;
        self
    }

    pub fn with_mssql_mode(mut self, mode: MssqlLockMode) -> Self {
        self.mssql.mode = mode;
        self
    }

    pub fn with_oracle_mode(mut self, mode: OracleLockMode) -> Self {
        self.oracle.mode = mode;
        self
    }

    pub fn with_release_on_commit(mut self, release_on_commit: bool) -> Self {
        self.oracle.release_on_commit = release_on_commit;
        self
    }

    pub fn with_convert(mut self, convert: KeyConverter) -> Self {
        self.convert = Some(convert);
        self
    }
}
