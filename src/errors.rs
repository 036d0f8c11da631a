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

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::lock::ActualKey;
use crate::statements::Reply;

pub type SqlLockResult<T> = std::result::Result<T, SqlLockError>;

#[derive(Error, Debug)]
pub enum SqlLockError {
    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    #[error("Key too long: {backend} enforces a maximum length of {max} characters, got {length}")]
    KeyTooLong {
        backend: &'static str,
        length: usize,
        max: usize,
    },

    #[error("Key out of range: {0} does not fit into a signed 64-bit integer")]
    KeyOutOfRange(i128),

    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Invoked on a locked lock")]
    AlreadyLocked,

    #[error("Invoked on an unlocked lock")]
    NotLocked,

    #[error("{fault}: {operation} on key {key} returned {reply}")]
    BackendProtocol {
        operation: &'static str,
        key: ActualKey,
        reply: Reply,
        fault: ProtocolFault,
    },

    #[error("Lock acquisition timeout")]
    Timeout,

    #[error("Invalid poll interval: {interval:?} is below the minimum of {minimum:?}")]
    InvalidInterval { interval: Duration, minimum: Duration },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SqlLockError {
    /// Wraps an error raised by the caller's database driver.
    pub fn database<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SqlLockError::Database(err.into())
    }

    pub(crate) fn protocol(
        operation: &'static str,
        key: &ActualKey,
        reply: &Reply,
        fault: ProtocolFault,
    ) -> Self {
        SqlLockError::BackendProtocol {
            operation,
            key: key.clone(),
            reply: reply.clone(),
            fault,
        }
    }

    /// The database reported that this session did not hold the lock it tried to release.
    pub fn is_not_held(&self) -> bool {
        matches!(
            self,
            SqlLockError::BackendProtocol {
                fault: ProtocolFault::NotHeld,
                ..
            }
        )
    }
}

/// Classification of a reply that is neither "granted" nor "denied".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFault {
    Deadlock,
    ParameterError,
    Cancelled,
    NotHeld,
    IllegalLockId,
    Unexpected,
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProtocolFault::Deadlock => "Deadlock detected",
            ProtocolFault::ParameterError => "Parameter validation failed",
            ProtocolFault::Cancelled => "Lock request was cancelled",
            ProtocolFault::NotHeld => "Lock was not held by this session",
            ProtocolFault::IllegalLockId => "Illegal lock id",
            ProtocolFault::Unexpected => "Unexpected reply",
        };
        f.write_str(text)
    }
}
