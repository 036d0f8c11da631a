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

use tracing::debug;

use crate::registry::{find_backend, CallingConvention};
use crate::{LockConfig, LockConnection, LockKey, SqlLock, SqlLockResult};

/// Creates a blocking lock for whatever database `connection` talks to.
///
/// The backend is resolved from the connection's dialect name, the key is
/// normalized for it, and the config's contextual timeout is attached.
/// Fails with [`UnsupportedBackend`](crate::SqlLockError::UnsupportedBackend)
/// for unknown dialects and with a key error when the key does not fit the
/// backend; no SQL is executed either way.
pub fn create_lock<C, K>(connection: C, key: K, config: &LockConfig) -> SqlLockResult<SqlLock<C>>
where
    C: LockConnection,
    K: Into<LockKey>,
{
    let key = key.into();
    let kind = find_backend(connection.dialect_name(), CallingConvention::Blocking)?;
    let backend = kind.build(&key, config)?;
    debug!(backend = %kind, key = %key, "created lock");
    Ok(SqlLock::new(connection, key, backend).with_contextual_timeout(config.contextual_timeout))
}

// Synchronous client
#[derive(Debug, Clone, Default)]
pub struct SqlLockClient {
    config: LockConfig,
}

impl SqlLockClient {
    pub fn new(config: LockConfig) -> Self {
        Self { config }
    }

    pub fn get_config(&self) -> &LockConfig {
        &self.config
    }

    pub fn get_lock<C, K>(&self, connection: C, key: K) -> SqlLockResult<SqlLock<C>>
    where
        C: LockConnection,
        K: Into<LockKey>,
    {
        create_lock(connection, key, &self.config)
    }

    /// Same as [`get_lock`](Self::get_lock) with a different contextual timeout.
    pub fn get_lock_with_timeout<C, K>(
        &self,
        connection: C,
        key: K,
        contextual_timeout: Option<Duration>,
    ) -> SqlLockResult<SqlLock<C>>
    where
        C: LockConnection,
        K: Into<LockKey>,
    {
        Ok(self.get_lock(connection, key)?.with_contextual_timeout(contextual_timeout))
    }
}
