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
use crate::{AsyncLockConnection, AsyncSqlLock, LockConfig, LockKey, SqlLockResult};

/// Asynchronous version of [`create_lock`](crate::create_lock).
pub fn create_async_lock<C, K>(connection: C, key: K, config: &LockConfig) -> SqlLockResult<AsyncSqlLock<C>>
where
    C: AsyncLockConnection,
    K: Into<LockKey>,
{
    let key = key.into();
    let kind = find_backend(connection.dialect_name(), CallingConvention::Async)?;
    let backend = kind.build(&key, config)?;
    debug!(backend = %kind, key = %key, "created async lock");
    Ok(AsyncSqlLock::new(connection, key, backend).with_contextual_timeout(config.contextual_timeout))
}

// Asynchronous client
#[derive(Debug, Clone, Default)]
pub struct AsyncSqlLockClient {
    config: LockConfig,
}

impl AsyncSqlLockClient {
    pub fn new(config: LockConfig) -> Self {
        Self { config }
    }

    pub fn get_config(&self) -> &LockConfig {
        &self.config
    }

    pub fn get_lock<C, K>(&self, connection: C, key: K) -> SqlLockResult<AsyncSqlLock<C>>
    where
        C: AsyncLockConnection,
        K: Into<LockKey>,
    {
        create_async_lock(connection, key, &self.config)
    }

    pub fn get_lock_with_timeout<C, K>(
        &self,
        connection: C,
        key: K,
        contextual_timeout: Option<Duration>,
    ) -> SqlLockResult<AsyncSqlLock<C>>
    where
        C: AsyncLockConnection,
        K: Into<LockKey>,
    {
        Ok(self.get_lock(connection, key)?.with_contextual_timeout(contextual_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unique_key, AsyncMockConnection, MockServer};
    use crate::{AsyncLockable, BackendKind, SqlLockError};

    #[tokio::test]
    async fn test_async_client() {
        let client = AsyncSqlLockClient::new(LockConfig::default());
        let server = MockServer::new("MariaDB");
        let key = unique_key("async-client");

        let mut lock = client.get_lock(AsyncMockConnection::new(&server), key.as_str()).unwrap();
        assert_eq!(lock.protocol().kind(), BackendKind::Mysql);
        assert!(lock.try_lock().await.unwrap());
        assert!(lock.unlock().await.unwrap());

        let lock = client
            .get_lock_with_timeout(AsyncMockConnection::new(&server), key.as_str(), Some(Duration::from_secs(1)))
            .unwrap();
        assert_eq!(lock.contextual_timeout(), Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_async_unsupported_dialect() {
        let server = MockServer::new("db2");
        let result = create_async_lock(AsyncMockConnection::new(&server), "k", &LockConfig::default());
        assert!(matches!(result, Err(SqlLockError::UnsupportedBackend(_))));
    }
}
