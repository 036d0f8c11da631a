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
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::connection::AsyncLockConnection;
use crate::errors::{SqlLockError, SqlLockResult};
use crate::key::LockKey;
use crate::lock::{AcquirePlan, ActualKey, AsyncLockGuard, AsyncLockable, Backend, LockProtocol, LockState};

/// === AsyncSqlLock (asynchronous database-server lock) ===
///
/// Same state machine as [`SqlLock`](crate::SqlLock), driven over an
/// [`AsyncLockConnection`]. Emulated timeouts sleep on the tokio timer instead
/// of blocking the thread.
pub struct AsyncSqlLock<C, P = Backend> {
    connection: C,
    key: LockKey,
    protocol: P,
    state: LockState,
    contextual_timeout: Option<Duration>,
}

impl<C, P> AsyncSqlLock<C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    pub fn new(connection: C, key: LockKey, protocol: P) -> Self {
        Self {
            connection,
            key,
            protocol,
            state: LockState::Unlocked,
            contextual_timeout: None,
        }
    }

    pub fn with_contextual_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.contextual_timeout = timeout;
        self
    }

    /// Acquire the lock; see [`SqlLock::acquire`](crate::SqlLock::acquire).
    pub async fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool> {
        self.acquire_with_interval(block, timeout, None).await
    }

    pub async fn acquire_with_interval(
        &mut self,
        block: bool,
        timeout: Option<Duration>,
        interval: Option<Duration>,
    ) -> SqlLockResult<bool> {
        if self.state == LockState::Locked {
            return Err(SqlLockError::AlreadyLocked);
        }

        let acquired = match self.protocol.acquire_plan(block, timeout, interval)? {
            AcquirePlan::Wait(statement) => {
                self.connection.query_scalar(&statement).await?;
                true
            }
            AcquirePlan::Once(statement) => {
                let reply = self.connection.query_scalar(&statement).await?;
                self.protocol.interpret_acquire(&reply)?
            }
            AcquirePlan::Poll {
                statement,
                timeout,
                interval,
            } => {
                let started = Instant::now();
                loop {
                    let reply = self.connection.query_scalar(&statement).await?;
                    if self.protocol.interpret_acquire(&reply)? {
                        break true;
                    }
                    if started.elapsed() >= timeout {
                        break false;
                    }
                    debug!(key = %self.protocol.actual_key(), ?interval, "lock is busy, polling again");
                    sleep(interval).await;
                }
            }
        };

        if acquired {
            self.state = LockState::Locked;
            debug!(backend = self.protocol.backend_name(), key = %self.protocol.actual_key(), "lock acquired");
        }
        Ok(acquired)
    }

    /// Release the lock; see [`SqlLock::release`](crate::SqlLock::release).
    pub async fn release(&mut self) -> SqlLockResult<()> {
        if self.state == LockState::Unlocked {
            return Err(SqlLockError::NotLocked);
        }

        let Some(statement) = self.protocol.release_statement() else {
            warn!(
                key = %self.protocol.actual_key(),
                "transaction-level lock cannot be released explicitly, it is held until the transaction ends"
            );
            self.state = LockState::Unlocked;
            return Ok(());
        };

        let reply = self.connection.query_scalar(&statement).await?;
        match self.protocol.interpret_release(&reply) {
            Ok(()) => {
                self.state = LockState::Unlocked;
                debug!(backend = self.protocol.backend_name(), key = %self.protocol.actual_key(), "lock released");
                Ok(())
            }
            Err(e) => {
                if e.is_not_held() {
                    self.state = LockState::Unlocked;
                }
                Err(e)
            }
        }
    }

    pub async fn close(&mut self) -> SqlLockResult<()> {
        if self.state == LockState::Locked {
            self.release().await?;
        }
        Ok(())
    }

    /// Scoped acquisition with the contextual timeout.
    ///
    /// The returned guard must be left with [`AsyncLockGuard::exit`]; dropping
    /// it cannot run the release statement.
    pub async fn enter(&mut self) -> SqlLockResult<AsyncLockGuard<'_, C, P>> {
        let timeout = self.contextual_timeout;
        if !self.acquire(true, timeout).await? {
            return Err(SqlLockError::Timeout);
        }
        Ok(AsyncLockGuard::new(self))
    }
}

impl<C, P> AsyncSqlLock<C, P>
where
    P: LockProtocol,
{
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn actual_key(&self) -> &ActualKey {
        self.protocol.actual_key()
    }

    pub fn locked(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn contextual_timeout(&self) -> Option<Duration> {
        self.contextual_timeout
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }
}

#[async_trait]
impl<C, P> AsyncLockable for AsyncSqlLock<C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    async fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool> {
        AsyncSqlLock::acquire(self, block, timeout).await
    }

    async fn release(&mut self) -> SqlLockResult<()> {
        AsyncSqlLock::release(self).await
    }

    fn locked(&self) -> bool {
        AsyncSqlLock::locked(self)
    }
}

impl<C, P: LockProtocol> fmt::Display for AsyncSqlLock<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} AsyncSqlLock {} key={}>",
            self.state,
            self.protocol.backend_name(),
            self.key
        )
    }
}
