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
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::connection::LockConnection;
use crate::errors::{SqlLockError, SqlLockResult};
use crate::key::LockKey;
use crate::lock::{AcquirePlan, ActualKey, Backend, LockGuard, LockProtocol, LockState, Lockable};

/// === SqlLock (database-server lock bound to one session) ===
///
/// A plain value owning (or borrowing, through `&mut C`) the session it runs
/// on. Mutual exclusion is decided by the server; this object only tracks
/// whether it believes it holds the lock and refuses to acquire twice or
/// release without holding.
pub struct SqlLock<C, P = Backend> {
    connection: C,
    key: LockKey,
    protocol: P,
    state: LockState,
    contextual_timeout: Option<Duration>,
}

impl<C, P> SqlLock<C, P>
where
    C: LockConnection,
    P: LockProtocol,
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

    /// Acquire the lock, blocking or non-blocking.
    ///
    /// * `block = false`: one non-blocking attempt.
    /// * `block = true, timeout = None`: wait until granted; never returns `false`.
    /// * `block = true, timeout = Some(t)`: wait at most `t`; `Duration::ZERO`
    ///   behaves like a non-blocking attempt.
    ///
    /// Returns whether the lock was acquired. Fails with
    /// [`SqlLockError::AlreadyLocked`] before issuing any SQL if this object
    /// already holds the lock.
    pub fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool> {
        self.acquire_with_interval(block, timeout, None)
    }

    /// Like [`acquire`](Self::acquire), overriding the poll interval used
    /// where the backend has to emulate the timeout.
    pub fn acquire_with_interval(
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
                self.connection.query_scalar(&statement)?;
                true
            }
            AcquirePlan::Once(statement) => {
                let reply = self.connection.query_scalar(&statement)?;
                self.protocol.interpret_acquire(&reply)?
            }
            AcquirePlan::Poll {
                statement,
                timeout,
                interval,
            } => {
                let started = Instant::now();
                loop {
                    let reply = self.connection.query_scalar(&statement)?;
                    if self.protocol.interpret_acquire(&reply)? {
                        break true;
                    }
                    if started.elapsed() >= timeout {
                        break false;
                    }
                    debug!(key = %self.protocol.actual_key(), ?interval, "lock is busy, polling again");
                    thread::sleep(interval);
                }
            }
        };

        if acquired {
            self.state = LockState::Locked;
            debug!(backend = self.protocol.backend_name(), key = %self.protocol.actual_key(), "lock acquired");
        }
        Ok(acquired)
    }

    /// Release the lock.
    ///
    /// Fails with [`SqlLockError::NotLocked`] before issuing any SQL when this
    /// object does not hold the lock. If the server answers that the session
    /// did not hold it, the local state is reset and a
    /// [`SqlLockError::BackendProtocol`] error is returned.
    ///
    /// Transaction-level locks cannot be released explicitly: the call only
    /// logs a warning and resets the local state, the server keeps the lock
    /// until the transaction ends.
    pub fn release(&mut self) -> SqlLockResult<()> {
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

        let reply = self.connection.query_scalar(&statement)?;
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

    /// Same as [`release`](Self::release), except that calling it on an
    /// unlocked lock is not an error.
    pub fn close(&mut self) -> SqlLockResult<()> {
        if self.state == LockState::Locked {
            self.release()?;
        }
        Ok(())
    }

    /// Scoped acquisition: acquire with the contextual timeout (or wait
    /// forever when none is configured) and hand back a guard that closes the
    /// lock on exit.
    ///
    /// Fails with [`SqlLockError::Timeout`] when the contextual timeout elapses.
    pub fn enter(&mut self) -> SqlLockResult<LockGuard<'_, C, P>> {
        let timeout = self.contextual_timeout;
        if !self.acquire(true, timeout)? {
            return Err(SqlLockError::Timeout);
        }
        Ok(LockGuard::new(self))
    }

    /// Runs `f` while holding the lock, closing it afterwards.
    pub fn with_lock<R, F>(&mut self, f: F) -> SqlLockResult<R>
    where
        F: FnOnce(&mut C) -> R,
    {
        let mut guard = self.enter()?;
        let result = f(guard.connection_mut());
        guard.exit()?;
        Ok(result)
    }
}

impl<C, P> SqlLock<C, P>
where
    P: LockProtocol,
{
    /// The key as given by the caller.
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    /// The key as sent to the database.
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

    /// Gives the session back. A held lock stays held by the session.
    pub fn into_connection(self) -> C {
        self.connection
    }
}

impl<C, P> Lockable for SqlLock<C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool> {
        SqlLock::acquire(self, block, timeout)
    }

    fn release(&mut self) -> SqlLockResult<()> {
        SqlLock::release(self)
    }

    fn locked(&self) -> bool {
        SqlLock::locked(self)
    }
}

impl<C, P: LockProtocol> fmt::Display for SqlLock<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} SqlLock {} key={}>",
            self.state,
            self.protocol.backend_name(),
            self.key
        )
    }
}

impl<C, P: LockProtocol + fmt::Debug> fmt::Debug for SqlLock<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlLock")
            .field("key", &self.key)
            .field("protocol", &self.protocol)
            .field("state", &self.state)
            .field("contextual_timeout", &self.contextual_timeout)
            .finish()
    }
}
