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

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::connection::AsyncLockConnection;
use crate::errors::SqlLockResult;
use crate::lock::{AsyncSqlLock, LockProtocol};

/// Scope of a lock entered with [`AsyncSqlLock::enter`].
///
/// Leave it with [`exit`](Self::exit). Drop cannot await the release, so a
/// guard dropped while still holding the lock only logs a warning and the
/// lock stays held by the session.
pub struct AsyncLockGuard<'a, C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    lock: &'a mut AsyncSqlLock<C, P>,
}

impl<'a, C, P> AsyncLockGuard<'a, C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    pub(crate) fn new(lock: &'a mut AsyncSqlLock<C, P>) -> Self {
        Self { lock }
    }

    pub async fn exit(self) -> SqlLockResult<()> {
        self.lock.close().await
    }
}

impl<C, P> Deref for AsyncLockGuard<'_, C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    type Target = AsyncSqlLock<C, P>;

    fn deref(&self) -> &Self::Target {
        self.lock
    }
}

impl<C, P> DerefMut for AsyncLockGuard<'_, C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.lock
    }
}

impl<C, P> Drop for AsyncLockGuard<'_, C, P>
where
    C: AsyncLockConnection,
    P: LockProtocol + Send + Sync,
{
    fn drop(&mut self) {
        if self.lock.locked() {
            warn!(key = %self.lock.actual_key(), "async lock scope dropped without exit, the lock is still held");
        }
    }
}
