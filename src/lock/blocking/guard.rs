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

use tracing::error;

use crate::connection::LockConnection;
use crate::errors::SqlLockResult;
use crate::lock::{LockProtocol, SqlLock};

/// Scope of a lock entered with [`SqlLock::enter`].
///
/// [`exit`](Self::exit) closes the lock and reports the outcome. A guard that
/// is dropped without `exit` still closes the lock, logging any failure.
pub struct LockGuard<'a, C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    lock: &'a mut SqlLock<C, P>,
    exited: bool,
}

impl<'a, C, P> LockGuard<'a, C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    pub(crate) fn new(lock: &'a mut SqlLock<C, P>) -> Self {
        Self { lock, exited: false }
    }

    /// Leaves the scope, closing the lock.
    pub fn exit(mut self) -> SqlLockResult<()> {
        self.exited = true;
        self.lock.close()
    }
}

impl<C, P> Deref for LockGuard<'_, C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    type Target = SqlLock<C, P>;

    fn deref(&self) -> &Self::Target {
        self.lock
    }
}

impl<C, P> DerefMut for LockGuard<'_, C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.lock
    }
}

impl<C, P> Drop for LockGuard<'_, C, P>
where
    C: LockConnection,
    P: LockProtocol,
{
    fn drop(&mut self) {
        if self.exited {
            return;
        }
        if let Err(e) = self.lock.close() {
            error!(key = %self.lock.actual_key(), "failed to close lock on scope exit: {}", e);
        }
    }
}
