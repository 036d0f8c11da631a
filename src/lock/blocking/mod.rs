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

mod guard;
mod lock;

pub use guard::*;
pub use lock::*;

use crate::SqlLockResult;
use std::time::Duration;

/// Common acquire/release surface of the blocking locks.
pub trait Lockable {
    /// Acquire the lock; see [`SqlLock::acquire`].
    fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool>;

    /// Release the lock; see [`SqlLock::release`].
    fn release(&mut self) -> SqlLockResult<()>;

    /// Whether this object currently holds the lock
    fn locked(&self) -> bool;

    /// Wait until the lock is granted
    fn lock(&mut self) -> SqlLockResult<()> {
        self.acquire(true, None).map(|_| ())
    }

    /// Single non-blocking attempt
    fn try_lock(&mut self) -> SqlLockResult<bool> {
        self.acquire(false, None)
    }

    /// Wait at most `wait_time` for the lock
    fn try_lock_timeout(&mut self, wait_time: Duration) -> SqlLockResult<bool> {
        self.acquire(true, Some(wait_time))
    }

    /// Release if held, otherwise do nothing
    fn unlock(&mut self) -> SqlLockResult<bool> {
        if !self.locked() {
            return Ok(false);
        }
        self.release().map(|_| true)
    }
}
