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
use async_trait::async_trait;
use crate::SqlLockResult;

mod guard;
mod lock;

pub use guard::*;
pub use lock::*;

/// Asynchronous version of [`Lockable`](crate::Lockable)
#[async_trait]
pub trait AsyncLockable: Send {
    async fn acquire(&mut self, block: bool, timeout: Option<Duration>) -> SqlLockResult<bool>;
    async fn release(&mut self) -> SqlLockResult<()>;
    fn locked(&self) -> bool;

    async fn lock(&mut self) -> SqlLockResult<()> {
        self.acquire(true, None).await.map(|_| ())
    }

    async fn try_lock(&mut self) -> SqlLockResult<bool> {
        self.acquire(false, None).await
    }

    async fn try_lock_timeout(&mut self, wait_time: Duration) -> SqlLockResult<bool> {
        self.acquire(true, Some(wait_time)).await
    }

    async fn unlock(&mut self) -> SqlLockResult<bool> {
        if !self.locked() {
            return Ok(false);
        }
        self.release().await.map(|_| true)
    }
}
