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

use async_trait::async_trait;

use crate::errors::SqlLockResult;
use crate::statements::{Reply, Statement};

/// Asynchronous version of [`LockConnection`](crate::LockConnection).
#[async_trait]
pub trait AsyncLockConnection: Send {
    fn dialect_name(&self) -> &str;

    async fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply>;
}

#[async_trait]
impl<T: AsyncLockConnection + ?Sized> AsyncLockConnection for &mut T {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    async fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        (**self).query_scalar(statement).await
    }
}

#[async_trait]
impl<T: AsyncLockConnection + ?Sized> AsyncLockConnection for Box<T> {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    async fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        (**self).query_scalar(statement).await
    }
}
