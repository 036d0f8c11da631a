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

use crate::errors::SqlLockResult;
use crate::statements::{Reply, Statement};

/// An already-open database session that locking statements run on.
///
/// The lock never opens, closes or pools the session. A session is not
/// expected to be shared between threads while a lock is bound to it.
pub trait LockConnection {
    /// Dialect of the server, e.g. `"postgresql"` or `"mysql"`.
    fn dialect_name(&self) -> &str;

    /// Executes `statement` and returns the first column of its first row,
    /// or [`Reply::Null`] when the statement yields no value.
    ///
    /// Driver failures should be wrapped with [`SqlLockError::database`](crate::SqlLockError::database).
    fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply>;
}

impl<T: LockConnection + ?Sized> LockConnection for &mut T {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        (**self).query_scalar(statement)
    }
}

impl<T: LockConnection + ?Sized> LockConnection for Box<T> {
    fn dialect_name(&self) -> &str {
        (**self).dialect_name()
    }

    fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        (**self).query_scalar(statement)
    }
}
