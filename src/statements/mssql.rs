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

//! SQL Server application locks, owned by the session.
//!
//! `@LockTimeout` is in milliseconds (`0` = no wait, `-1` = infinite).
//! `sp_getapplock` returns `0` (granted at once), `1` (granted after waiting),
//! `-1` (timeout), `-2` (cancelled), `-3` (deadlock victim) or `-999`
//! (parameter validation or other call error).

pub const LOCK_EXCLUSIVE: &str = r#"
    DECLARE @result int
    EXEC @result = sp_getapplock
        @Resource = :resource,
        @LockMode = 'Exclusive',
        @LockTimeout = :timeout,
        @LockOwner = 'Session'
    SELECT @result
"#;

pub const LOCK_SHARED: &str = r#"
    DECLARE @result int
    EXEC @result = sp_getapplock
        @Resource = :resource,
        @LockMode = 'Shared',
        @LockTimeout = :timeout,
        @LockOwner = 'Session'
    SELECT @result
"#;

pub const LOCK_UPDATE: &str = r#"
    DECLARE @result int
    EXEC @result = sp_getapplock
        @Resource = :resource,
        @LockMode = 'Update',
        @LockTimeout = :timeout,
        @LockOwner = 'Session'
    SELECT @result
"#;

pub const UNLOCK: &str = r#"
    DECLARE @result int
    EXEC @result = sp_releaseapplock
        @Resource = :resource,
        @LockOwner = 'Session'
    SELECT @result
"#;

pub const WAIT_FOREVER: i64 = -1;

/// `@LockTimeout` is an `int`.
pub const MAX_LOCK_TIMEOUT: i64 = i32::MAX as i64;

pub const LOCK_RESOURCE_MAX_LENGTH: usize = 255;
