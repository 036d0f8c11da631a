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

//! Oracle `DBMS_LOCK` user locks.
//!
//! `REQUEST` returns `0` success, `1` timeout, `2` deadlock, `3` parameter error,
//! `4` already own the lock, `5` illegal lock handle.
//! `RELEASE` returns `0` success, `3` parameter error, `4` do not own the lock,
//! `5` illegal lock handle.

pub const REQUEST: &str = r#"
    SELECT DBMS_LOCK.REQUEST(
        id => :lock_id,
        lockmode => :lockmode,
        timeout => :timeout,
        release_on_commit => :release_on_commit
    ) AS result FROM DUAL
"#;

pub const RELEASE: &str = r#"
    SELECT DBMS_LOCK.RELEASE(id => :lock_id) AS result FROM DUAL
"#;

pub const NL_MODE: i64 = 1;
pub const SS_MODE: i64 = 2;
pub const SX_MODE: i64 = 3;
pub const S_MODE: i64 = 4;
pub const SSX_MODE: i64 = 5;
pub const X_MODE: i64 = 6;

/// Longest wait `DBMS_LOCK` accepts, in seconds; also means "wait forever".
pub const MAXWAIT: i64 = 32767;

pub const LOCK_ID_MIN: i64 = 0;
pub const LOCK_ID_MAX: i64 = 1_073_741_823;
