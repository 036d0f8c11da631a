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

//! MySQL / MariaDB named locks.
//!
//! `GET_LOCK` returns `1` when granted, `0` when the timeout elapsed and `NULL`
//! on error. A negative timeout waits forever.
//! `RELEASE_LOCK` returns `1` when released, `0` when the lock belongs to another
//! session and `NULL` when no such lock exists.

pub const GET_LOCK: &str = "SELECT GET_LOCK(:str, :timeout)";

pub const RELEASE_LOCK: &str = "SELECT RELEASE_LOCK(:str)";

/// Infinite wait for `GET_LOCK`.
pub const WAIT_FOREVER: i64 = -1;

pub const LOCK_NAME_MAX_LENGTH: usize = 64;
