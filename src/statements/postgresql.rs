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

//! PostgreSQL advisory locks.
//!
//! The blocking functions return `void`; the `try` functions and the unlock
//! functions return a boolean. Transaction-level locks have no unlock function.

use std::time::Duration;

pub const LOCK: &str = "SELECT pg_advisory_lock(:key)";
pub const LOCK_SHARED: &str = "SELECT pg_advisory_lock_shared(:key)";
pub const LOCK_XACT: &str = "SELECT pg_advisory_xact_lock(:key)";
pub const LOCK_XACT_SHARED: &str = "SELECT pg_advisory_xact_lock_shared(:key)";

pub const TRY_LOCK: &str = "SELECT pg_try_advisory_lock(:key)";
pub const TRY_LOCK_SHARED: &str = "SELECT pg_try_advisory_lock_shared(:key)";
pub const TRY_LOCK_XACT: &str = "SELECT pg_try_advisory_xact_lock(:key)";
pub const TRY_LOCK_XACT_SHARED: &str = "SELECT pg_try_advisory_xact_lock_shared(:key)";

pub const UNLOCK: &str = "SELECT pg_advisory_unlock(:key)";
pub const UNLOCK_SHARED: &str = "SELECT pg_advisory_unlock_shared(:key)";

pub const SLEEP_INTERVAL_DEFAULT: Duration = Duration::from_secs(1);
pub const SLEEP_INTERVAL_MIN: Duration = Duration::from_millis(100);
