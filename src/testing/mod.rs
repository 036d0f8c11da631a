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

//! In-memory database lock manager for unit tests.

mod connection;
mod events;
mod server;

pub(crate) use connection::*;
pub(crate) use events::EventLog;
pub(crate) use server::MockServer;

use uuid::Uuid;

/// A key no other test uses.
pub(crate) fn unique_key(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
