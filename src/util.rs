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

/// Lowercases a dialect name and replaces every non-alphanumeric character with `_`.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Whole milliseconds (truncated), capped at `max`.
pub fn num_milliseconds_capped(duration: &Duration, max: i64) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX).min(max)
}

/// Whole seconds (truncated), capped at `max`.
pub fn num_seconds_capped(duration: &Duration, max: i64) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX).min(max)
}
