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

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::errors::{SqlLockError, SqlLockResult};
use crate::lock::BackendKind;
use crate::util::safe_name;

/// Whether the lock will be driven through [`LockConnection`](crate::LockConnection)
/// or [`AsyncLockConnection`](crate::AsyncLockConnection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    Blocking,
    Async,
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingConvention::Blocking => f.write_str("blocking"),
            CallingConvention::Async => f.write_str("async"),
        }
    }
}

/// The implementations registered for one dialect, per calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub blocking: BackendKind,
    pub non_blocking: BackendKind,
}

impl RegistryEntry {
    const fn both(kind: BackendKind) -> Self {
        Self {
            blocking: kind,
            non_blocking: kind,
        }
    }

    pub fn get(&self, convention: CallingConvention) -> BackendKind {
        match convention {
            CallingConvention::Blocking => self.blocking,
            CallingConvention::Async => self.non_blocking,
        }
    }
}

/// Dialect name -> lock implementations. Aliases share their target's entry.
pub static BACKENDS: Lazy<HashMap<&'static str, RegistryEntry>> = Lazy::new(|| {
    let mysql = RegistryEntry::both(BackendKind::Mysql);
    HashMap::from([
        ("mysql", mysql),
        ("mariadb", mysql),
        ("postgresql", RegistryEntry::both(BackendKind::Postgresql)),
        ("mssql", RegistryEntry::both(BackendKind::Mssql)),
        ("oracle", RegistryEntry::both(BackendKind::Oracle)),
    ])
});

/// Resolves a connection's dialect name to a backend.
///
/// The name is matched after lower-casing it and replacing anything that is
/// not alphanumeric with `_`. There is no fallback: an unknown dialect is an
/// [`SqlLockError::UnsupportedBackend`].
pub fn find_backend(dialect_name: &str, convention: CallingConvention) -> SqlLockResult<BackendKind> {
    let name = safe_name(dialect_name);
    BACKENDS
        .get(name.as_str())
        .map(|entry| entry.get(convention))
        .ok_or_else(|| {
            SqlLockError::UnsupportedBackend(format!(
                "no {} lock implementation for dialect {:?}",
                convention, dialect_name
            ))
        })
}
