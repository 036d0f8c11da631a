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

use std::fmt;
use std::sync::Arc;

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};

use crate::errors::{SqlLockError, SqlLockResult};

type Blake2b64 = Blake2b<U8>;

/// The caller-supplied identifier of a lock, before backend normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum LockKey {
    Text(String),
    Bytes(Vec<u8>),
    /// Wide enough to carry values outside the signed 64-bit range, so that
    /// range checks happen here instead of at the call site.
    Int(i128),
    Float(f64),
}

impl LockKey {
    pub fn type_name(&self) -> &'static str {
        match self {
            LockKey::Text(_) => "text",
            LockKey::Bytes(_) => "bytes",
            LockKey::Int(_) => "int",
            LockKey::Float(_) => "float",
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKey::Text(s) => write!(f, "{:?}", s),
            LockKey::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            LockKey::Int(i) => write!(f, "{}", i),
            LockKey::Float(v) => f.write_str(&float_key_text(*v)),
        }
    }
}

impl From<&str> for LockKey {
    fn from(value: &str) -> Self {
        LockKey::Text(value.to_string())
    }
}

impl From<String> for LockKey {
    fn from(value: String) -> Self {
        LockKey::Text(value)
    }
}

impl From<&String> for LockKey {
    fn from(value: &String) -> Self {
        LockKey::Text(value.clone())
    }
}

impl From<&[u8]> for LockKey {
    fn from(value: &[u8]) -> Self {
        LockKey::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for LockKey {
    fn from(value: Vec<u8>) -> Self {
        LockKey::Bytes(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LockKey {
                fn from(value: $t) -> Self {
                    LockKey::Int(value as i128)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, isize, usize);

impl From<f32> for LockKey {
    fn from(value: f32) -> Self {
        LockKey::Float(value as f64)
    }
}

impl From<f64> for LockKey {
    fn from(value: f64) -> Self {
        LockKey::Float(value)
    }
}

pub type TextConvertFn = dyn Fn(&LockKey) -> SqlLockResult<String> + Send + Sync;
pub type IntConvertFn = dyn Fn(&LockKey) -> SqlLockResult<i128> + Send + Sync;

/// A caller-supplied replacement for the default key conversion.
///
/// The result is still validated against the backend's key domain.
#[derive(Clone)]
pub enum KeyConverter {
    /// For name-based backends (MySQL, SQL Server).
    Text(Arc<TextConvertFn>),
    /// For integer-keyed backends (PostgreSQL, Oracle).
    Integer(Arc<IntConvertFn>),
}

impl KeyConverter {
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&LockKey) -> SqlLockResult<String> + Send + Sync + 'static,
    {
        KeyConverter::Text(Arc::new(f))
    }

    pub fn integer<F>(f: F) -> Self
    where
        F: Fn(&LockKey) -> SqlLockResult<i128> + Send + Sync + 'static,
    {
        KeyConverter::Integer(Arc::new(f))
    }
}

impl fmt::Debug for KeyConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyConverter::Text(_) => f.write_str("KeyConverter::Text(..)"),
            KeyConverter::Integer(_) => f.write_str("KeyConverter::Integer(..)"),
        }
    }
}

/// Text form of a float key. It always carries a fractional part or an
/// exponent (`1.0`, `1e+20`, `1.5e-07`), so it never collides with an integer key.
pub fn float_key_text(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{:?}", v);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Default conversion for name-based backends.
pub fn to_str_key(key: &LockKey) -> SqlLockResult<String> {
    match key {
        LockKey::Text(s) => Ok(s.clone()),
        LockKey::Int(i) => Ok(i.to_string()),
        LockKey::Float(v) => Ok(float_key_text(*v)),
        LockKey::Bytes(b) => String::from_utf8(b.clone())
            .map_err(|e| SqlLockError::InvalidKeyType(format!("bytes key is not valid UTF-8: {}", e))),
    }
}

/// Normalizes a key for a backend that identifies locks by a bounded-length string.
pub fn normalize_str_key(
    key: &LockKey,
    convert: Option<&KeyConverter>,
    backend: &'static str,
    max_length: usize,
) -> SqlLockResult<String> {
    let actual = match convert {
        Some(KeyConverter::Text(f)) => f(key)?,
        Some(KeyConverter::Integer(_)) => {
            return Err(SqlLockError::InvalidKeyType(format!(
                "{} requires a text key converter",
                backend
            )))
        }
        None => to_str_key(key)?,
    };

    let length = actual.chars().count();
    if length > max_length {
        return Err(SqlLockError::KeyTooLong {
            backend,
            length,
            max: max_length,
        });
    }
    Ok(actual)
}

/// 8-byte BLAKE2b digest of `data`, read as a little-endian integer.
pub fn blake2b_u64(data: &[u8]) -> u64 {
    let digest = Blake2b64::digest(data);
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest);
    u64::from_le_bytes(buf)
}

/// Rejects integers outside `[-2^63, 2^63-1]`; never wraps.
pub fn ensure_int64(i: i128) -> SqlLockResult<i64> {
    i64::try_from(i).map_err(|_| SqlLockError::KeyOutOfRange(i))
}

/// Default conversion for signed 64-bit advisory-lock keys.
pub fn to_int64_key(key: &LockKey) -> SqlLockResult<i64> {
    match key {
        LockKey::Int(i) => ensure_int64(*i),
        LockKey::Text(s) => Ok(blake2b_u64(s.as_bytes()) as i64),
        LockKey::Bytes(b) => Ok(blake2b_u64(b) as i64),
        LockKey::Float(_) => Err(SqlLockError::InvalidKeyType(
            "advisory lock keys must be int, text or bytes, got float".to_string(),
        )),
    }
}

/// Normalizes a key for a backend that identifies locks by a signed 64-bit integer.
pub fn normalize_int64_key(key: &LockKey, convert: Option<&KeyConverter>) -> SqlLockResult<i64> {
    match convert {
        Some(KeyConverter::Integer(f)) => ensure_int64(f(key)?),
        Some(KeyConverter::Text(_)) => Err(SqlLockError::InvalidKeyType(
            "advisory lock requires an integer key converter".to_string(),
        )),
        None => to_int64_key(key),
    }
}

/// Folds any integer into `[0, max]` by modulo.
pub fn wrap_into_range(i: i128, max: i64) -> i64 {
    i.rem_euclid(max as i128 + 1) as i64
}

/// Normalizes a key for a backend with a small non-negative integer domain `[0, max]`.
///
/// Out-of-range integers wrap instead of failing; text, bytes and floats are
/// hashed first and then wrapped.
pub fn normalize_wrapped_key(
    key: &LockKey,
    convert: Option<&KeyConverter>,
    max: i64,
) -> SqlLockResult<i64> {
    let raw: i128 = match (convert, key) {
        (Some(KeyConverter::Integer(f)), _) => f(key)?,
        (Some(KeyConverter::Text(_)), _) => {
            return Err(SqlLockError::InvalidKeyType(
                "user lock requires an integer key converter".to_string(),
            ))
        }
        (None, LockKey::Int(i)) => *i,
        (None, LockKey::Text(s)) => blake2b_u64(s.as_bytes()) as i128,
        (None, LockKey::Bytes(b)) => blake2b_u64(b) as i128,
        (None, LockKey::Float(v)) => blake2b_u64(float_key_text(*v).as_bytes()) as i128,
    };
    Ok(wrap_into_range(raw, max))
}
