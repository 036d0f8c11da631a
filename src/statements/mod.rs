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

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgresql;

use std::fmt;

/// A value bound to a named statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Text(s) => write!(f, "'{}'", s),
            Param::Int(i) => write!(f, "{}", i),
            Param::Float(v) => write!(f, "{}", v),
        }
    }
}

/// First column of the first row returned by a locking statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// SQL `NULL`, or no row at all (`void` functions).
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Reply {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Reply::Int(i) => Some(*i),
            Reply::Bool(b) => Some(*b as i64),
            Reply::Text(s) => s.trim().parse().ok(),
            Reply::Null => None,
        }
    }

    /// Interprets a boolean-returning function's result; `None` if the reply is not a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Reply::Bool(b) => Some(*b),
            Reply::Int(0) => Some(false),
            Reply::Int(1) => Some(true),
            Reply::Text(s) => match s.as_str() {
                "t" | "true" => Some(true),
                "f" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reply::Null)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Null => f.write_str("NULL"),
            Reply::Bool(b) => write!(f, "{}", b),
            Reply::Int(i) => write!(f, "{}", i),
            Reply::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// A parametrized SQL statement from the catalog, ready to be executed by a connection.
///
/// Parameters use the `:name` marker style; a connection translates them to
/// whatever its driver expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: &'static str,
    params: Vec<(&'static str, Param)>,
}

impl Statement {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, name: &'static str, value: Param) -> Self {
        self.params.push((name, value));
        self
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[(&'static str, Param)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql.trim())?;
        if !self.params.is_empty() {
            f.write_str(" [")?;
            for (i, (name, value)) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", name, value)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
