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

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::server::{MockServer, Step};
use crate::connection::{AsyncLockConnection, LockConnection};
use crate::errors::{SqlLockError, SqlLockResult};
use crate::statements::{Reply, Statement};

const ASYNC_POLL: Duration = Duration::from_millis(5);

/// What a scripted connection answers instead of asking the server.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Reply(Reply),
    Error(String),
}

/// Session bookkeeping shared by both connection flavours.
struct Session {
    server: MockServer,
    id: u64,
    in_transaction: bool,
    executed: Vec<Statement>,
    scripted: VecDeque<Scripted>,
}

impl Session {
    fn new(server: &MockServer) -> Self {
        Self {
            server: server.clone(),
            id: server.open_session(),
            in_transaction: false,
            executed: Vec::new(),
            scripted: VecDeque::new(),
        }
    }

    /// Records the statement and either answers from the script or decodes it.
    fn begin_statement(&mut self, statement: &Statement) -> SqlLockResult<Step> {
        self.executed.push(statement.clone());
        match self.scripted.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(Step::Reply(reply)),
            Some(Scripted::Error(message)) => Err(SqlLockError::database(message)),
            None => self.server.prepare(self.id, statement),
        }
    }

    fn end_transaction(&mut self) {
        self.in_transaction = false;
        self.server.end_transaction(self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.server.close_session(self.id);
    }
}

macro_rules! session_accessors {
    ($name:ident) => {
        #[allow(dead_code)]
        impl $name {
            pub(crate) fn new(server: &MockServer) -> Self {
                Self {
                    session: Session::new(server),
                }
            }

            pub(crate) fn session_id(&self) -> u64 {
                self.session.id
            }

            /// Every statement sent so far, scripted ones included.
            pub(crate) fn executed(&self) -> &[Statement] {
                &self.session.executed
            }

            pub(crate) fn executed_sql(&self) -> Vec<&'static str> {
                self.session.executed.iter().map(|s| s.sql()).collect()
            }

            pub(crate) fn script_reply(&mut self, reply: Reply) {
                self.session.scripted.push_back(Scripted::Reply(reply));
            }

            pub(crate) fn script_error(&mut self, message: &str) {
                self.session.scripted.push_back(Scripted::Error(message.to_string()));
            }

            pub(crate) fn begin(&mut self) {
                self.session.in_transaction = true;
            }

            pub(crate) fn commit(&mut self) {
                self.session.end_transaction();
            }

            pub(crate) fn rollback(&mut self) {
                self.session.end_transaction();
            }
        }
    };
}

/// Blocking session on a [`MockServer`]; waits park the calling thread.
pub(crate) struct MockConnection {
    session: Session,
}

session_accessors!(MockConnection);

impl LockConnection for MockConnection {
    fn dialect_name(&self) -> &str {
        self.session.server.dialect()
    }

    fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        match self.session.begin_statement(statement)? {
            Step::Reply(reply) => Ok(reply),
            Step::Acquire(request) => {
                let deadline = request.wait.deadline(Instant::now());
                Ok(self
                    .session
                    .server
                    .acquire_blocking(self.session.id, self.session.in_transaction, &request, deadline))
            }
        }
    }
}

/// Async session on a [`MockServer`]; waits poll on the tokio timer.
pub(crate) struct AsyncMockConnection {
    session: Session,
}

session_accessors!(AsyncMockConnection);

#[async_trait]
impl AsyncLockConnection for AsyncMockConnection {
    fn dialect_name(&self) -> &str {
        self.session.server.dialect()
    }

    async fn query_scalar(&mut self, statement: &Statement) -> SqlLockResult<Reply> {
        let request = match self.session.begin_statement(statement)? {
            Step::Reply(reply) => return Ok(reply),
            Step::Acquire(request) => request,
        };
        let deadline = request.wait.deadline(Instant::now());
        loop {
            let attempt = self
                .session
                .server
                .try_acquire(self.session.id, self.session.in_transaction, &request);
            if let Some(reply) = attempt {
                return Ok(reply);
            }
            if deadline.map_or(false, |d| Instant::now() >= d) {
                return Ok(request.busy_reply());
            }
            tokio::time::sleep(ASYNC_POLL).await;
        }
    }
}
