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
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::config::OracleLockMode;
use crate::errors::{SqlLockError, SqlLockResult};
use crate::lock::ActualKey;
use crate::statements::{mssql, mysql, oracle, postgresql, Param, Reply, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoldMode {
    Exclusive,
    Shared,
    Update,
    Oracle(OracleLockMode),
}

impl HoldMode {
    /// Whether a hold in `self` by one session blocks `requested` by another.
    fn blocks(self, requested: HoldMode) -> bool {
        use HoldMode::*;
        match (self, requested) {
            (Oracle(held), Oracle(requested)) => !held.is_compatible_with(requested),
            (Exclusive, _) | (_, Exclusive) => true,
            (Update, Update) => true,
            (Shared, Shared) | (Shared, Update) | (Update, Shared) => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Hold {
    session: u64,
    mode: HoldMode,
    count: u32,
    xact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    Never,
    Forever,
    For(Duration),
}

impl Wait {
    pub(crate) fn deadline(self, now: Instant) -> Option<Instant> {
        match self {
            Wait::Never => Some(now),
            Wait::Forever => None,
            Wait::For(d) => Some(now + d),
        }
    }
}

/// A lock request decoded from a statement, with the replies the server
/// would give for each outcome.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    key: ActualKey,
    mode: HoldMode,
    xact: bool,
    /// Oracle does not count re-acquisitions
    counted: bool,
    pub(crate) wait: Wait,
    granted: Reply,
    owned: Reply,
    busy: Reply,
}

impl Request {
    pub(crate) fn busy_reply(&self) -> Reply {
        self.busy.clone()
    }
}

/// What to do with a statement once it has been decoded.
pub(crate) enum Step {
    Reply(Reply),
    Acquire(Request),
}

enum Grant {
    Granted,
    AlreadyOwned,
    Busy,
}

#[derive(Default)]
struct State {
    next_session: u64,
    holds: HashMap<ActualKey, Vec<Hold>>,
}

struct Shared {
    state: Mutex<State>,
    released: Condvar,
}

/// In-memory stand-in for a database server's lock manager.
///
/// Understands the statement catalogs of all four backends; `dialect` is only
/// what connections report as their dialect name.
#[derive(Clone)]
pub(crate) struct MockServer {
    dialect: &'static str,
    shared: Arc<Shared>,
}

impl MockServer {
    pub(crate) fn new(dialect: &'static str) -> Self {
        Self {
            dialect,
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                released: Condvar::new(),
            }),
        }
    }

    pub(crate) fn dialect(&self) -> &'static str {
        self.dialect
    }

    pub(crate) fn open_session(&self) -> u64 {
        let mut state = self.shared.state.lock();
        state.next_session += 1;
        state.next_session
    }

    /// Number of sessions holding `key` in any mode.
    pub(crate) fn holders(&self, key: &ActualKey) -> usize {
        let state = self.shared.state.lock();
        state.holds.get(key).map_or(0, |holds| holds.len())
    }

    /// Total hold count of `session` on `key`.
    pub(crate) fn held_by(&self, session: u64, key: &ActualKey) -> u32 {
        let state = self.shared.state.lock();
        state
            .holds
            .get(key)
            .map_or(0, |holds| holds.iter().filter(|h| h.session == session).map(|h| h.count).sum())
    }

    /// Session ended: everything it held goes away.
    pub(crate) fn close_session(&self, session: u64) {
        self.drop_holds(|h| h.session == session);
    }

    /// Transaction ended: transaction-level holds go away.
    pub(crate) fn end_transaction(&self, session: u64) {
        self.drop_holds(|h| h.session == session && h.xact);
    }

    fn drop_holds(&self, doomed: impl Fn(&Hold) -> bool) {
        let mut state = self.shared.state.lock();
        for holds in state.holds.values_mut() {
            holds.retain(|h| !doomed(h));
        }
        state.holds.retain(|_, holds| !holds.is_empty());
        self.shared.released.notify_all();
    }

    /// Decodes `statement`; releases are carried out immediately.
    pub(crate) fn prepare(&self, session: u64, statement: &Statement) -> SqlLockResult<Step> {
        let sql = statement.sql();
        let step = match sql {
            mysql::GET_LOCK => {
                let wait = match statement.param("timeout") {
                    Some(Param::Int(t)) if *t < 0 => Wait::Forever,
                    Some(Param::Int(0)) => Wait::Never,
                    Some(Param::Int(t)) => Wait::For(Duration::from_secs(*t as u64)),
                    Some(Param::Float(t)) if *t < 0.0 => Wait::Forever,
                    Some(Param::Float(t)) => Wait::For(Duration::from_secs_f64(*t)),
                    other => return Err(bad_param(sql, "timeout", other)),
                };
                Step::Acquire(Request {
                    key: ActualKey::Name(text(statement, "str")?),
                    mode: HoldMode::Exclusive,
                    xact: false,
                    counted: true,
                    wait,
                    granted: Reply::Int(1),
                    owned: Reply::Int(1),
                    busy: Reply::Int(0),
                })
            }
            mysql::RELEASE_LOCK => {
                let key = ActualKey::Name(text(statement, "str")?);
                Step::Reply(match self.release(session, &key, None) {
                    Released::Yes => Reply::Int(1),
                    Released::HeldByOthers => Reply::Int(0),
                    Released::Nobody => Reply::Null,
                })
            }
            postgresql::LOCK
            | postgresql::LOCK_SHARED
            | postgresql::LOCK_XACT
            | postgresql::LOCK_XACT_SHARED
            | postgresql::TRY_LOCK
            | postgresql::TRY_LOCK_SHARED
            | postgresql::TRY_LOCK_XACT
            | postgresql::TRY_LOCK_XACT_SHARED => {
                let shared = matches!(
                    sql,
                    postgresql::LOCK_SHARED
                        | postgresql::LOCK_XACT_SHARED
                        | postgresql::TRY_LOCK_SHARED
                        | postgresql::TRY_LOCK_XACT_SHARED
                );
                let xact = matches!(
                    sql,
                    postgresql::LOCK_XACT
                        | postgresql::LOCK_XACT_SHARED
                        | postgresql::TRY_LOCK_XACT
                        | postgresql::TRY_LOCK_XACT_SHARED
                );
                let blocking = matches!(
                    sql,
                    postgresql::LOCK
                        | postgresql::LOCK_SHARED
                        | postgresql::LOCK_XACT
                        | postgresql::LOCK_XACT_SHARED
                );
                Step::Acquire(Request {
                    key: ActualKey::Id(int(statement, "key")?),
                    mode: if shared { HoldMode::Shared } else { HoldMode::Exclusive },
                    xact,
                    counted: true,
                    wait: if blocking { Wait::Forever } else { Wait::Never },
                    granted: if blocking { Reply::Null } else { Reply::Bool(true) },
                    owned: if blocking { Reply::Null } else { Reply::Bool(true) },
                    busy: Reply::Bool(false),
                })
            }
            postgresql::UNLOCK | postgresql::UNLOCK_SHARED => {
                let key = ActualKey::Id(int(statement, "key")?);
                let mode = if sql == postgresql::UNLOCK {
                    HoldMode::Exclusive
                } else {
                    HoldMode::Shared
                };
                Step::Reply(Reply::Bool(self.release(session, &key, Some(mode)) == Released::Yes))
            }
            mssql::LOCK_SHARED | mssql::LOCK_UPDATE | mssql::LOCK_EXCLUSIVE => {
                let wait = match int(statement, "timeout")? {
                    t if t < 0 => Wait::Forever,
                    0 => Wait::Never,
                    t => Wait::For(Duration::from_millis(t as u64)),
                };
                let mode = match sql {
                    mssql::LOCK_SHARED => HoldMode::Shared,
                    mssql::LOCK_UPDATE => HoldMode::Update,
                    _ => HoldMode::Exclusive,
                };
                Step::Acquire(Request {
                    key: ActualKey::Name(text(statement, "resource")?),
                    mode,
                    xact: false,
                    counted: true,
                    wait,
                    granted: Reply::Int(0),
                    owned: Reply::Int(0),
                    busy: Reply::Int(-1),
                })
            }
            mssql::UNLOCK => {
                let key = ActualKey::Name(text(statement, "resource")?);
                Step::Reply(match self.release(session, &key, None) {
                    Released::Yes => Reply::Int(0),
                    _ => Reply::Int(-999),
                })
            }
            oracle::REQUEST => {
                let mode = match int(statement, "lockmode")? {
                    oracle::NL_MODE => OracleLockMode::NL,
                    oracle::SS_MODE => OracleLockMode::SS,
                    oracle::SX_MODE => OracleLockMode::SX,
                    oracle::S_MODE => OracleLockMode::S,
                    oracle::SSX_MODE => OracleLockMode::SSX,
                    oracle::X_MODE => OracleLockMode::X,
                    _ => return Ok(Step::Reply(Reply::Int(3))),
                };
                let id = int(statement, "lock_id")?;
                if !(oracle::LOCK_ID_MIN..=oracle::LOCK_ID_MAX).contains(&id) {
                    return Ok(Step::Reply(Reply::Int(5)));
                }
                let wait = match int(statement, "timeout")? {
                    oracle::MAXWAIT => Wait::Forever,
                    0 => Wait::Never,
                    t => Wait::For(Duration::from_secs(t as u64)),
                };
                Step::Acquire(Request {
                    key: ActualKey::Id(id),
                    mode: HoldMode::Oracle(mode),
                    xact: int(statement, "release_on_commit")? != 0,
                    counted: false,
                    wait,
                    granted: Reply::Int(0),
                    owned: Reply::Int(4),
                    busy: Reply::Int(1),
                })
            }
            oracle::RELEASE => {
                let key = ActualKey::Id(int(statement, "lock_id")?);
                Step::Reply(match self.release(session, &key, None) {
                    Released::Yes => Reply::Int(0),
                    _ => Reply::Int(4),
                })
            }
            _ => {
                return Err(SqlLockError::database(format!(
                    "statement not understood by the simulator: {}",
                    sql
                )))
            }
        };
        Ok(step)
    }

    /// One non-waiting attempt.
    pub(crate) fn try_acquire(&self, session: u64, in_transaction: bool, request: &Request) -> Option<Reply> {
        let mut state = self.shared.state.lock();
        Self::grant(&mut state, session, in_transaction, request)
    }

    /// Attempts until granted or `deadline`, parking the thread in between.
    pub(crate) fn acquire_blocking(
        &self,
        session: u64,
        in_transaction: bool,
        request: &Request,
        deadline: Option<Instant>,
    ) -> Reply {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(reply) = Self::grant(&mut state, session, in_transaction, request) {
                return reply;
            }
            match deadline {
                None => self.shared.released.wait(&mut state),
                Some(deadline) => {
                    if self.wait_until(&mut state, deadline) {
                        return Self::grant(&mut state, session, in_transaction, request)
                            .unwrap_or_else(|| request.busy_reply());
                    }
                }
            }
        }
    }

    /// Returns whether the deadline has passed.
    fn wait_until(&self, state: &mut MutexGuard<'_, State>, deadline: Instant) -> bool {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        self.shared.released.wait_for(state, deadline - now);
        false
    }

    /// `Some(reply)` once decided, `None` while the key is busy.
    fn grant(state: &mut State, session: u64, in_transaction: bool, request: &Request) -> Option<Reply> {
        match Self::try_grant(state, session, in_transaction, request) {
            Grant::Granted => Some(request.granted.clone()),
            Grant::AlreadyOwned => Some(request.owned.clone()),
            Grant::Busy => None,
        }
    }

    fn try_grant(state: &mut State, session: u64, in_transaction: bool, request: &Request) -> Grant {
        let holds = state.holds.entry(request.key.clone()).or_default();

        if !request.counted && holds.iter().any(|h| h.session == session) {
            return Grant::AlreadyOwned;
        }
        if holds
            .iter()
            .any(|h| h.session != session && h.mode.blocks(request.mode))
        {
            return Grant::Busy;
        }

        // outside a transaction an advisory transaction-level lock ends with
        // the statement; Oracle sessions are always inside a transaction
        if request.xact && !in_transaction && !matches!(request.mode, HoldMode::Oracle(_)) {
            if holds.is_empty() {
                state.holds.remove(&request.key);
            }
            return Grant::Granted;
        }

        match holds
            .iter_mut()
            .find(|h| h.session == session && h.mode == request.mode && h.xact == request.xact)
        {
            Some(hold) => hold.count += 1,
            None => holds.push(Hold {
                session,
                mode: request.mode,
                count: 1,
                xact: request.xact,
            }),
        }
        Grant::Granted
    }

    fn release(&self, session: u64, key: &ActualKey, mode: Option<HoldMode>) -> Released {
        let mut state = self.shared.state.lock();
        let Some(holds) = state.holds.get_mut(key) else {
            return Released::Nobody;
        };
        // advisory transaction-level holds only end with the transaction
        let position = holds.iter().position(|h| {
            h.session == session
                && mode.map_or(true, |m| h.mode == m)
                && (!h.xact || matches!(h.mode, HoldMode::Oracle(_)))
        });
        let Some(position) = position else {
            return Released::HeldByOthers;
        };

        let hold = &mut holds[position];
        hold.count -= 1;
        if hold.count == 0 || matches!(hold.mode, HoldMode::Oracle(_)) {
            holds.remove(position);
        }
        if holds.is_empty() {
            state.holds.remove(key);
        }
        self.shared.released.notify_all();
        Released::Yes
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Released {
    Yes,
    HeldByOthers,
    Nobody,
}

fn text(statement: &Statement, name: &'static str) -> SqlLockResult<String> {
    match statement.param(name) {
        Some(Param::Text(s)) => Ok(s.clone()),
        other => Err(bad_param(statement.sql(), name, other)),
    }
}

fn int(statement: &Statement, name: &'static str) -> SqlLockResult<i64> {
    match statement.param(name) {
        Some(Param::Int(i)) => Ok(*i),
        other => Err(bad_param(statement.sql(), name, other)),
    }
}

fn bad_param(sql: &str, name: &str, value: Option<&Param>) -> SqlLockError {
    SqlLockError::database(format!("bad parameter {} = {:?} for {}", name, value, sql))
}
