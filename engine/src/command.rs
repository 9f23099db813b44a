//! Name-based command surface: an operation name plus positional string
//! arguments in, JSON bytes out.

use rand::RngCore;

use bearer_store::KvStore;
use bearer_types::{HolderId, HolderKind};

use crate::codec::encode;
use crate::engine::TransferEngine;
use crate::error::EngineError;
use crate::request::{expect_args, parse, parse_flag, CashIn, CashOut, DemoSeed, TokenTransfer};

/// A state-changing command.
#[derive(Clone, Debug, PartialEq)]
pub enum InvokeCommand {
    InitDemo(DemoSeed),
    CashIn(CashIn),
    TransferTokens(TokenTransfer),
    CashOut(CashOut),
    DeleteState(String),
    ResetAll,
}

impl InvokeCommand {
    pub fn parse(function: &str, args: &[String]) -> Result<Self, EngineError> {
        match function {
            "initdemo" => DemoSeed::from_args(args).map(Self::InitDemo),
            "cashin" => CashIn::from_args(args).map(Self::CashIn),
            "transferTokens" => TokenTransfer::from_args(args).map(Self::TransferTokens),
            "cashOut" => CashOut::from_args(args).map(Self::CashOut),
            "deleteState" => {
                expect_args(function, args, 1)?;
                Ok(Self::DeleteState(args[0].clone()))
            }
            "resetAll" => {
                expect_args(function, args, 0)?;
                Ok(Self::ResetAll)
            }
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitDemo(_) => "initdemo",
            Self::CashIn(_) => "cashin",
            Self::TransferTokens(_) => "transferTokens",
            Self::CashOut(_) => "cashOut",
            Self::DeleteState(_) => "deleteState",
            Self::ResetAll => "resetAll",
        }
    }
}

/// A read-only command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryCommand {
    Read(String),
    GetTokens { kind: HolderKind, id: HolderId },
    GetTransactions { exclusive: bool, holder: Option<HolderId> },
}

impl QueryCommand {
    pub fn parse(function: &str, args: &[String]) -> Result<Self, EngineError> {
        match function {
            "read" => {
                expect_args(function, args, 1)?;
                Ok(Self::Read(args[0].clone()))
            }
            "getTokens" => {
                expect_args(function, args, 2)?;
                let kind = HolderKind::from_collection_key(&args[0]).ok_or_else(|| EngineError::InvalidArgument {
                    name: "collection",
                    value: args[0].clone(),
                })?;
                Ok(Self::GetTokens {
                    kind,
                    id: parse(args, 1, "id")?,
                })
            }
            "getTransactions" => {
                expect_args(function, args, 2)?;
                let exclusive = parse_flag(args, 0, "exclusive")?;
                // The holder argument is only read for filtered listings.
                let holder = if exclusive { Some(parse(args, 1, "holder")?) } else { None };
                Ok(Self::GetTransactions { exclusive, holder })
            }
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::GetTokens { .. } => "getTokens",
            Self::GetTransactions { .. } => "getTransactions",
        }
    }
}

/// Run a state-changing command. Transfers return the recorded transaction
/// as JSON; administrative commands return nothing.
pub fn invoke<S: KvStore, R: RngCore>(
    engine: &mut TransferEngine<S, R>,
    function: &str,
    args: &[String],
) -> Result<Option<Vec<u8>>, EngineError> {
    let result = InvokeCommand::parse(function, args).and_then(|command| run_invoke(engine, &command));
    if let Err(e) = &result {
        tracing::warn!(function, error = %e, "invoke rejected");
    }
    result
}

/// Run a read-only command and return its JSON (or raw, for `read`) output.
pub fn query<S: KvStore, R: RngCore>(
    engine: &TransferEngine<S, R>,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>, EngineError> {
    let result = QueryCommand::parse(function, args).and_then(|command| run_query(engine, &command));
    if let Err(e) = &result {
        tracing::warn!(function, error = %e, "query rejected");
    }
    result
}

fn run_invoke<S: KvStore, R: RngCore>(
    engine: &mut TransferEngine<S, R>,
    command: &InvokeCommand,
) -> Result<Option<Vec<u8>>, EngineError> {
    let tx = match command {
        InvokeCommand::InitDemo(seed) => {
            engine.seed_demo(seed)?;
            return Ok(None);
        }
        InvokeCommand::DeleteState(key) => {
            engine.delete_state(key)?;
            return Ok(None);
        }
        InvokeCommand::ResetAll => {
            engine.reset_all()?;
            return Ok(None);
        }
        InvokeCommand::CashIn(req) => engine.cash_in(req)?,
        InvokeCommand::TransferTokens(req) => engine.transfer_tokens(req)?,
        InvokeCommand::CashOut(req) => engine.cash_out(req)?,
    };
    encode(command.name(), &tx).map(Some)
}

fn run_query<S: KvStore, R: RngCore>(engine: &TransferEngine<S, R>, command: &QueryCommand) -> Result<Vec<u8>, EngineError> {
    let queries = engine.queries();
    match command {
        QueryCommand::Read(key) => queries.read_raw(key),
        QueryCommand::GetTokens { kind, id } => encode(command.name(), &queries.get_balance(*kind, *id)?),
        QueryCommand::GetTransactions { exclusive, holder } => {
            encode(command.name(), &queries.get_transactions(*exclusive, *holder)?)
        }
    }
}
