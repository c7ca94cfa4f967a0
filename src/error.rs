//! Diagnostic types for every fatal condition the compiler can raise.
//!
//! `CompileError` covers the lexical/syntactic/semantic taxonomy, each
//! variant carrying the `SourcePos` that the driver renders as
//! `<source>:<line>:<col>: <message>`. `DriverError` covers the CLI and
//! environment failures that have no source position at all.

use crate::token::SourcePos;
use crate::valtype::ValType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("illegal character '{ch}' (ASCII #{code})")]
    IllegalCharacter { ch: char, code: u8, pos: SourcePos },

    #[error("identifier too long")]
    IdentifierTooLong { pos: SourcePos },

    #[error("number too large")]
    NumberTooLarge { pos: SourcePos },

    #[error("non-printable character (ASCII #{code}) in string")]
    NonPrintableInString { code: u8, pos: SourcePos },

    #[error("illegal escape code '\\{ch}' in string")]
    IllegalEscape { ch: char, pos: SourcePos },

    #[error("string not closed")]
    StringNotClosed { pos: SourcePos },

    #[error("comment not closed")]
    CommentNotClosed { pos: SourcePos },

    #[error("expected {expected}, but found {found}")]
    Expected {
        expected: String,
        found: String,
        pos: SourcePos,
    },

    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String, pos: SourcePos },

    #[error("multiple definition of '{name}'")]
    MultipleDefinition { name: String, pos: SourcePos },

    #[error("incompatible types (expected {expected}, found {found}) {context}")]
    IncompatibleTypes {
        expected: ValType,
        found: ValType,
        context: String,
        pos: SourcePos,
    },

    #[error("unreachable: {what}")]
    Unreachable { what: String, pos: SourcePos },

    #[error("symbol table exhausted")]
    TableFull { pos: SourcePos },
}

impl CompileError {
    /// The position every variant carries, used to render the diagnostic line.
    pub fn pos(&self) -> SourcePos {
        match self {
            CompileError::IllegalCharacter { pos, .. }
            | CompileError::IdentifierTooLong { pos }
            | CompileError::NumberTooLarge { pos }
            | CompileError::NonPrintableInString { pos, .. }
            | CompileError::IllegalEscape { pos, .. }
            | CompileError::StringNotClosed { pos }
            | CompileError::CommentNotClosed { pos }
            | CompileError::Expected { pos, .. }
            | CompileError::UnknownIdentifier { pos, .. }
            | CompileError::MultipleDefinition { pos, .. }
            | CompileError::IncompatibleTypes { pos, .. }
            | CompileError::Unreachable { pos, .. }
            | CompileError::TableFull { pos } => *pos,
        }
    }
}

/// CLI, environment, and configuration failures: reported as a single line
/// with no `<line>:<col>` segment, since they have no source position.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("usage: simplc <filename>")]
    Usage,

    #[error("file '{path}' could not be opened: {source}")]
    CannotOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JASMIN_JAR environment variable not set")]
    JasminJarNotSet,

    #[error("invalid {path}: {reason}")]
    BadConfig { path: String, reason: String },

    #[error("failed to spawn assembler: {0}")]
    AssemblerSpawn(std::io::Error),

    #[error("failed to write {path}: {source}")]
    CannotWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}
