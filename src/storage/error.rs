use std::fmt;

use sea_orm::{DbErr, SqlErr};

/// Which unique index rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    ShortCode,
    Username,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageErrorKind {
    UniqueViolation { constraint: UniqueConstraint },
    Connection,
    Other,
}

/// Error returned by the persistence gateway. Callers branch on `kind`;
/// `message` is only for logs.
#[derive(Debug, Clone)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn unique_violation<T: Into<String>>(constraint: UniqueConstraint, msg: T) -> Self {
        Self {
            kind: StorageErrorKind::UniqueViolation { constraint },
            message: msg.into(),
        }
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        Self {
            kind: StorageErrorKind::Connection,
            message: msg.into(),
        }
    }

    pub fn other<T: Into<String>>(msg: T) -> Self {
        Self {
            kind: StorageErrorKind::Other,
            message: msg.into(),
        }
    }

    /// The violated constraint, if this is a uniqueness failure.
    pub fn unique_constraint(&self) -> Option<UniqueConstraint> {
        match self.kind {
            StorageErrorKind::UniqueViolation { constraint } => Some(constraint),
            _ => None,
        }
    }

    /// Classifies a database error. `unique` names the constraint a
    /// uniqueness failure is attributed to for this write.
    pub fn from_db_err(err: DbErr, unique: UniqueConstraint) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::unique_violation(unique, detail);
        }
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::connection(err.to_string()),
            other => Self::other(other.to_string()),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StorageErrorKind::UniqueViolation { constraint } => {
                write!(f, "unique violation on {:?}: {}", constraint, self.message)
            }
            StorageErrorKind::Connection => write!(f, "connection error: {}", self.message),
            StorageErrorKind::Other => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::connection(err.to_string()),
            other => Self::other(other.to_string()),
        }
    }
}
