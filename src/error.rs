//! Error types for mygit.
//!
//! Every failure in the core library is one of three kinds (see `ErrorKind`):
//! a user error (reported, operation skipped, process exits 0), a filesystem
//! fault (fatal, aborts the operation), or corruption (fatal, logged
//! critically). The CLI maps `Error::kind()` to the exit-code contract; it
//! never needs to string-match a message to decide how to behave.

use std::fmt;
use std::path::PathBuf;

use crate::infra::fs::FsError;

/// Which of the three error categories a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reported to the user; the operation is skipped; exit code 0.
    User,
    /// A filesystem fault; the operation aborts; exit code non-zero.
    FileSystem,
    /// Repository corruption; the operation aborts; exit code non-zero.
    Corruption,
}

/// The main error type for mygit operations.
#[derive(Debug)]
pub enum Error {
    /// A typed filesystem failure surfaced by the `Fs` interface.
    Fs(FsError),

    /// The current directory is not inside a mygit repository.
    NotARepository(PathBuf),

    /// A repository already exists at the specified path.
    AlreadyARepository(PathBuf),

    /// The named branch does not exist.
    BranchNotFound(String),

    /// The named branch already exists.
    BranchAlreadyExists(String),

    /// Cannot delete the currently checked out branch.
    CannotDeleteCurrentBranch,

    /// The working tree or index has uncommitted changes that block the
    /// requested operation.
    UncommittedChanges,

    /// Attempted to commit with nothing staged.
    EmptyCommit,

    /// A path named on the command line is ignored and was skipped.
    PathIgnored(String),

    /// A string is not a well-formed 40-character hex digest.
    InvalidDigest(String),

    /// A path named for staging does not exist and is not recorded in the
    /// last commit either.
    PathNotFound(String),

    /// Fast-forward merge is not possible: the current tip does not occur
    /// on the target branch's parent chain.
    FastForwardImpossible { target: String },

    /// The two branches being merged already point at the same commit.
    AlreadyUpToDate,

    /// An object referenced by digest does not exist in the store. This is
    /// an internal-reference failure (a tree/commit/manifest points at a
    /// digest that should be present) and signals repository corruption.
    ObjectNotFound(String),

    /// A checksum the user supplied directly (e.g. to `print`) does not
    /// name any stored object. Unlike `ObjectNotFound`, this is the user
    /// simply asking about a digest that was never recorded.
    UnknownChecksum(String),

    /// A reference (HEAD, branch tip) does not resolve to anything sensible.
    RefNotFound(String),

    /// Zlib decompression failed for the named object.
    DecompressionFailed(String),

    /// The content is not valid UTF-8 where UTF-8 was required.
    InvalidUtf8,

    /// A tree, manifest, commit, or index record is malformed.
    MalformedObject {
        /// digest or file identifying the bad record, if known
        locator: String,
        reason: String,
    },

    /// A tree contains two entries for the same path.
    DuplicatePath { tree: String, path: String },
}

impl Error {
    /// Classifies this error per the three-kind scheme.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fs(_) => ErrorKind::FileSystem,
            Error::NotARepository(_)
            | Error::AlreadyARepository(_)
            | Error::BranchNotFound(_)
            | Error::BranchAlreadyExists(_)
            | Error::CannotDeleteCurrentBranch
            | Error::UncommittedChanges
            | Error::EmptyCommit
            | Error::PathIgnored(_)
            | Error::InvalidDigest(_)
            | Error::PathNotFound(_)
            | Error::FastForwardImpossible { .. }
            | Error::AlreadyUpToDate
            | Error::RefNotFound(_)
            | Error::UnknownChecksum(_) => ErrorKind::User,
            Error::ObjectNotFound(_)
            | Error::DecompressionFailed(_)
            | Error::InvalidUtf8
            | Error::MalformedObject { .. }
            | Error::DuplicatePath { .. } => ErrorKind::Corruption,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fs(e) => write!(f, "{}", e),
            Error::NotARepository(path) => {
                write!(f, "not a mygit repository: {}", path.display())
            }
            Error::AlreadyARepository(path) => {
                write!(f, "repository already exists: {}", path.display())
            }
            Error::BranchNotFound(name) => write!(f, "branch not found: {}", name),
            Error::BranchAlreadyExists(name) => write!(f, "branch already exists: {}", name),
            Error::CannotDeleteCurrentBranch => write!(f, "cannot delete the current branch"),
            Error::UncommittedChanges => write!(f, "working tree has uncommitted changes"),
            Error::EmptyCommit => write!(f, "nothing staged, nothing to commit"),
            Error::PathIgnored(path) => write!(f, "path is ignored: {}", path),
            Error::InvalidDigest(s) => write!(f, "invalid digest: {}", s),
            Error::PathNotFound(path) => {
                write!(f, "path does not exist and is not recorded: {}", path)
            }
            Error::FastForwardImpossible { target } => write!(
                f,
                "possible conflicts, fast-forward impossible merging {}",
                target
            ),
            Error::AlreadyUpToDate => write!(f, "already up to date"),
            Error::ObjectNotFound(digest) => write!(f, "object not found: {}", digest),
            Error::UnknownChecksum(digest) => write!(f, "unknown checksum: {}", digest),
            Error::RefNotFound(name) => write!(f, "reference not found: {}", name),
            Error::DecompressionFailed(locator) => {
                write!(f, "zlib decompression failed for {}", locator)
            }
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            Error::MalformedObject { locator, reason } => {
                write!(f, "malformed object {}: {}", locator, reason)
            }
            Error::DuplicatePath { tree, path } => {
                write!(f, "duplicate path in tree {}: {}", tree, path)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Fs(e) => e.source(),
            _ => None,
        }
    }
}

impl From<FsError> for Error {
    fn from(e: FsError) -> Self {
        Error::Fs(e)
    }
}

/// Result type alias for mygit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Error::EmptyCommit.kind(), ErrorKind::User);
        assert_eq!(
            Error::ObjectNotFound("abc".into()).kind(),
            ErrorKind::Corruption
        );
        assert_eq!(
            Error::UnknownChecksum("abc".into()).kind(),
            ErrorKind::User
        );
        assert_eq!(
            Error::Fs(FsError::NotFound("x".into())).kind(),
            ErrorKind::FileSystem
        );
    }

    #[test]
    fn test_error_display() {
        let error = Error::BranchNotFound("dev".to_string());
        assert_eq!(error.to_string(), "branch not found: dev");

        let error = Error::FastForwardImpossible {
            target: "dev".to_string(),
        };
        assert!(error.to_string().contains("fast-forward impossible"));
    }

    #[test]
    fn test_all_error_variants_display_without_panicking() {
        let errors: Vec<Error> = vec![
            Error::Fs(FsError::NotFound("x".into())),
            Error::NotARepository(PathBuf::from("/test")),
            Error::AlreadyARepository(PathBuf::from("/test")),
            Error::BranchNotFound("dev".into()),
            Error::BranchAlreadyExists("dev".into()),
            Error::CannotDeleteCurrentBranch,
            Error::UncommittedChanges,
            Error::EmptyCommit,
            Error::PathIgnored("x".into()),
            Error::InvalidDigest("x".into()),
            Error::PathNotFound("x".into()),
            Error::FastForwardImpossible { target: "dev".into() },
            Error::AlreadyUpToDate,
            Error::ObjectNotFound("abc".into()),
            Error::UnknownChecksum("abc".into()),
            Error::RefNotFound("master".into()),
            Error::DecompressionFailed("abc".into()),
            Error::InvalidUtf8,
            Error::MalformedObject {
                locator: "abc".into(),
                reason: "bad".into(),
            },
            Error::DuplicatePath {
                tree: "abc".into(),
                path: "x".into(),
            },
        ];
        for error in &errors {
            let _ = error.to_string();
            let _ = format!("{:?}", error);
        }
    }
}
