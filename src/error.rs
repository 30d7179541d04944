use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::geometry::MapError;

/// Conditions caused by what the user asked for. The host shows them and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCondition {
    NoFolder,
    NoImages { folder: PathBuf },
    FirstImage,
    LastImage,
    NothingToDelete,
    NothingSelected,
    MultiSelect { count: usize },
}

impl fmt::Display for UserCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFolder => write!(f, "No folder is open!"),
            Self::NoImages { .. } => write!(f, "No images in this folder!"),
            Self::FirstImage => write!(f, "This is the first image!"),
            Self::LastImage => write!(f, "This is the last image!"),
            Self::NothingToDelete => write!(f, "There is no box to delete!"),
            Self::NothingSelected => write!(f, "Select a box in the list first!"),
            Self::MultiSelect { count } => {
                write!(f, "Only one box can be deleted at a time ({count} selected)!")
            }
        }
    }
}

/// Broken data: the current load must not proceed.
#[derive(Debug)]
pub enum IntegrityError {
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    IndexMisaligned {
        index: usize,
        len: usize,
    },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine { path, line, reason } => {
                write!(f, "malformed annotation at {path:?} line {line}: {reason}")
            }
            Self::IndexMisaligned { index, len } => {
                write!(f, "box index {index} out of range for {len} boxes")
            }
        }
    }
}

/// The filesystem or an image decoder let us down.
#[derive(Debug)]
pub enum ResourceError {
    FolderAccess { path: PathBuf, source: io::Error },
    SidecarDir { path: PathBuf, source: io::Error },
    SidecarIo { path: PathBuf, source: io::Error },
    ImageUnreadable { path: PathBuf, reason: String },
    Surface(MapError),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FolderAccess { path, source } => {
                write!(f, "cannot read image folder {path:?}: {source}")
            }
            Self::SidecarDir { path, source } => {
                write!(f, "cannot prepare annotation folder {path:?}: {source}")
            }
            Self::SidecarIo { path, source } => {
                write!(f, "io error at {path:?}: {source}")
            }
            Self::ImageUnreadable { path, reason } => {
                write!(f, "cannot read image {path:?}: {reason}")
            }
            Self::Surface(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug)]
pub enum AnnotateError {
    UserInput(UserCondition),
    DataIntegrity(IntegrityError),
    Resource(ResourceError),
}

impl AnnotateError {
    /// True for conditions the host should only display.
    pub fn is_user_condition(&self) -> bool {
        matches!(self, Self::UserInput(_))
    }

    pub fn user_condition(&self) -> Option<&UserCondition> {
        match self {
            Self::UserInput(condition) => Some(condition),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserInput(condition) => write!(f, "{condition}"),
            Self::DataIntegrity(err) => write!(f, "data integrity error: {err}"),
            Self::Resource(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AnnotateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resource(ResourceError::FolderAccess { source, .. })
            | Self::Resource(ResourceError::SidecarDir { source, .. })
            | Self::Resource(ResourceError::SidecarIo { source, .. }) => Some(source),
            Self::Resource(ResourceError::Surface(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<UserCondition> for AnnotateError {
    fn from(condition: UserCondition) -> Self {
        Self::UserInput(condition)
    }
}

impl From<IntegrityError> for AnnotateError {
    fn from(err: IntegrityError) -> Self {
        Self::DataIntegrity(err)
    }
}

impl From<ResourceError> for AnnotateError {
    fn from(err: ResourceError) -> Self {
        Self::Resource(err)
    }
}

impl From<MapError> for AnnotateError {
    fn from(err: MapError) -> Self {
        Self::Resource(ResourceError::Surface(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_conditions_are_flagged_for_display_only() {
        let err = AnnotateError::from(UserCondition::FirstImage);
        assert!(err.is_user_condition());
        assert_eq!(err.to_string(), "This is the first image!");

        let err = AnnotateError::from(IntegrityError::IndexMisaligned { index: 3, len: 2 });
        assert!(!err.is_user_condition());
        assert!(err.user_condition().is_none());
    }

    #[test]
    fn resource_errors_keep_their_io_source() {
        let err = AnnotateError::from(ResourceError::SidecarIo {
            path: PathBuf::from("x/easybox/a.jpg.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("a.jpg.txt"));
    }
}
