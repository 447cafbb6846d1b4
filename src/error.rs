use std::{error, fmt, io};

/// The host virtual-memory manager refused to create a mapping.
///
/// This is the only failure callers are expected to branch on. Contract
/// violations (bad alignment) panic instead of returning a value.
#[derive(Debug)]
pub enum MapError {
  /// The initial `PROT_NONE` reservation could not be created.
  ReserveFailed(io::Error),
  /// The final read/write mapping over the reservation could not be
  /// created. The reservation has already been released; no address space
  /// leaks.
  MapFailed(io::Error),
}

impl fmt::Display for MapError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      MapError::ReserveFailed(err) => {
        write!(f, "failed to reserve address space: {}", err)
      }
      MapError::MapFailed(err) => write!(f, "failed to map region: {}", err),
    }
  }
}

impl error::Error for MapError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      MapError::ReserveFailed(err) | MapError::MapFailed(err) => Some(err),
    }
  }
}
