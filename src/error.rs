use crate::{EmitterError, RepresentError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Emit(#[from] EmitterError),
    #[error(transparent)]
    Represent(#[from] RepresentError),
}

impl PartialEq<EmitterError> for Error {
    fn eq(&self, other: &EmitterError) -> bool {
        if let Error::Emit(err) = self {
            *err == *other
        } else {
            false
        }
    }
}

impl PartialEq<RepresentError> for Error {
    fn eq(&self, other: &RepresentError) -> bool {
        if let Error::Represent(err) = self {
            *err == *other
        } else {
            false
        }
    }
}
