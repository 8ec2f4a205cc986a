use thiserror::Error;

use crate::name::Name;
use crate::privacy::Nonce;

/// Contract violations of the privacy layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrivacyError {
    /// A delay flag was read or written for a (name, nonce) pair that was
    /// never recorded. Callers must insert a privacy entry for every private
    /// request before it reaches the lookup path.
    #[error("no privacy entry for ({name}, {nonce})")]
    NoSuchEntry { name: Name, nonce: Nonce },
}
