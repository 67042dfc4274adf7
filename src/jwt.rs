pub mod ecdsa;
pub mod error;
pub mod header;
pub mod signed;
pub mod signer;
