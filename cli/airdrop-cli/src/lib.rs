pub mod build_tree;
pub mod claim;
pub mod common;
pub mod digest;
pub mod verify;

pub use common::{
    hex_encode, parse_address, parse_amount, parse_hash, validate_merkle_root, write_file_atomic,
    ClaimFile, DomainArgs, TreeEntry, TreeFile,
};
