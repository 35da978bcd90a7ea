//! # shopsync-transfer
//!
//! Filesystem side of the sync protocol: validation of the uploaded file,
//! extraction of sync archives into per-request scratch directories,
//! packing of outbound archives, scratch purging and the directory
//! listings served to the ERP client.

pub mod archive;
pub mod error;
pub mod listing;
pub mod packer;
pub mod scratch;
pub mod upload;

pub use archive::ArchiveTransfer;
pub use error::TransferError;
pub use upload::{UploadDescriptor, UploadErrorCode};
