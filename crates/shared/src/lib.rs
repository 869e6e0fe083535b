pub mod domain;
pub mod error;
pub mod record;

pub use domain::RecordId;
pub use error::{CartError, ControllerError, ErrorCode};
pub use record::Record;
