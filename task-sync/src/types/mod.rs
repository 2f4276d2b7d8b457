pub mod response;

pub use response::OperationResult;
