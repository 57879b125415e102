pub mod assessment;
pub mod message;
pub mod response;
