pub mod num;
pub mod serde_utils;
pub mod time;
