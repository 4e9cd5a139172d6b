#![forbid(unsafe_code)]

pub mod ids;
pub mod model;
pub mod org;
pub mod role;
pub mod scope;
pub mod status;
