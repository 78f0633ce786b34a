//! Response bodies for the JSON endpoints.

pub mod response;
