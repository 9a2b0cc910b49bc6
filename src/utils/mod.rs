pub mod paths;
pub mod validation;
