pub mod jwt;
pub mod password;
pub mod signature;
pub mod validation;
