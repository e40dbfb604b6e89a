pub mod email;
pub mod identity;
pub mod ids;
pub mod password;
pub mod password_policy;
pub mod session;
pub mod tenant;
pub mod token;
