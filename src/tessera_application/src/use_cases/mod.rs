pub mod change_password;
pub mod email_change;
pub mod email_verification;
pub mod password_reset;
pub mod register;
