pub mod cookie;
pub mod jwt_codec;
