pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    AuthSettings, DeploymentEnvironment, HashingSettings, PostgresSettings, RedisSettings,
    SessionSettings,
};
