pub mod preview_env;
pub mod traffic_policy;
