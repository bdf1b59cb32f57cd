pub mod audit;
pub mod fcm_provider;
pub mod http_provider;
pub mod profiles;
pub mod provider;
pub mod ratelimit_store;
pub mod store;
pub mod template_store;
