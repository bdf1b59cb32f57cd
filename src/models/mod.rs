pub mod audit;
pub mod bulk;
pub mod channel;
pub mod notification;
pub mod ratelimit;
pub mod recipient;
pub mod template;
pub mod validation;
