pub mod admin;
pub mod bootstrap;
pub mod hierarchy;
pub mod session;
