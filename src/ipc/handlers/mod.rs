pub mod core;
pub mod permissions;
pub mod question_sets;
pub mod session;
pub mod setup;
pub mod wizard;
