//! Back end for the exam administration console.
//!
//! The two pieces of state the console edits live here as plain types, with
//! no UI framework attached:
//!
//! - [`wizard::WizardController`] drives a fixed sequence of steps over a single
//!   [`wizard::FormState`], with declarative per-step validation gating `advance`.
//!   [`question`] builds the six-step create-question-set wizard on top of it.
//! - [`permissions::PermissionTree`] holds a menu/submenu tree of action flags
//!   and toggles one flag at a time by index path.
//!
//! [`ipc`] exposes both to the front end as a line-delimited JSON sidecar,
//! persisting finished work through [`db`].

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod ipc;
pub mod permissions;
pub mod question;
pub mod wizard;
