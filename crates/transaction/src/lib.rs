#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Transaction engine for txflow
//!
//! A runner executes a plan of install, update and uninstall operations and
//! reports back through callbacks. This crate sits on the other side of
//! those callbacks: it maps operations to the host's apps, drives each app
//! through its state machine, folds per-operation byte counts into per-app
//! percentages across related operations, and decides how errors affect
//! the rest of the session.
//!
//! Everything runs on the thread that calls [`Transaction::run`]; apps are
//! shared as `Rc` handles and the session is never `Send`.

mod graph;
mod lifecycle;
pub mod operation;
pub mod progress;
pub mod resolver;
pub mod runner;
mod session;
pub mod sim;

pub use graph::related_download_size;
pub use lifecycle::FailedOperation;
pub use operation::{EndOfLife, OperationGraph, OperationId, OperationResult, ProgressReport};
pub use progress::weighted_percent;
pub use resolver::{NoFallback, RefCache, RefResolver};
pub use runner::{PlanEditor, TransactionHandler, TransactionRunner};
pub use session::{ErrorOperation, Transaction, TransactionOptions};
