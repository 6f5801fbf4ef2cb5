//! Workflows over the console's pages.
//!
//! Each flow takes a [`Page`](pagewright_core::page::Page) and returns an
//! [`Interaction`](pagewright_core::error::Interaction); the binary decides
//! what a failure means for the exit code.

pub mod gift;
pub mod login;
