//! mint integration tests.

mod support;
mod pages;
mod forms;
mod security;
mod transactions;

#[cfg(feature = "http")]
mod http;
