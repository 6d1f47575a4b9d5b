//! Integration tests for the plugpack CLI.

mod common;
mod create;
mod verify;
