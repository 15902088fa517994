//! Test modules for the scanner
//!
//! Filesystem-backed tests; parser and filter unit tests live next to
//! their code.

mod helpers;
