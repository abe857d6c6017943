//! Tests combining several modules of the crate.

mod recursion;
