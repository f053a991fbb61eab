//! Example sessions used by itembind demos.

/// Scripted pointer sessions against the widgets.
pub mod tracegym;
