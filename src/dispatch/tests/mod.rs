//! Unit tests for the action dispatch context.
