//! Unit tests for the webhook lifecycle context.
