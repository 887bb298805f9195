//! Service behaviour against misbehaving ports, driven through `mockall`.
//!
//! - `dispatch_tests`: Gateway failures during multi-call card updates
//! - `webhook_tests`: Remote and store failures during registration

mod port_failures {
    pub mod mocks;

    mod dispatch_tests;
    mod webhook_tests;
}
