/*! Integration tests for Nodal.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - node: Tests for the Node mapping contract, paths, roots and aliases
 * - behavior: Tests for the behavior chain and each concrete behavior
 * - attributes: Tests for attribute stores, change tracking and whitelists
 * - config: Tests for declarative node type configuration
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nodal=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod behavior;
mod config;
