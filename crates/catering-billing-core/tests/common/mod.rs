//! Common test utilities for catering-billing-core integration tests

pub mod fake_gateway;
pub mod mock_repos;

#[allow(unused_imports)]
pub use fake_gateway::FakeGateway;
#[allow(unused_imports)]
pub use mock_repos::{MockMealPlanRepository, MockSubscriptionRepository};
