pub mod fixtures;
pub mod mock_gateway;

pub use fixtures::{draft_with, payload};
pub use mock_gateway::MockGateway;
