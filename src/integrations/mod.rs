pub mod euclid;
pub mod graphql;

pub use euclid::{EuclidClient, EuclidGateway};
pub use graphql::GraphQlClient;
