pub mod judgeme;

pub use judgeme::{JudgeMeClient, ShopCredentials, UpstreamError};
