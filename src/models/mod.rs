pub mod automation;
pub mod niche;
pub mod product;
pub mod profit;
pub mod revenue;
pub mod sale;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
