//! DTOs for the message endpoint.

use serde::Deserialize;
use validator::Validate;

/// A chat message to extract product links from.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageRequest {
    #[validate(length(min = 1, max = 4096, message = "Message text must be 1 to 4096 characters"))]
    pub text: String,
}
