//! Integration tests for Reelview
//!
//! These tests run the TMDB client, the cached repository and the screen
//! controllers against a local fixture server speaking the v3 API.

#[path = "integration/client_requests.rs"]
mod client_requests;

#[path = "integration/screen_flows.rs"]
mod screen_flows;
