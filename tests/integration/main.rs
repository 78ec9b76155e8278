//! Integration tests: live server over real WebSockets plus HTTP routes.

mod helpers;
mod http_test;
mod ws_test;
