pub mod api;
pub mod http_client;

#[cfg(test)]
pub mod fake;
