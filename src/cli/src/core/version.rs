pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// `User-Agent` sent with every request.
pub fn user_agent() -> String {
    format!("probe/{}", app_version())
}
