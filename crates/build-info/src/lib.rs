/// Build identifier stamped at compile time: build timestamp plus git label
/// (e.g. "2025-10-05 15:47:12 UTC | v0.1.0-8a4f1d2").
pub fn build_id() -> &'static str {
    option_env!("FORMDROP_BUILD_ID").unwrap_or("unknown build")
}

/// Ready-to-log startup banner for a specific binary.
pub fn formatted_banner(package: &str, version: &str) -> String {
    format!("{} {} | {}", package, version, build_id())
}
