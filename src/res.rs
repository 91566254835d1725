#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Idempotent DDL for every table the service owns.
pub const SCHEMA: &str = include_res!(str, "/schema.sql");
