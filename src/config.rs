use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vitaltrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port, overridable with VITALTRACK_PORT.
pub const DEFAULT_PORT: u16 = 5000;

/// Frontend origin allowed by CORS, overridable with VITALTRACK_ORIGIN.
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,vitaltrack=debug".to_string()
}

/// Get the application data directory
/// ~/Vitaltrack/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vitaltrack")
}

/// Path of the service database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("vitaltrack.db")
}

/// Port to bind, from VITALTRACK_PORT or the default.
pub fn server_port() -> u16 {
    std::env::var("VITALTRACK_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Bind address. Loopback unless VITALTRACK_BIND says otherwise.
pub fn bind_address() -> IpAddr {
    std::env::var("VITALTRACK_BIND")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Origin the CORS layer allows, from VITALTRACK_ORIGIN or the default.
pub fn frontend_origin() -> String {
    std::env::var("VITALTRACK_ORIGIN").unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGIN.to_string())
}
