use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Daemon configuration. `CONTROLLER_IP`/`CONTROLLER_PORT` are compile-time
/// constants in the original; here they're `Default`-constructible fields an
/// embedder can override, following the pack's config-struct-with-sane-
/// `Default` convention.
#[derive(Debug, Clone)]
pub struct Config {
	pub controller_addr: SocketAddr,
	/// `MaxNumFilters`: the size of the filter-id-indexed slot table.
	pub num_filters: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			controller_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 7117),
			num_filters: 64,
		}
	}
}
