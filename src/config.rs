mod loader;
mod paths;
mod refresh;
mod types;

pub use paths::get_config_path;
pub use refresh::{ConfigRefresher, EndpointSource};
pub use types::{Config, EndpointConfig, Page};
