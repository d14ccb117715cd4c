mod health;
mod root;
mod url;

pub use health::health_handler;
pub use root::root_handler;
pub use url::{create_url_handler, get_url_handler, lookup_url_handler};
