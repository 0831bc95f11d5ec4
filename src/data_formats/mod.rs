mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::Deserialize;

/// Listings are paged externally with a fixed page size; `?page=N` is the
/// only knob a client gets.
#[derive(Deserialize, Debug)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}
