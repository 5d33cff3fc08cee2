#![warn(clippy::pedantic)]

#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod wger;

pub use local_storage::LocalStorage;
pub use wger::{GlooNetSendRequest, SendRequest, Wger};

#[cfg(test)]
mod tests {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub mod data;
}
