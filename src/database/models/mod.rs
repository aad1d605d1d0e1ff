pub mod present;

pub use present::Present;
