pub mod fetch;
pub mod output;
