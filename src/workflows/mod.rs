pub mod extract;
pub mod scrape;
