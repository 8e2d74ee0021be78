pub mod errors;
pub mod db;
pub mod config_item;

#[cfg(test)]
mod tests;
