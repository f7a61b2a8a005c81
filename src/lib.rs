pub mod config;
pub mod format;

#[cfg(test)]
mod tests;
