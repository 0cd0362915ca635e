// Internal modules - all access should go through api module
pub(crate) mod manager;

// Public API module - the only public interface for the subscriber map
pub mod api;

#[cfg(test)]
mod tests;
