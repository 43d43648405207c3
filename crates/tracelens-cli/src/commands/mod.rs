pub mod eval;
pub mod load;
pub mod walk;

#[cfg(test)]
mod test_utils;
