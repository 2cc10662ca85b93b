use crate::Prompt;

pub const CHAIN_DELIMITER: char = '~';

/// Splits a chain on `~`, trimming each segment and dropping the empty ones.
pub fn split_chain(chain: &str) -> Vec<Prompt> {
    chain.split(CHAIN_DELIMITER).filter_map(Prompt::parse).collect()
}
