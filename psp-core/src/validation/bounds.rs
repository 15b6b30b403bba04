//! Record block bounds validation
//!
//! Pure overflow-checked arithmetic for the byte range a component's
//! records occupy.

use crate::{PspError, Result};

/// Byte length of `count` records of `stride` bytes
pub fn block_len(count: u32, stride: usize) -> Result<usize> {
    (count as usize)
        .checked_mul(stride)
        .ok_or(PspError::SizeOverflow)
}

/// Validate that a record block lies inside a source of `source_len` bytes
///
/// Returns the exclusive end offset of the block.
pub fn validate_block(
    data_offset: usize,
    count: u32,
    stride: usize,
    source_len: usize,
) -> Result<usize> {
    let len = block_len(count, stride)?;
    let end = data_offset
        .checked_add(len)
        .ok_or(PspError::SizeOverflow)?;
    if end > source_len {
        let available = source_len.saturating_sub(data_offset);
        return Err(PspError::TruncatedInput {
            offset: data_offset,
            needed: len,
            available,
        });
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_len() {
        assert_eq!(block_len(3, 44), Ok(132));
        assert_eq!(block_len(0, 44), Ok(0));
    }

    #[test]
    fn test_validate_block() {
        assert_eq!(validate_block(16, 2, 10, 36), Ok(36));
        assert_eq!(validate_block(36, 0, 10, 36), Ok(36));
        assert_eq!(
            validate_block(16, 3, 10, 36),
            Err(PspError::TruncatedInput {
                offset: 16,
                needed: 30,
                available: 20
            })
        );
        assert_eq!(
            validate_block(usize::MAX - 4, 1, 10, 36),
            Err(PspError::SizeOverflow)
        );
    }
}
