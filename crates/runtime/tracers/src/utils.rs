//! Helpers shared by the tracers.

use alloy_primitives::{Address, B256, Bytes, U256};
use revm::bytecode::opcode::OpCode;
use zkr_executor::Step;

/// Returns the mnemonic of `op`.
pub fn opcode_name(op: u8) -> String {
    OpCode::new(op)
        .map(|opcode| opcode.as_str().to_string())
        .unwrap_or_else(|| format!("opcode {op:#04x} not defined"))
}

/// Returns `true` for the precompiled contracts at `0x01..=0x09`.
pub fn is_precompile(address: &Address) -> bool {
    let bytes = address.as_slice();
    bytes[..19].iter().all(|byte| *byte == 0) && (1..=9).contains(&bytes[19])
}

/// Returns the `n`-th stack item counted from the top.
pub(crate) fn stack_peek(step: &Step, n: usize) -> Option<U256> {
    step.stack.len().checked_sub(n + 1).map(|index| step.stack[index])
}

/// Interprets a stack word as an address.
pub(crate) fn word_to_address(word: U256) -> Address {
    Address::from_word(B256::from(word.to_be_bytes::<32>()))
}

/// Interprets a stack word as a storage slot.
pub(crate) fn word_to_slot(word: U256) -> B256 {
    B256::from(word.to_be_bytes::<32>())
}

/// Largest memory slice handed to tracers.
const MAX_MEMORY_SLICE: u64 = 1 << 20;

/// Reads `length` bytes at `offset` from the step's memory snapshot.
///
/// Bytes outside the snapshot read as zero.
pub(crate) fn memory_slice(step: &Step, offset: U256, length: U256) -> Bytes {
    let (Ok(offset), Ok(length)) = (u64::try_from(offset), u64::try_from(length)) else {
        return Bytes::new();
    };
    if length > MAX_MEMORY_SLICE || offset.checked_add(length).is_none() {
        return Bytes::new();
    }
    let mut out = vec![0u8; length as usize];
    for (i, byte) in out.iter_mut().enumerate() {
        let Some(position) = (offset + i as u64).checked_sub(step.memory_offset) else {
            continue;
        };
        if let Some(value) = step.memory.get(position as usize) {
            *byte = *value;
        }
    }
    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, "STOP")]
    #[case(0x60, "PUSH1")]
    #[case(0xf1, "CALL")]
    #[case(0x0c, "opcode 0x0c not defined")]
    fn test_opcode_name(#[case] op: u8, #[case] expected: &str) {
        assert_eq!(opcode_name(op), expected);
    }

    #[test]
    fn test_is_precompile() {
        assert!(is_precompile(&Address::with_last_byte(1)));
        assert!(is_precompile(&Address::with_last_byte(9)));
        assert!(!is_precompile(&Address::ZERO));
        assert!(!is_precompile(&Address::with_last_byte(10)));
        assert!(!is_precompile(&Address::repeat_byte(1)));
    }

    #[test]
    fn test_memory_slice_and_stack() {
        let step = Step {
            stack: vec![U256::from(1), U256::from(2)],
            memory: Bytes::from_static(&[0xaa, 0xbb, 0xcc]),
            memory_offset: 32,
            ..Default::default()
        };
        assert_eq!(stack_peek(&step, 0), Some(U256::from(2)));
        assert_eq!(stack_peek(&step, 1), Some(U256::from(1)));
        assert_eq!(stack_peek(&step, 2), None);
        assert_eq!(
            memory_slice(&step, U256::from(33), U256::from(3)),
            Bytes::from_static(&[0xbb, 0xcc, 0x00])
        );
        assert_eq!(memory_slice(&step, U256::from(31), U256::from(2)), Bytes::from_static(&[0, 0xaa]));
    }
}
