//! Transaction encoding inside a batch payload.

use crate::{BatchCodecError, MAX_EFFECTIVE_PERCENTAGE};
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_primitives::{Bytes, Signature, TxKind, U256};
use alloy_rlp::{Decodable, Encodable, Header};
use zkr_primitives::{FORK_ID_DRAGONFRUIT, L2Transaction};

const R_LENGTH: usize = 32;
const S_LENGTH: usize = 32;
const V_LENGTH: usize = 1;
const SIGNATURE_LENGTH: usize = R_LENGTH + S_LENGTH + V_LENGTH;
const EFFECTIVE_PERCENTAGE_LENGTH: usize = 1;

/// `v` of a signature with an even y-parity, as written in the payload.
const LEGACY_V_BASE: u8 = 27;

const RLP_LIST_OFFSET: u8 = 0xc0;
const RLP_LONG_LIST_OFFSET: u8 = 0xf7;

/// A transaction decoded from a batch payload together with its effective gas price
/// percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    /// The signed transaction.
    pub tx: L2Transaction,
    /// Effective gas price percentage the sequencer charged the transaction with.
    pub efficiency_percentage: u8,
}

impl RawTransaction {
    /// Creates a new [`RawTransaction`].
    pub const fn new(tx: L2Transaction, efficiency_percentage: u8) -> Self {
        Self { tx, efficiency_percentage }
    }
}

/// Encodes `transactions` into a flat batch payload.
///
/// The percentage byte following each transaction is only written from
/// [`FORK_ID_DRAGONFRUIT`] on.
pub fn encode_transactions(
    transactions: &[L2Transaction],
    percentages: &[u8],
    fork_id: u64,
) -> Result<Bytes, BatchCodecError> {
    if transactions.len() != percentages.len() {
        return Err(BatchCodecError::LengthMismatch {
            transactions: transactions.len(),
            percentages: percentages.len(),
        });
    }

    let with_percentage = fork_id >= FORK_ID_DRAGONFRUIT;
    let mut out = Vec::new();
    for (tx, percentage) in transactions.iter().zip(percentages) {
        encode_transaction(&mut out, tx, with_percentage.then_some(*percentage));
    }
    Ok(out.into())
}

/// Decodes a flat batch payload into its transactions.
pub fn decode_transactions(
    data: &[u8],
    fork_id: u64,
) -> Result<Vec<RawTransaction>, BatchCodecError> {
    let with_percentage = fork_id >= FORK_ID_DRAGONFRUIT;
    let mut transactions = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (raw, next) = decode_transaction(data, pos, with_percentage)?;
        transactions.push(raw);
        pos = next;
    }
    Ok(transactions)
}

pub(crate) fn encode_transaction(out: &mut Vec<u8>, tx: &L2Transaction, percentage: Option<u8>) {
    let unsigned = tx.tx();
    let mut payload = Vec::new();
    unsigned.nonce.encode(&mut payload);
    unsigned.gas_price.encode(&mut payload);
    unsigned.gas_limit.encode(&mut payload);
    unsigned.to.encode(&mut payload);
    unsigned.value.encode(&mut payload);
    unsigned.input.encode(&mut payload);
    if let Some(chain_id) = unsigned.chain_id {
        chain_id.encode(&mut payload);
        0u8.encode(&mut payload);
        0u8.encode(&mut payload);
    }

    Header { list: true, payload_length: payload.len() }.encode(out);
    out.extend_from_slice(&payload);

    let signature = tx.signature();
    out.extend_from_slice(&signature.r().to_be_bytes::<32>());
    out.extend_from_slice(&signature.s().to_be_bytes::<32>());
    out.push(LEGACY_V_BASE + u8::from(signature.v()));
    if let Some(percentage) = percentage {
        out.push(percentage);
    }
}

/// Decodes the transaction starting at `pos`, returning it with the offset of the next item.
pub(crate) fn decode_transaction(
    data: &[u8],
    pos: usize,
    with_percentage: bool,
) -> Result<(RawTransaction, usize), BatchCodecError> {
    let invalid = || BatchCodecError::InvalidData { position: pos };

    let first = *data.get(pos).ok_or_else(invalid)?;
    if first < RLP_LIST_OFFSET {
        return Err(invalid());
    }

    let rlp_length = if first > RLP_LONG_LIST_OFFSET {
        let length_of_length = usize::from(first - RLP_LONG_LIST_OFFSET);
        if length_of_length > size_of::<u64>() {
            return Err(invalid());
        }
        let length_bytes = data.get(pos + 1..pos + 1 + length_of_length).ok_or_else(invalid)?;
        let payload_length =
            length_bytes.iter().try_fold(0usize, |acc, byte| {
                acc.checked_mul(256).and_then(|acc| acc.checked_add(usize::from(*byte)))
            });
        payload_length
            .and_then(|len| len.checked_add(1 + length_of_length))
            .ok_or_else(invalid)?
    } else {
        1 + usize::from(first - RLP_LIST_OFFSET)
    };

    let trailer = SIGNATURE_LENGTH + if with_percentage { EFFECTIVE_PERCENTAGE_LENGTH } else { 0 };
    let data_start = pos.checked_add(rlp_length).ok_or_else(invalid)?;
    let end = data_start.checked_add(trailer).ok_or_else(invalid)?;
    if end > data.len() {
        return Err(invalid());
    }

    let unsigned = decode_legacy_fields(&data[pos..data_start])?;

    let signature = &data[data_start..data_start + SIGNATURE_LENGTH];
    let r = U256::from_be_slice(&signature[..R_LENGTH]);
    let s = U256::from_be_slice(&signature[R_LENGTH..R_LENGTH + S_LENGTH]);
    let y_parity = match signature[R_LENGTH + S_LENGTH] {
        27 => false,
        28 => true,
        v => return Err(BatchCodecError::InvalidSignature(v)),
    };

    let efficiency_percentage =
        if with_percentage { data[end - EFFECTIVE_PERCENTAGE_LENGTH] } else { MAX_EFFECTIVE_PERCENTAGE };

    let tx = unsigned.into_signed(Signature::new(r, s, y_parity));
    Ok((RawTransaction::new(tx, efficiency_percentage), end))
}

fn decode_legacy_fields(rlp: &[u8]) -> Result<TxLegacy, BatchCodecError> {
    let mut buf = rlp;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString.into());
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }

    let mut payload = &buf[..header.payload_length];
    let nonce = u64::decode(&mut payload)?;
    let gas_price = u128::decode(&mut payload)?;
    let gas_limit = u64::decode(&mut payload)?;
    let to = TxKind::decode(&mut payload)?;
    let value = U256::decode(&mut payload)?;
    let input = Bytes::decode(&mut payload)?;

    // EIP-155 transactions append `chainId, 0, 0`.
    let chain_id = if payload.is_empty() {
        None
    } else {
        let chain_id = u64::decode(&mut payload)?;
        u64::decode(&mut payload)?;
        u64::decode(&mut payload)?;
        (chain_id != 0).then_some(chain_id)
    };

    Ok(TxLegacy { chain_id, nonce, gas_price, gas_limit, to, value, input })
}
