//! Call frame events.

use alloy_primitives::{Address, Bytes, U256};
use revm::bytecode::opcode;

/// Kind of a call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `CALL`.
    Call,
    /// `CALLCODE`.
    CallCode,
    /// `DELEGATECALL`.
    DelegateCall,
    /// `STATICCALL`.
    StaticCall,
    /// `CREATE`.
    Create,
    /// `CREATE2`.
    Create2,
    /// `SELFDESTRUCT`.
    SelfDestruct,
}

impl FrameKind {
    /// Returns the frame kind opened by `op`, if it opens one.
    pub const fn from_opcode(op: u8) -> Option<Self> {
        match op {
            opcode::CALL => Some(Self::Call),
            opcode::CALLCODE => Some(Self::CallCode),
            opcode::DELEGATECALL => Some(Self::DelegateCall),
            opcode::STATICCALL => Some(Self::StaticCall),
            opcode::CREATE => Some(Self::Create),
            opcode::CREATE2 => Some(Self::Create2),
            opcode::SELFDESTRUCT => Some(Self::SelfDestruct),
            _ => None,
        }
    }

    /// Upper-case name, as used by the call tracer.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::CallCode => "CALLCODE",
            Self::DelegateCall => "DELEGATECALL",
            Self::StaticCall => "STATICCALL",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
            Self::SelfDestruct => "SELFDESTRUCT",
        }
    }

    /// Returns `true` for the message call kinds.
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call | Self::CallCode | Self::DelegateCall | Self::StaticCall)
    }

    /// Returns `true` for contract creations.
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    /// Returns `true` if the frame carries a value transfer.
    pub const fn transfers_value(&self) -> bool {
        matches!(self, Self::Call | Self::CallCode | Self::Create | Self::Create2 | Self::SelfDestruct)
    }
}

/// A frame being entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStart {
    /// Frame kind.
    pub kind: FrameKind,
    /// Caller.
    pub from: Address,
    /// Callee, or the created address.
    pub to: Address,
    /// Call data or init code.
    pub input: Bytes,
    /// Gas made available to the frame.
    pub gas: u64,
    /// Transferred value.
    pub value: U256,
}

/// A frame being left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameEnd {
    /// Return data.
    pub output: Bytes,
    /// Gas used by the frame.
    pub gas_used: u64,
    /// Error the frame ended with.
    pub error: Option<String>,
}

impl serde::Serialize for FrameKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
