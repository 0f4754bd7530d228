//! Trace configuration supplied by the caller.

use crate::{StructLoggerConfig, TracerError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use zkr_executor::TraceCaptureConfig;

/// The closed set of tracers a trace can be produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracerKind {
    /// Struct logger reading the executor's own trace.
    StructLog,
    /// Function selector counter.
    FourByte,
    /// Nested call graph.
    Call,
    /// Parity-style flat call list.
    FlatCall,
    /// Tracer producing an empty object.
    Noop,
    /// Accounts touched by the transaction.
    Prestate,
    /// User supplied JavaScript tracer.
    Script(String),
}

impl TracerKind {
    /// Name of the four-byte tracer.
    pub const FOUR_BYTE: &'static str = "4byteTracer";
    /// Name of the call tracer.
    pub const CALL: &'static str = "callTracer";
    /// Name of the flat call tracer.
    pub const FLAT_CALL: &'static str = "flatCallTracer";
    /// Name of the noop tracer.
    pub const NOOP: &'static str = "noopTracer";
    /// Name of the prestate tracer.
    pub const PRESTATE: &'static str = "prestateTracer";

    /// Selects a tracer by name. Names that are not built-in are treated as scripts.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") => Self::StructLog,
            Some(Self::FOUR_BYTE) => Self::FourByte,
            Some(Self::CALL) => Self::Call,
            Some(Self::FLAT_CALL) => Self::FlatCall,
            Some(Self::NOOP) => Self::Noop,
            Some(Self::PRESTATE) => Self::Prestate,
            Some(code) => Self::Script(code.to_string()),
        }
    }

    /// Returns `true` for the struct logger.
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::StructLog)
    }

    /// Short label used in logs and metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StructLog => "structLogger",
            Self::FourByte => Self::FOUR_BYTE,
            Self::Call => Self::CALL,
            Self::FlatCall => Self::FLAT_CALL,
            Self::Noop => Self::NOOP,
            Self::Prestate => Self::PRESTATE,
            Self::Script(_) => "jsTracer",
        }
    }
}

/// Tracer selection and capture toggles of a debug request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TraceConfig {
    /// Tracer name or script. `None` selects the struct logger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracer: Option<String>,
    /// Tracer-specific configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracer_config: Option<serde_json::Value>,
    /// Skip storage in struct logs.
    pub disable_storage: bool,
    /// Skip the stack in struct logs.
    pub disable_stack: bool,
    /// Include memory in struct logs.
    pub enable_memory: bool,
    /// Include return data in struct logs.
    pub enable_return_data: bool,
    /// Maximum number of entries returned by the flat call tracer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl TraceConfig {
    /// Returns the selected tracer.
    pub fn kind(&self) -> TracerKind {
        TracerKind::from_name(self.tracer.as_deref())
    }

    /// Returns `true` if the struct logger is selected.
    pub fn is_default_tracer(&self) -> bool {
        self.kind().is_default()
    }

    /// Returns what the executor has to capture for this request.
    ///
    /// Capture is maximal unless the struct logger is selected, in which case the caller's
    /// toggles narrow it.
    pub fn capture_config(&self) -> TraceCaptureConfig {
        if !self.is_default_tracer() {
            return TraceCaptureConfig::FULL;
        }
        TraceCaptureConfig {
            disable_storage: self.disable_storage,
            disable_stack: self.disable_stack,
            enable_memory: self.enable_memory,
            enable_return_data: self.enable_return_data,
        }
    }

    /// Returns the struct logger settings of the request.
    pub const fn struct_logger_config(&self) -> StructLoggerConfig {
        StructLoggerConfig {
            disable_storage: self.disable_storage,
            disable_stack: self.disable_stack,
            enable_memory: self.enable_memory,
            enable_return_data: self.enable_return_data,
        }
    }
}

/// Parses a tracer-specific configuration, falling back to its default when absent.
pub(crate) fn parse_tracer_config<T>(config: Option<&serde_json::Value>) -> Result<T, TracerError>
where
    T: DeserializeOwned + Default,
{
    match config {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|err| TracerError::InvalidConfig(err.to_string())),
    }
}
