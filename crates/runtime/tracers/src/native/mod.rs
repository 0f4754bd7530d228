//! Native tracers.

mod four_byte;
pub use four_byte::FourByteTracer;

mod call;
pub use call::{CallFrame, CallLog, CallTracer, CallTracerConfig};

mod flat_call;
pub use flat_call::{FlatCallTracer, FlatCallTracerConfig};

mod noop;
pub use noop::NoopTracer;

mod prestate;
pub use prestate::{PrestateTracer, PrestateTracerConfig};
