//! Report emitters.
//!
//! Every emitter is a pure function of the same `AuditReport`, so the
//! narrative, structured and console outputs cannot disagree.

pub mod console;
pub mod narrative;
pub mod structured;

pub use console::format_console;
pub use narrative::{NarrativeOptions, render_narrative};
pub use structured::{KindBreakdown, StructuredReport};
