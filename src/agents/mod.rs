//! Agent System
//!
//! The agents behind the water-quality assistant:
//!
//! - **In-House Search Agent**: answers from the local PDF knowledge base
//! - **Web Search Agent**: collects web evidence through the search tool
//! - **Summarizer Agent**: merges everything into one structured answer
//! - **Introspection Agent**: turns user feedback into stored reflections
//! - **Coordinator**: runs the others in order and owns the feedback loop
//!
//! ## Pipeline Overview
//!
//! ```text
//! User Query
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Coordinator │  → Loads recent reflections, analyzes intent
//! └─────────────┘
//!      │
//!      ├──────────────► In-House Search ──┐
//!      │                                  │
//!      └──────────────► Web Search ───────┤
//!                                         ▼
//!                                 ┌─────────────┐
//!                                 │  Reasoning  │
//!                                 └─────────────┘
//!                                         │
//!                                         ▼
//!                                 ┌─────────────┐
//!                                 │ Summarizer  │  → Answer
//!                                 └─────────────┘
//!
//! Feedback ─► Introspection ─► reflections table ─► next turn's prompts
//! ```

pub mod coordinator;
pub mod inhouse;
pub mod introspection;
pub mod summarizer;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main components
pub use coordinator::{build_inhouse_agent, Coordinator, CoordinatorParts, Feedback, Session, Turn, HELPFUL_FEEDBACK};
pub use inhouse::{InHouseSearchAgent, NO_RELEVANT_DOCUMENTS};
pub use introspection::{parse_reflection, IntrospectionAgent, ParsedReflection, ReflectionInput};
pub use summarizer::{detect_requested_lines, enforce_line_limit, SummarizerAgent, SummaryInput};
pub use web::{WebContext, WebSearchAgent, WebSearchOutput};
