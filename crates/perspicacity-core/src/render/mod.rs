//! Incremental answer rendering
//!
//! Turns a terminal payload into formatted markup and reveals it word by
//! word on the display surface.

pub mod citations;
pub mod markup;
pub mod reveal;
pub mod scroll;
pub mod sources;
pub mod tab;
pub mod text;

pub use citations::CitationIndex;
pub use markup::{HtmlMarkup, Markup};
pub use reveal::{PreparedAnswer, RevealOutcome, RevealSink, Renderer};
pub use scroll::ScrollFollow;
pub use sources::SourceCard;
pub use tab::Tab;
pub use text::{clean_step, copy_text, strip_boilerplate};
