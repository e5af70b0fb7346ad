//! Feature block composing the tagging atoms into admin-console workflows:
//! piece browsing with combined filters, the unassigned-image gallery, the
//! transformation-triad filter command and best-effort image removal.

pub mod gallery;
pub mod pieces;
pub mod removal;
pub mod types;
