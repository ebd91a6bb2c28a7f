//! Public library API for reading and writing GFF 4.x structured binary documents.

/// GFF container parsing, schema model, and the dynamic and typed marshalling engines.
pub mod gff;
