//! From raw validator output to a single report.
//!
//! - [`decoder`] reads raw output line by line
//! - [`assembler`] attaches validator ids and severities, merging composite
//!   children under their parent
//! - [`aggregate`] holds the sorted offenses, failures and coverage of a run

pub mod aggregate;
pub mod assembler;
pub mod decoder;
pub mod offense;

pub use aggregate::{AggregateResult, Coverage, SeverityCounts};
pub use assembler::ResultAssembler;
pub use decoder::{
    DecodeError, Decoder, DecoderRegistry, GenericLineDecoder, QueryDecoder, WarningDecoder,
};
pub use offense::{DecodedLine, Offense};
