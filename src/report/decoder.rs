//! Decoders turn raw validator output into offense data, one line at a time.
//!
//! Decoders are registered explicitly by validator id or by category.
//! Anything without a registration is read by the generic
//! `path:line[:col]: message` decoder.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;

use super::offense::DecodedLine;
use crate::validators::{Execution, ValidatorId, ValidatorRegistry};

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(RE_GENERIC, r"^(.+?):(\d+)(?::\d+)?:\s*(.+)$");
lazy_regex!(
    RE_WARNING,
    r"^\[warn\]:\s*(.+?)\s+in file `([^`]+)` near line (\d+)\s*$"
);

/// A line that looked like output but could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// Decodes one line of raw output.
pub trait Decoder {
    /// `Ok(None)` for lines that carry no offense (blank lines, summaries).
    fn decode(&self, line: &str) -> Result<Option<DecodedLine>, DecodeError>;
}

fn parse_line_number(raw: &str) -> Result<usize, DecodeError> {
    raw.parse()
        .map_err(|_| DecodeError(format!("invalid line number '{}'", raw)))
}

/// Reads `path:line[:col]: message`; other lines are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericLineDecoder;

impl Decoder for GenericLineDecoder {
    fn decode(&self, line: &str) -> Result<Option<DecodedLine>, DecodeError> {
        let Some(caps) = RE_GENERIC.captures(line.trim_end()) else {
            return Ok(None);
        };
        Ok(Some(DecodedLine {
            file: PathBuf::from(caps[1].trim()),
            line: parse_line_number(&caps[2])?,
            message: caps[3].trim().to_string(),
            object: None,
        }))
    }
}

/// Reads the tab-separated `file\tline\tobject\tmessage` lines of query
/// validators.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDecoder;

impl Decoder for QueryDecoder {
    fn decode(&self, line: &str) -> Result<Option<DecodedLine>, DecodeError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        let fields: Vec<&str> = line.splitn(4, '\t').collect();
        let [file, number, object, message] = fields[..] else {
            return Err(DecodeError(format!(
                "expected 4 tab-separated fields, got {}",
                fields.len()
            )));
        };
        Ok(Some(DecodedLine {
            file: PathBuf::from(file),
            line: parse_line_number(number)?,
            message: message.trim_end().to_string(),
            object: (!object.is_empty()).then(|| object.to_string()),
        }))
    }
}

/// Reads `[warn]: <message> in file `<file>` near line <n>` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarningDecoder;

impl Decoder for WarningDecoder {
    fn decode(&self, line: &str) -> Result<Option<DecodedLine>, DecodeError> {
        if !line.trim_start().starts_with("[warn]:") {
            return Ok(None);
        }
        let caps = RE_WARNING
            .captures(line.trim())
            .ok_or_else(|| DecodeError("warning without file and line".to_string()))?;
        Ok(Some(DecodedLine {
            file: PathBuf::from(&caps[2]),
            line: parse_line_number(&caps[3])?,
            message: caps[1].to_string(),
            object: None,
        }))
    }
}

/// Decoders by validator id and by category.
pub struct DecoderRegistry {
    by_id: HashMap<String, Arc<dyn Decoder>>,
    by_category: HashMap<String, Arc<dyn Decoder>>,
    fallback: Arc<dyn Decoder>,
}

impl DecoderRegistry {
    /// An empty registry; everything falls back to the generic decoder.
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_category: HashMap::new(),
            fallback: Arc::new(GenericLineDecoder),
        }
    }

    /// Decoders for the validators in `registry`: the query decoder for
    /// every query validator and the warning decoder for `Warnings`.
    pub fn builtin(registry: &ValidatorRegistry) -> Self {
        let query: Arc<dyn Decoder> = Arc::new(QueryDecoder);
        let mut decoders = Self::new().with_category("Warnings", Arc::new(WarningDecoder));
        for spec in registry.iter() {
            if matches!(spec.execution(), Execution::Query(_)) && spec.id().category() != "Warnings"
            {
                decoders = decoders.with_id(spec.id().as_str(), Arc::clone(&query));
            }
        }
        decoders
    }

    pub fn with_id(mut self, id: &str, decoder: Arc<dyn Decoder>) -> Self {
        self.by_id.insert(id.to_string(), decoder);
        self
    }

    pub fn with_category(mut self, category: &str, decoder: Arc<dyn Decoder>) -> Self {
        self.by_category.insert(category.to_string(), decoder);
        self
    }

    /// Decoder for a validator invoked on its own: id, then category.
    pub fn for_validator(&self, id: &ValidatorId) -> &dyn Decoder {
        let decoder = self
            .by_id
            .get(id.as_str())
            .or_else(|| self.by_category.get(id.category()))
            .unwrap_or(&self.fallback);
        &**decoder
    }

    /// Decoder for a composite child: category, then id.
    pub fn for_child(&self, id: &ValidatorId) -> &dyn Decoder {
        let decoder = self
            .by_category
            .get(id.category())
            .or_else(|| self.by_id.get(id.as_str()))
            .unwrap_or(&self.fallback);
        &**decoder
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::builtin;

    #[test]
    fn generic_decoder_reads_path_line_column() {
        let decoded = GenericLineDecoder
            .decode("lib/a.rb:12:5: Line is too long")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.file, PathBuf::from("lib/a.rb"));
        assert_eq!(decoded.line, 12);
        assert_eq!(decoded.message, "Line is too long");

        let decoded = GenericLineDecoder.decode("lib/a.rb:3: Bad").unwrap().unwrap();
        assert_eq!(decoded.line, 3);
    }

    #[test]
    fn generic_decoder_ignores_other_lines() {
        assert_eq!(GenericLineDecoder.decode("3 offenses found").unwrap(), None);
        assert_eq!(GenericLineDecoder.decode("").unwrap(), None);
    }

    #[test]
    fn query_decoder_reads_tab_separated_fields() {
        let decoded = QueryDecoder
            .decode("lib/a.rb\t4\tA#b\tMissing @param tag for `x`")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.line, 4);
        assert_eq!(decoded.object.as_deref(), Some("A#b"));
        assert_eq!(decoded.message, "Missing @param tag for `x`");
    }

    #[test]
    fn query_decoder_rejects_malformed_lines() {
        assert!(QueryDecoder.decode("lib/a.rb\t4").is_err());
        assert!(QueryDecoder.decode("lib/a.rb\tfour\tA\tmsg").is_err());
        assert_eq!(QueryDecoder.decode("  ").unwrap(), None);
    }

    #[test]
    fn warning_decoder_reads_location() {
        let decoded = WarningDecoder
            .decode("[warn]: Unknown tag @fixme in file `lib/a.rb` near line 7")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.message, "Unknown tag @fixme");
        assert_eq!(decoded.file, PathBuf::from("lib/a.rb"));
        assert_eq!(decoded.line, 7);

        assert!(WarningDecoder.decode("[warn]: something odd").is_err());
        assert_eq!(WarningDecoder.decode("progress 50%").unwrap(), None);
    }

    #[test]
    fn registry_lookup_order() {
        let decoders = DecoderRegistry::builtin(&builtin());
        let line = "lib/a.rb\t1\tA\tmsg";

        let order = decoders.for_validator(&ValidatorId::new("Tags/Order"));
        assert!(order.decode(line).unwrap().is_some());

        let child = decoders.for_child(&ValidatorId::new("Warnings/UnknownTag"));
        assert_eq!(child.decode(line).unwrap(), None);

        let tool = decoders.for_validator(&ValidatorId::new("Style/ExternalTool"));
        assert!(tool.decode("lib/a.rb:1: msg").unwrap().is_some());
    }
}
