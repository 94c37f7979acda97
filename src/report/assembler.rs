//! Turns raw validator output into offenses.
//!
//! Composite parents are assembled from their children's records: each
//! child is decoded on its own and its offenses carry the child's id and
//! severity. A child is never assembled as a standalone validator.

use crate::config::ConfigStore;
use crate::runner::RawRecord;
use crate::validators::{Execution, ValidatorId};

use super::decoder::{Decoder, DecoderRegistry};
use super::offense::Offense;

/// Builds offenses from raw records.
pub struct ResultAssembler<'a> {
    store: &'a ConfigStore,
    decoders: &'a DecoderRegistry,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(store: &'a ConfigStore, decoders: &'a DecoderRegistry) -> Self {
        Self { store, decoders }
    }

    /// Offenses for validator `id` from the records of one run.
    ///
    /// Returns `None` for composite children, for validators without
    /// records, and for composite parents whose children found nothing.
    pub fn build(&self, id: &ValidatorId, records: &[RawRecord]) -> Option<Vec<Offense>> {
        let registry = self.store.registry();
        if registry.is_child(id.as_str()) {
            return None;
        }
        let spec = registry.get(id.as_str())?;

        match spec.execution() {
            Execution::Composite(children) => {
                let offenses: Vec<Offense> = children
                    .iter()
                    .flat_map(|child| {
                        records
                            .iter()
                            .filter(move |r| {
                                &r.validator == child && r.parent.as_ref() == Some(id)
                            })
                            .flat_map(move |r| {
                                self.decode(
                                    self.decoders.for_child(child),
                                    child,
                                    &r.stdout,
                                )
                            })
                    })
                    .collect();
                (!offenses.is_empty()).then_some(offenses)
            }
            _ => {
                let record = records
                    .iter()
                    .find(|r| &r.validator == id && r.parent.is_none())?;
                Some(self.decode(self.decoders.for_validator(id), id, &record.stdout))
            }
        }
    }

    /// Offenses for every top-level validator that has records.
    pub fn assemble(&self, ran: &[ValidatorId], records: &[RawRecord]) -> Vec<Offense> {
        ran.iter()
            .filter_map(|id| self.build(id, records))
            .flatten()
            .collect()
    }

    fn decode(&self, decoder: &dyn Decoder, id: &ValidatorId, raw: &str) -> Vec<Offense> {
        let severity = self.store.severity(id.as_str());
        raw.lines()
            .filter_map(|line| match decoder.decode(line) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!("{}: cannot decode '{}': {}", id, line, e);
                    None
                }
            })
            .map(|decoded| decoded.into_offense(id.clone(), severity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::validators::{builtin, Severity};

    fn store(yaml: &str) -> ConfigStore {
        ConfigStore::new(&RawConfig::from_yaml(yaml).unwrap(), builtin(), &[]).unwrap()
    }

    fn record(id: &str, parent: Option<&str>, stdout: &str) -> RawRecord {
        RawRecord {
            validator: ValidatorId::new(id),
            parent: parent.map(ValidatorId::new),
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    #[test]
    fn composite_offenses_carry_child_id_and_severity() {
        let store = store("Warnings/UnknownTag:\n  Severity: convention\n");
        let decoders = DecoderRegistry::builtin(store.registry());
        let assembler = ResultAssembler::new(&store, &decoders);

        let records = vec![
            record(
                "Warnings/UnknownTag",
                Some("Warnings/Parser"),
                "[warn]: Unknown tag @fixme in file `lib/a.rb` near line 3",
            ),
            record(
                "Warnings/DuplicatedParameterName",
                Some("Warnings/Parser"),
                "[warn]: @param tag has duplicate parameter name: x in file `lib/b.rb` near line 9",
            ),
        ];

        let offenses = assembler
            .build(&ValidatorId::new("Warnings/Parser"), &records)
            .unwrap();

        assert_eq!(offenses.len(), 2);
        assert_eq!(offenses[0].validator().as_str(), "Warnings/UnknownTag");
        assert_eq!(offenses[0].severity(), Severity::Convention);
        assert_eq!(offenses[1].validator().as_str(), "Warnings/DuplicatedParameterName");
        assert_eq!(offenses[1].severity(), Severity::Warning);
    }

    #[test]
    fn empty_composite_and_children_give_nothing() {
        let store = store("");
        let decoders = DecoderRegistry::builtin(store.registry());
        let assembler = ResultAssembler::new(&store, &decoders);
        let records = vec![record("Warnings/UnknownTag", Some("Warnings/Parser"), "")];

        assert_eq!(assembler.build(&ValidatorId::new("Warnings/Parser"), &records), None);
        assert_eq!(assembler.build(&ValidatorId::new("Warnings/UnknownTag"), &records), None);
    }

    #[test]
    fn undecodable_lines_are_skipped() {
        let store = store("");
        let decoders = DecoderRegistry::builtin(store.registry());
        let assembler = ResultAssembler::new(&store, &decoders);
        let records = vec![record(
            "Tags/Order",
            None,
            "lib/a.rb\t2\tA#b\t@return should appear before @param\ngarbage\nlib/a.rb\t9\tA#c\tagain",
        )];

        let offenses = assembler.build(&ValidatorId::new("Tags/Order"), &records).unwrap();

        assert_eq!(offenses.len(), 2);
        assert_eq!(offenses[0].severity(), Severity::Convention);
        assert_eq!(offenses[1].line(), 9);
    }

    #[test]
    fn validator_without_record_gives_nothing() {
        let store = store("");
        let decoders = DecoderRegistry::builtin(store.registry());
        let assembler = ResultAssembler::new(&store, &decoders);

        assert_eq!(assembler.build(&ValidatorId::new("Tags/Order"), &[]), None);
    }
}
