//! Plain-text files consumed by the detector trainer.

mod network;

pub use network::{NetworkParams, NetworkTemplate, TemplateSource};

use crate::ir::ClassTable;

/// `names.txt`: one class name per line, line number = class index.
pub fn names_file_contents(classes: &ClassTable) -> String {
    classes.names().join("\n")
}

/// The `<dataset>.data` pointer file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFile {
    pub classes: usize,
    pub train: String,
    pub valid: String,
    pub names: String,
    pub backup: String,
}

impl DataFile {
    pub fn render(&self) -> String {
        [
            format!("classes={}", self.classes),
            format!("train={}", self.train),
            format!("valid={}", self.valid),
            format!("names={}", self.names),
            format!("backup={}", self.backup),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Vocabulary;

    #[test]
    fn data_file_lists_keys_in_trainer_order() {
        let data = DataFile {
            classes: 3,
            train: "cfg/train.txt".into(),
            valid: "cfg/test.txt".into(),
            names: "cfg/names.txt".into(),
            backup: "backup".into(),
        };
        assert_eq!(
            data.render(),
            "classes=3\ntrain=cfg/train.txt\nvalid=cfg/test.txt\nnames=cfg/names.txt\nbackup=backup"
        );
    }

    #[test]
    fn names_file_round_trips_through_class_table() {
        let vocab = Vocabulary::new(
            vec!["car".into(), "van".into(), "bus".into()],
            Vec::new(),
        );
        let classes = ClassTable::from_vocabulary(&vocab);
        let contents = names_file_contents(&classes);
        assert_eq!(contents, "car\nvan\nbus");
        assert!(classes.matches_names_file(&contents));
    }
}
