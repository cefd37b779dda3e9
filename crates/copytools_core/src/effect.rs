#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<K> {
    CopyText {
        text: String,
        element_tag: String,
        timestamp: i64,
    },
    PersistEnabled(bool),
    SynthesizeDoubleClick { target: K },
}
