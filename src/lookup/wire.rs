use serde::Deserialize;

// Both JSON indexes serve bare arrays of { "c": <code>, "n": <name> }.
#[derive(Deserialize)]
pub(crate) struct IndexEntry {
    pub(crate) c: String,
    pub(crate) n: String,
}
