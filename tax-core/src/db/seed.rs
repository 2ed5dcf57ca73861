//! Memorable three-word keys such as `brave-golden-otter`.

use uuid::Uuid;

const ADJECTIVES: [&str; 64] = [
    "amber", "ancient", "azure", "bold", "brave", "bright", "brisk", "calm",
    "clever", "cosmic", "crimson", "curious", "dapper", "eager", "early", "emerald",
    "fancy", "fierce", "gentle", "giant", "golden", "grand", "happy", "hazel",
    "honest", "humble", "icy", "jolly", "keen", "kind", "lively", "lucky",
    "mellow", "merry", "mighty", "modern", "nimble", "noble", "olive", "patient",
    "plucky", "polite", "proud", "quick", "quiet", "rapid", "rosy", "rustic",
    "scarlet", "shiny", "silent", "silver", "sleepy", "smooth", "sunny", "swift",
    "tall", "tidy", "tiny", "violet", "vivid", "warm", "witty", "young",
];

const NOUNS: [&str; 64] = [
    "apple", "badger", "banjo", "beacon", "bison", "biscuit", "canoe", "cedar",
    "comet", "cookie", "crane", "dolphin", "falcon", "fern", "fiddle", "garden",
    "glacier", "harbor", "heron", "island", "kettle", "lantern", "lemon", "lynx",
    "maple", "meadow", "mango", "marmot", "moose", "muffin", "otter", "owl",
    "panda", "pebble", "pepper", "piano", "pickle", "pine", "puffin", "quill",
    "rabbit", "raven", "river", "robin", "rocket", "saddle", "salmon", "spruce",
    "squirrel", "summit", "teapot", "thistle", "tiger", "tulip", "tundra", "valley",
    "walnut", "walrus", "willow", "wolf", "yak", "yarrow", "zebra", "zephyr",
];

/// Generates an `adjective-adjective-noun` phrase.
pub fn generate_seed() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let pick = |byte: u8, words: &[&'static str]| words[usize::from(byte) % words.len()];

    format!(
        "{}-{}-{}",
        pick(bytes[0], &ADJECTIVES),
        pick(bytes[1], &ADJECTIVES),
        pick(bytes[2], &NOUNS)
    )
}

/// Whether `seed` has the shape of a generated seed: three hyphen-separated,
/// non-empty, lowercase ASCII words.
pub fn is_valid_seed(seed: &str) -> bool {
    let parts: Vec<&str> = seed.split('-').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase()))
}
