//! Fixed fingerspelling alphabet table
//!
//! Maps every supported Russian letter to the base name of its gesture
//! clip. The table is static; characters absent from it are unsupported
//! and get dropped during translation.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Letter -> clip base name. A clip base name `x` resolves to resource
/// id `d_x` (see [`crate::resource::resolver`]).
static DACTYL_MAP: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ('а', "a"),
        ('б', "b"),
        ('в', "v"),
        ('г', "g"),
        ('д', "d"),
        ('е', "e"),
        ('ё', "yo"),
        ('ж', "zh"),
        ('з', "z"),
        ('и', "i"),
        ('й', "y"),
        ('к', "k"),
        ('л', "l"),
        ('м', "m"),
        ('н', "n"),
        ('о', "o"),
        ('п', "p"),
        ('р', "r"),
        ('с', "s"),
        ('т', "t"),
        ('у', "u"),
        ('ф', "f"),
        ('х', "h"),
        ('ц', "ts"),
        ('ч', "ch"),
        ('ш', "sh"),
        ('щ', "sch"),
        ('ъ', "solM"),
        ('ы', "yi"),
        ('ь', "softM"),
        ('э', "e"),
        ('ю', "yu"),
        ('я', "ya"),
    ])
});

/// Number of supported letters
pub fn len() -> usize {
    DACTYL_MAP.len()
}

/// Clip base name for a supported letter, `None` otherwise
pub fn clip_name(letter: char) -> Option<&'static str> {
    DACTYL_MAP.get(&letter).copied()
}

/// Whether the character is a supported letter (space is not a letter)
pub fn is_supported(letter: char) -> bool {
    DACTYL_MAP.contains_key(&letter)
}

/// Iterator over every supported letter (unspecified order)
pub fn letters() -> impl Iterator<Item = char> {
    DACTYL_MAP.keys().copied()
}
