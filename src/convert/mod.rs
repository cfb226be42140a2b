mod converter;
mod registry;

use std::borrow::Cow;

use crate::bind::{Configurable, Member, Scalar};
use crate::constants::FLAGS_SEPARATOR;
use crate::error::{BoxError, ConversionError, ValueError};
use crate::key::{Index, KeyPath};
use crate::options::BindOptions;
use crate::types::Value;

pub use converter::{write_target, Converter, ConverterRegistry};
pub use registry::{Dynamic, TypeRef, TypeRegistry};

const DETACHED: Member = Member::new("");

/// Everything a conversion may consult about the leaf being written.
#[derive(Clone, Copy)]
pub struct ConvertContext<'a> {
    pub options: &'a BindOptions,
    pub key: &'a KeyPath,
    pub member: &'static Member,
    /// Type that declares `member`.
    pub owner: &'static str,
}

impl<'a> ConvertContext<'a> {
    pub fn new(
        options: &'a BindOptions,
        key: &'a KeyPath,
        member: &'static Member,
        owner: &'static str,
    ) -> Self {
        Self {
            options,
            key,
            member,
            owner,
        }
    }

    /// A context not tied to any member, for converting values by hand.
    pub fn detached(options: &'a BindOptions, key: &'a KeyPath) -> Self {
        Self::new(options, key, &DETACHED, "")
    }

    pub fn separator(&self) -> char {
        self.options.separator
    }

    pub fn types(&self) -> &'a TypeRegistry {
        &self.options.types
    }

    pub(crate) fn error(&self, value: &Value, source: BoxError) -> ConversionError {
        ConversionError {
            key: self.key.to_string(),
            raw: value.as_str().map(str::to_string),
            member: self.member.name.to_string(),
            type_name: self.owner,
            source,
        }
    }
}

/// Conversion of a bracketed index into a map key or indexer argument.
pub trait IndexKey: Sized {
    fn from_index(index: &Index, cx: &ConvertContext<'_>) -> Result<Self, BoxError>;

    fn render_index(&self) -> String;
}

macro_rules! tuple_index_key {
    ($len:literal => $($name:ident : $slot:tt),+) => {
        impl<$($name: Scalar),+> IndexKey for ($($name,)+) {
            fn from_index(index: &Index, _cx: &ConvertContext<'_>) -> Result<Self, BoxError> {
                let tokens = index.tokens();
                if tokens.len() != $len {
                    return Err(ValueError::IndexArity {
                        expected: $len,
                        found: tokens.len(),
                    }
                    .into());
                }
                Ok(($($name::parse_text(tokens[$slot].as_str())?,)+))
            }

            fn render_index(&self) -> String {
                let pieces: [Cow<'_, str>; $len] = [$(self.$slot.render_text()),+];
                pieces.join(",")
            }
        }
    };
}

tuple_index_key!(2 => A: 0, B: 1);
tuple_index_key!(3 => A: 0, B: 1, C: 2);

/// A named value of an enum or flags type.
#[derive(Debug, Clone, Copy)]
pub struct Variant<T: 'static> {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub value: T,
}

/// Enum-like types resolved by variant name or alias.
///
/// Flags types set `FLAGS` and accept `A | B` combinations.
pub trait ConfigEnum: Copy + PartialEq + Send + 'static {
    const VARIANTS: &'static [Variant<Self>];

    const FLAGS: bool = false;

    fn union(self, other: Self) -> Self {
        other
    }

    fn contains(self, other: Self) -> bool {
        self == other
    }

    fn empty() -> Option<Self> {
        None
    }
}

pub fn parse_enum<T: ConfigEnum>(raw: &str) -> Result<T, ValueError> {
    let raw = raw.trim();
    if !T::FLAGS {
        return find_variant(raw);
    }
    if raw.is_empty() {
        return T::empty().ok_or_else(|| unknown_variant::<T>(raw));
    }
    let mut combined: Option<T> = None;
    for piece in raw.split(FLAGS_SEPARATOR) {
        let value = find_variant::<T>(piece.trim())?;
        combined = Some(match combined {
            Some(acc) => acc.union(value),
            None => value,
        });
    }
    combined.ok_or_else(|| unknown_variant::<T>(raw))
}

pub fn render_enum<T: ConfigEnum>(value: T) -> String {
    if let Some(variant) = T::VARIANTS.iter().find(|variant| variant.value == value) {
        return variant.name.to_string();
    }
    if !T::FLAGS {
        return String::new();
    }
    let mut names = Vec::new();
    let mut covered: Option<T> = None;
    for variant in T::VARIANTS {
        if Some(variant.value) == T::empty() || !value.contains(variant.value) {
            continue;
        }
        if covered.is_some_and(|covered| covered.contains(variant.value)) {
            continue;
        }
        covered = Some(match covered {
            Some(acc) => acc.union(variant.value),
            None => variant.value,
        });
        names.push(variant.name);
    }
    names.join(" | ")
}

fn find_variant<T: ConfigEnum>(name: &str) -> Result<T, ValueError> {
    T::VARIANTS
        .iter()
        .find(|variant| {
            variant.name.eq_ignore_ascii_case(name)
                || variant
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
        .map(|variant| variant.value)
        .ok_or_else(|| unknown_variant::<T>(name))
}

fn unknown_variant<T>(value: &str) -> ValueError {
    ValueError::UnknownVariant {
        value: value.to_string(),
        type_name: std::any::type_name::<T>(),
    }
}

/// Builds a `T` from a registered type name.
pub fn instantiate<T: Configurable>(raw: &str, cx: &ConvertContext<'_>) -> Result<T, BoxError> {
    let name = raw.trim();
    let object = cx
        .types()
        .create(name)
        .ok_or_else(|| ValueError::UnknownType(name.to_string()))?;
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            ValueError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mood {
        Happy,
        Sad,
    }

    impl ConfigEnum for Mood {
        const VARIANTS: &'static [Variant<Self>] = &[
            Variant {
                name: "Happy",
                aliases: &["glad", "cheerful"],
                value: Mood::Happy,
            },
            Variant {
                name: "Sad",
                aliases: &[],
                value: Mood::Sad,
            },
        ];
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Perm(u8);

    impl ConfigEnum for Perm {
        const VARIANTS: &'static [Variant<Self>] = &[
            Variant {
                name: "None",
                aliases: &[],
                value: Perm(0),
            },
            Variant {
                name: "Read",
                aliases: &["r"],
                value: Perm(1),
            },
            Variant {
                name: "Write",
                aliases: &["w"],
                value: Perm(2),
            },
            Variant {
                name: "Exec",
                aliases: &[],
                value: Perm(4),
            },
        ];
        const FLAGS: bool = true;

        fn union(self, other: Self) -> Self {
            Perm(self.0 | other.0)
        }

        fn contains(self, other: Self) -> bool {
            self.0 & other.0 == other.0
        }

        fn empty() -> Option<Self> {
            Some(Perm(0))
        }
    }

    #[rstest::rstest]
    #[case("Happy", Mood::Happy)]
    #[case("sad", Mood::Sad)]
    #[case(" GLAD ", Mood::Happy)]
    #[case("cheerful", Mood::Happy)]
    fn test_parse_enum(#[case] raw: &str, #[case] expected: Mood) {
        assert_eq!(parse_enum::<Mood>(raw), Ok(expected));
    }

    #[rstest::rstest]
    fn test_unknown_variant() {
        let err = parse_enum::<Mood>("angry").unwrap_err();
        assert!(matches!(err, ValueError::UnknownVariant { ref value, .. } if value == "angry"));
    }

    #[rstest::rstest]
    #[case("Read | Write", Perm(3))]
    #[case("r|w|exec", Perm(7))]
    #[case("Exec", Perm(4))]
    #[case("", Perm(0))]
    fn test_parse_flags(#[case] raw: &str, #[case] expected: Perm) {
        assert_eq!(parse_enum::<Perm>(raw), Ok(expected));
    }

    #[rstest::rstest]
    fn test_render_enum() {
        assert_eq!(render_enum(Mood::Sad), "Sad");
        assert_eq!(render_enum(Perm(5)), "Read | Exec");
        assert_eq!(render_enum(Perm(0)), "None");
        assert_eq!(parse_enum::<Perm>(&render_enum(Perm(6))), Ok(Perm(6)));
    }

    #[rstest::rstest]
    fn test_tuple_index_key() {
        let options = BindOptions::default();
        let key = KeyPath::default();
        let cx = ConvertContext::detached(&options, &key);
        let parsed = <(i32, String)>::from_index(&Index::parse("4, north"), &cx).unwrap();
        assert_eq!(parsed, (4, "north".to_string()));
        assert_eq!(parsed.render_index(), "4,north");
        assert!(<(i32, i32)>::from_index(&Index::parse("1"), &cx).is_err());
    }
}
