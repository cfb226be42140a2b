use std::any::TypeId;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use smol_str::SmolStr;
use tracing::trace;

use crate::bind::{Configurable, Member};
use crate::key::{fold_name, KeyPart};

type MemberKey = (TypeId, SmolStr);

// (declaring type, folded name) -> position in the type's member table.
// Only hits are stored; unknown names are looked up every time.
static MEMBERS: Lazy<DashMap<MemberKey, usize>> = Lazy::new(DashMap::new);

pub(crate) fn resolve(target: &dyn Configurable, part: &KeyPart) -> Option<&'static Member> {
    resolve_folded(target, part.folded_name())
}

pub(crate) fn resolve_name(target: &dyn Configurable, name: &str) -> Option<&'static Member> {
    resolve_folded(target, &fold_name(name))
}

fn resolve_folded(target: &dyn Configurable, folded: &str) -> Option<&'static Member> {
    let members = target.members();
    let key = (target.as_any().type_id(), SmolStr::new(folded));
    if let Some(hit) = MEMBERS.get(&key) {
        return members.get(*hit);
    }
    let position = find_member(members, folded);
    trace!(
        type_name = target.type_name(),
        name = folded,
        ?position,
        "member cache miss"
    );
    let position = position?;
    MEMBERS.insert(key, position);
    members.get(position)
}

fn find_member(members: &[Member], folded: &str) -> Option<usize> {
    members
        .iter()
        .position(|member| fold_name(member.name) == folded)
        .or_else(|| {
            members.iter().position(|member| {
                member
                    .policy
                    .aliases
                    .iter()
                    .any(|alias| fold_name(alias) == folded)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBERS_TABLE: &[Member] = &[
        Member::new("name"),
        Member::new("best_friend").with_aliases(&["Best friend", "bff"]),
        Member::new("Bff"),
    ];

    #[rstest::rstest]
    #[case("NAME", Some(0))]
    #[case(" best FRIEND ", Some(1))]
    #[case("best_friend", Some(1))]
    #[case("bff", Some(2))]
    #[case("nickname", None)]
    fn test_find_member(#[case] name: &str, #[case] expected: Option<usize>) {
        assert_eq!(find_member(MEMBERS_TABLE, &fold_name(name)), expected);
    }

    #[derive(Debug, Default)]
    struct Across {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Default)]
    struct Down {
        y: i32,
        x: i32,
    }

    crate::configurable! { Across { x: { aliases("h") }, y } }
    crate::configurable! { Down { y: { aliases("h") }, x } }

    #[rstest::rstest]
    fn test_types_with_shared_names_resolve_separately() {
        for _ in 0..2 {
            assert_eq!(resolve_name(&Across::default(), "H").map(|m| m.name), Some("x"));
            assert_eq!(resolve_name(&Down::default(), "H").map(|m| m.name), Some("y"));
        }
    }

    #[rstest::rstest]
    fn test_unknown_names_are_not_cached() {
        let across = Across::default();
        assert!(resolve_name(&across, "shoe size").is_none());
        assert!(resolve_name(&across, "shoe size").is_none());
        let key = (TypeId::of::<Across>(), SmolStr::new(fold_name("shoe size")));
        assert!(!MEMBERS.contains_key(&key));
    }
}
