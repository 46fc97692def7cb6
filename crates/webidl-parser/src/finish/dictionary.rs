use std::collections::BTreeSet;

use log::debug;

use crate::{
    complete::complete_argument,
    error::{Diagnostic, ErrorCode, Result},
    model::{DictionaryId, Model},
    scope::{self, Binding},
};

/// Resolve the parent, complete and sort the members, then reject names
/// an ancestor already declares.
pub(crate) fn finish_dictionary(model: &mut Model, id: DictionaryId) -> Result<()> {
    if model.dictionary(id).finished {
        return Ok(());
    }
    model.dictionary_mut(id).finished = true;
    let name = model.dictionary(id).name();
    debug!(name:% = name; "Finishing dictionary");

    if let Some((parent_name, location)) = model.dictionary(id).parent_name {
        let parent = match model.scope.lookup(parent_name) {
            Some(Binding::Dictionary(parent)) => parent,
            Some(_) => {
                return Err(Diagnostic::error(format!(
                    "Dictionary {name} has parent that is not a dictionary"
                ))
                .with_code(ErrorCode::E602)
                .with_label(location, "parent")
                .with_secondary_label(
                    model.scope.location_of(parent_name).unwrap_or(location),
                    "not a dictionary",
                ));
            }
            None => {
                return Err(Diagnostic::error(format!("Unresolved type '{parent_name}'."))
                    .with_code(ErrorCode::E202)
                    .with_label(location, "not declared"));
            }
        };
        model.dictionary_mut(id).parent = Some(parent);
        finish_dictionary(model, parent)?;
    }

    let mut members = model.dictionary(id).members.clone();
    let scope_name = format!("::{name}::");
    for (idx, member) in members.iter().enumerate() {
        if let Some(earlier) = members[..idx].iter().find(|earlier| earlier.name == member.name) {
            return Err(scope::multiple_definitions(
                member.name,
                &scope_name,
                member.location,
                earlier.location,
            ));
        }
    }
    for member in &mut members {
        complete_argument(model, member)?;
    }
    members.sort_by_key(|member| member.name.as_string());

    let mut visited = BTreeSet::new();
    let mut ancestor = model.dictionary(id).parent;
    while let Some(ancestor_id) = ancestor {
        if ancestor_id == id || !visited.insert(ancestor_id) {
            let dictionary = model.dictionary(id);
            return Err(Diagnostic::error(format!(
                "Dictionary {name} has itself as an ancestor"
            ))
            .with_code(ErrorCode::E600)
            .with_label(dictionary.location(), "dictionary"));
        }
        let ancestor_dict = model.dictionary(ancestor_id);
        for inherited in &ancestor_dict.members {
            if let Some(member) = members.iter().find(|member| member.name == inherited.name) {
                return Err(Diagnostic::error(format!(
                    "Dictionary {name} has two members with name {}",
                    member.name
                ))
                .with_code(ErrorCode::E601)
                .with_label(member.location, "member")
                .with_secondary_label(inherited.location, "inherited member"));
            }
        }
        ancestor = ancestor_dict.parent;
    }

    model.dictionary_mut(id).members = members;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{error::ErrorCode, finish::tests::finished};

    #[test]
    fn test_members_sorted_and_defaults_completed() {
        let model = finished(
            "dictionary Init { long zeta = 3; boolean alpha = false; required DOMString mid; };",
        )
        .unwrap();
        let dict = &model.dictionaries[0];
        let names: Vec<_> = dict.members().iter().map(|m| m.name.as_string()).collect();

        assert_eq!(names, ["alpha", "mid", "zeta"]);
        assert!(dict.members()[1].is_required());
        assert!(dict.members()[2].default.is_some());
    }

    #[test]
    fn test_parent_resolution() {
        let model = finished("dictionary Base {}; dictionary Derived : Base {};").unwrap();
        assert_eq!(
            model.dictionaries[1].parent().map(|p| p.index()),
            Some(0)
        );

        let err = finished("interface I {}; dictionary D : I {};").unwrap_err();
        assert_eq!(err.message(), "Dictionary D has parent that is not a dictionary");

        let err = finished("dictionary D : Missing {};").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_inherited_member_name() {
        let err = finished(
            "dictionary Base { long x; }; dictionary Derived : Base { DOMString x; };",
        )
        .unwrap_err();
        assert_eq!(err.message(), "Dictionary Derived has two members with name x");
        assert_eq!(err.labels().len(), 2);
    }

    #[test]
    fn test_duplicate_member() {
        let err = finished("dictionary D { long x; long x; };").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_ancestor_cycle() {
        let err = finished("dictionary A : B {}; dictionary B : A {};").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E600));
        assert!(err.message().ends_with("has itself as an ancestor"));
    }
}
