//! The finish pass.
//!
//! Finishing resolves every definition against the complete corpus: types
//! are completed, partial interfaces merged, maplike and setlike
//! declarations expanded, consequential interfaces imported and the
//! per-interface invariants checked. Each definition is finished at most
//! once; later requests return immediately.

mod dictionary;
mod interface;
mod maplike;
mod members;

use std::collections::BTreeSet;

use log::{debug, info};

use webidl_core::{identifier::Id, location::Location};

use crate::{
    complete::{complete_argument, complete_type},
    error::{Diagnostic, ErrorCode, Result},
    model::{CallbackId, DefinitionId, Model, Production, TypedefId},
    scope::GlobalScope,
};

pub(crate) use dictionary::finish_dictionary;
pub(crate) use interface::finish_interface;

/// Finish every production in order. Implements statements are expected to
/// have been linked already.
pub(crate) fn finish_all(model: &mut Model, productions: &[Production]) -> Result<()> {
    info!(productions = productions.len(); "Finishing definitions");
    for production in productions {
        match *production {
            Production::Definition(id) => finish_definition(model, id)?,
            Production::Partial(partial) => {
                let owner = model.partial(partial).non_partial;
                finish_interface(model, owner)?;
            }
            Production::Implements(_) => {}
        }
    }
    Ok(())
}

fn finish_definition(model: &mut Model, id: DefinitionId) -> Result<()> {
    match id {
        DefinitionId::Interface(iface) => finish_interface(model, iface),
        DefinitionId::Dictionary(dictionary) => finish_dictionary(model, dictionary),
        DefinitionId::Callback(callback) => finish_callback(model, callback),
        DefinitionId::Typedef(typedef) => finish_typedef(model, typedef),
        DefinitionId::Enum(_) => Ok(()),
    }
}

fn finish_callback(model: &mut Model, id: CallbackId) -> Result<()> {
    if model.callback(id).finished {
        return Ok(());
    }
    model.callback_mut(id).finished = true;
    debug!(name:% = model.callback(id).name(); "Finishing callback");

    let callback = model.callback(id);
    let return_type = complete_type(model, &callback.return_type, callback.location())?;
    let mut arguments = callback.arguments.clone();
    for argument in &mut arguments {
        complete_argument(model, argument)?;
    }

    let callback = model.callback_mut(id);
    callback.return_type = return_type;
    callback.arguments = arguments;
    Ok(())
}

fn finish_typedef(model: &mut Model, id: TypedefId) -> Result<()> {
    let typedef = model.typedef(id);
    let inner = complete_type(model, typedef.inner(), typedef.location())?;
    model.typedef_mut(id).inner = inner;
    Ok(())
}

/// Check `[Exposed]` names against the known globals, default an empty list
/// to the primary global and return the exposure set the names map to.
pub(crate) fn resolve_exposure(
    scope: &GlobalScope,
    names: &mut BTreeSet<Id>,
    location: Location,
) -> Result<BTreeSet<Id>> {
    if let Some(unknown) = names
        .iter()
        .find(|name| !scope.global_names().contains(*name))
    {
        return Err(Diagnostic::error(format!("Unknown [Exposed] value {unknown}"))
            .with_code(ErrorCode::E407)
            .with_label(location, "exposed here"));
    }
    if names.is_empty() {
        names.extend(scope.primary_global_name());
    }
    Ok(scope.exposure_set(names))
}

#[cfg(test)]
pub(crate) mod tests {
    use webidl_core::location::SourceMap;

    use super::*;
    use crate::{elaborate::Builder, lexer::tokenize, link::link, parser::build_definitions};

    /// Elaborate, link and finish `source`, returning the model.
    pub(crate) fn finished(source: &str) -> Result<Model> {
        let mut sources = SourceMap::new();
        let file = sources.add("finish.webidl", source);
        let tokens = tokenize(source, file)?;
        let definitions = build_definitions(&tokens, file)?;
        let mut model = Model::new();
        let elaborated = Builder::new(&mut model, file).build(definitions)?;
        link(&mut model, &elaborated.productions)?;
        finish_all(&mut model, &elaborated.productions)?;
        Ok(model)
    }

    #[test]
    fn test_exposure_defaults_to_primary_global() {
        let model = finished(
            "[PrimaryGlobal] interface Window {};
             [Global=(Worker, DedicatedWorker)] interface DedicatedWorkerGlobalScope {};
             interface Node {};
             [Exposed=(Window, Worker)] interface Blob {};",
        )
        .unwrap();

        let node = model.interfaces().find(|(_, i)| i.name() == "Node").unwrap().1;
        assert_eq!(node.exposure_global_names().len(), 1);
        assert!(node.exposure_set().contains(&Id::new("Window")));

        let blob = model.interfaces().find(|(_, i)| i.name() == "Blob").unwrap().1;
        assert_eq!(blob.exposure_set().len(), 2);
        assert!(blob.exposure_set().contains(&Id::new("DedicatedWorkerGlobalScope")));
    }

    #[test]
    fn test_unknown_exposure_name() {
        let err = finished("[PrimaryGlobal] interface Window {}; [Exposed=Nowhere] interface A {};")
            .unwrap_err();
        assert_eq!(err.message(), "Unknown [Exposed] value Nowhere");
    }

    #[test]
    fn test_no_primary_global_gives_empty_exposure() {
        let model = finished("interface Lonely {};").unwrap();
        let (_, iface) = model.interfaces().next().unwrap();
        assert!(iface.exposure_set().is_empty());
    }

    #[test]
    fn test_callback_and_typedef_are_completed() {
        let model = finished(
            "typedef sequence<long> Longs;
             callback Handler = void (Longs values, optional any extra);",
        )
        .unwrap();

        let callback = &model.callbacks[0];
        assert!(callback.arguments()[0].ty.is_sequence());
        assert!(callback.arguments()[1].default.is_some());
        assert!(model.typedefs[0].inner().is_complete());
    }
}
