//! Links interfaces to their parents and implemented interfaces.
//!
//! Runs once the whole corpus has been elaborated and before anything is
//! finished, so the finishing passes can walk ancestor chains without
//! guarding against loops. Cycles are found on a petgraph [`DiGraph`] of
//! parent and implements edges.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{
    algo::{DfsSpace, has_path_connecting, is_cyclic_directed},
    graph::{DiGraph, NodeIndex},
};

use webidl_core::{identifier::Id, location::Location};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    model::{ImplementsId, InterfaceId, Model, Production},
    scope::Binding,
};

pub(crate) fn link(model: &mut Model, productions: &[Production]) -> Result<()> {
    for production in productions {
        if let Production::Implements(id) = production {
            link_implements(model, *id)?;
        }
    }

    let ids: Vec<InterfaceId> = model.interfaces().map(|(id, _)| id).collect();
    for &id in &ids {
        link_parent(model, id)?;
    }
    check_cycles(model, &ids)?;
    debug!(interfaces = ids.len(); "Linked interfaces");
    Ok(())
}

fn unresolved(name: Id, location: Location) -> Diagnostic {
    Diagnostic::error(format!("Unresolved type '{name}'."))
        .with_code(ErrorCode::E202)
        .with_label(location, "not declared")
}

fn link_implements(model: &mut Model, id: ImplementsId) -> Result<()> {
    let statement = model.implements_statement(id).clone();
    let side = |(name, location): (Id, Location), which: &str| -> Result<InterfaceId> {
        let iface = match model.scope.lookup(name) {
            Some(Binding::Interface(iface)) => iface,
            Some(_) => {
                return Err(Diagnostic::error(format!(
                    "{which} of 'implements' is not an interface"
                ))
                .with_code(ErrorCode::E403)
                .with_label(statement.location, "implements statement")
                .with_secondary_label(location, format!("{name} is not an interface")));
            }
            None => return Err(unresolved(name, location)),
        };
        if model.interface(iface).is_callback() {
            return Err(Diagnostic::error(format!(
                "{which} of 'implements' is a callback interface"
            ))
            .with_code(ErrorCode::E403)
            .with_label(statement.location, "implements statement")
            .with_secondary_label(model.interface(iface).location(), "callback interface"));
        }
        Ok(iface)
    };

    let implementor = side(statement.implementor, "Left-hand side")?;
    let implementee = side(statement.implementee, "Right-hand side")?;

    let implemented = &mut model.interface_mut(implementor).implemented;
    if !implemented.contains(&implementee) {
        implemented.push(implementee);
    }
    Ok(())
}

fn link_parent(model: &mut Model, id: InterfaceId) -> Result<()> {
    let Some((parent_name, location)) = model.interface(id).parent_name else {
        return Ok(());
    };
    let parent = match model.scope.lookup(parent_name) {
        Some(Binding::Interface(parent)) => parent,
        Some(_) => {
            let name = model.interface(id).name();
            return Err(Diagnostic::error(format!(
                "{name} inherits from {parent_name} which is not an interface"
            ))
            .with_code(ErrorCode::E401)
            .with_label(model.interface(id).location(), "interface")
            .with_secondary_label(
                model.scope.location_of(parent_name).unwrap_or(location),
                "not an interface",
            ));
        }
        None => return Err(unresolved(parent_name, location)),
    };
    model.interface_mut(id).parent = Some(parent);
    Ok(())
}

/// Interfaces reachable over parent and implements edges.
fn successors(model: &Model, id: InterfaceId) -> Vec<InterfaceId> {
    let iface = model.interface(id);
    iface
        .parent
        .into_iter()
        .chain(iface.implemented.iter().copied())
        .collect()
}

/// Inheritance and implements edges, one node per interface.
struct InterfaceGraph {
    graph: DiGraph<InterfaceId, ()>,
    nodes: HashMap<InterfaceId, NodeIndex>,
}

impl InterfaceGraph {
    fn new(model: &Model, ids: &[InterfaceId]) -> Self {
        let mut graph = DiGraph::with_capacity(ids.len(), ids.len());
        let nodes: HashMap<_, _> = ids.iter().map(|&id| (id, graph.add_node(id))).collect();
        for &id in ids {
            for next in successors(model, id) {
                graph.add_edge(nodes[&id], nodes[&next], ());
            }
        }
        trace!(nodes = graph.node_count(), edges = graph.edge_count(); "Built interface graph");
        Self { graph, nodes }
    }
}

fn check_cycles(model: &Model, ids: &[InterfaceId]) -> Result<()> {
    let graph = InterfaceGraph::new(model, ids);
    if !is_cyclic_directed(&graph.graph) {
        return Ok(());
    }

    let mut space = DfsSpace::new(&graph.graph);
    for &id in ids {
        let node = graph.nodes[&id];
        let loop_point = successors(model, id).into_iter().find(|next| {
            has_path_connecting(&graph.graph, graph.nodes[next], node, Some(&mut space))
        });
        if let Some(loop_point) = loop_point {
            let iface = model.interface(id);
            return Err(Diagnostic::error(format!(
                "Interface {} has itself as ancestor or implemented interface",
                iface.name()
            ))
            .with_code(ErrorCode::E402)
            .with_label(iface.location(), "interface")
            .with_secondary_label(
                model.interface(loop_point).location(),
                "cycle passes through here",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use webidl_core::location::{FileId, SourceMap};

    use super::*;
    use crate::{elaborate::Builder, lexer::tokenize, parser::build_definitions};

    fn linked(source: &str) -> Result<Model> {
        let mut sources = SourceMap::new();
        let file: FileId = sources.add("link.webidl", source);
        let tokens = tokenize(source, file)?;
        let definitions = build_definitions(&tokens, file)?;
        let mut model = Model::new();
        let elaborated = Builder::new(&mut model, file).build(definitions)?;
        link(&mut model, &elaborated.productions)?;
        Ok(model)
    }

    fn iface(model: &Model, name: &str) -> InterfaceId {
        match model.scope.lookup(Id::new(name)) {
            Some(Binding::Interface(id)) => id,
            other => panic!("{name} is not an interface: {other:?}"),
        }
    }

    #[test]
    fn test_parent_and_implements_are_linked() {
        let model = linked(
            "interface Base {}; interface Mixin {};
             interface Derived : Base {};
             Derived implements Mixin;
             Derived implements Mixin;",
        )
        .unwrap();

        let derived = model.interface(iface(&model, "Derived"));
        assert_eq!(derived.parent(), Some(iface(&model, "Base")));
        assert_eq!(derived.implemented_interfaces(), &[iface(&model, "Mixin")]);
    }

    #[test]
    fn test_implements_unresolved() {
        let err = linked("interface A {}; A implements Missing;").unwrap_err();
        assert_eq!(err.message(), "Unresolved type 'Missing'.");
    }

    #[test]
    fn test_implements_callback_interface() {
        let err = linked("interface A {}; callback interface B {}; A implements B;").unwrap_err();
        assert_eq!(
            err.message(),
            "Right-hand side of 'implements' is a callback interface"
        );

        let err = linked("dictionary A {}; interface B {}; A implements B;").unwrap_err();
        assert_eq!(err.message(), "Left-hand side of 'implements' is not an interface");
    }

    #[test]
    fn test_parent_not_an_interface() {
        let err = linked("dictionary D {}; interface A : D {};").unwrap_err();
        assert_eq!(err.message(), "A inherits from D which is not an interface");
        assert_eq!(err.code(), Some(ErrorCode::E401));
    }

    #[test]
    fn test_inheritance_cycle() {
        let err = linked("interface A : B {}; interface B : A {};").unwrap_err();
        assert_eq!(
            err.message(),
            "Interface A has itself as ancestor or implemented interface"
        );
        assert_eq!(err.labels().len(), 2);
    }

    #[test]
    fn test_implements_cycle() {
        let err = linked(
            "interface A {}; interface B {}; A implements B; B implements A;",
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E402));

        let err = linked("interface A {}; A implements A;").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E402));
    }

    #[test]
    fn test_cycle_through_mixed_edges() {
        let err = linked(
            "interface A : B {}; interface B {}; interface C : A {}; B implements C;",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Interface A has itself as ancestor or implemented interface"
        );
    }

    #[test]
    fn test_shared_ancestor_is_not_a_cycle() {
        let model = linked(
            "interface Root {}; interface Left : Root {}; interface Right : Root {};
             interface Both : Left {}; Both implements Right;",
        )
        .unwrap();

        let ids: Vec<_> = model.interfaces().map(|(id, _)| id).collect();
        let graph = InterfaceGraph::new(&model, &ids);
        assert_eq!(graph.graph.edge_count(), 4);
        assert!(!is_cyclic_directed(&graph.graph));
    }
}
