//! Names every parse session starts with.

use log::debug;

use webidl_core::{
    identifier::Id,
    location::{BUILTIN_TYPE, Location, SourceMap},
};

use crate::{
    elaborate::Builder,
    error::Result,
    lexer,
    model::{BuiltinType, Model, Type, Typedef},
    parser,
    scope::Binding,
};

/// File name given to the builtin IDL fragment. Diagnostics and dependency
/// sets never report it.
pub(crate) const BUILTIN_FILE: &str = "<builtin>";

const BUILTIN_IDL: &str = "typedef unsigned long long DOMTimeStamp;
typedef (ArrayBufferView or ArrayBuffer) BufferSource;
typedef (SharedArrayBufferView or SharedArrayBuffer) SharedBufferSource;
";

/// Binds the buffer types under their own names and elaborates the builtin
/// typedefs. The builtin productions are dropped; the typedefs are only
/// reachable through the names they bind.
pub(crate) fn install(model: &mut Model, sources: &mut SourceMap) -> Result<()> {
    let location = Location::builtin(BUILTIN_TYPE);
    for builtin in BuiltinType::BUFFER_TYPES {
        let name = Id::new(builtin.name());
        let id = model.add_typedef(Typedef::new(name, location, Type::builtin(builtin)));
        model.scope.bind(name, Binding::Typedef(id), location)?;
    }

    let file = sources.add(BUILTIN_FILE, BUILTIN_IDL);
    let tokens = lexer::tokenize(BUILTIN_IDL, file)?;
    let definitions = parser::build_definitions(&tokens, file)?;
    let elaborated = Builder::new(model, file).build(definitions)?;

    debug!(
        buffer_types = BuiltinType::BUFFER_TYPES.len(),
        typedefs = elaborated.productions.len();
        "Installed builtin definitions"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_binds_buffer_types_and_typedefs() {
        let mut model = Model::new();
        let mut sources = SourceMap::new();
        install(&mut model, &mut sources).unwrap();

        for name in ["ArrayBuffer", "Float64Array", "SharedUint8ClampedArray"] {
            assert!(
                matches!(model.scope.lookup(Id::new(name)), Some(Binding::Typedef(_))),
                "{name} should be a builtin typedef"
            );
        }
        for name in ["DOMTimeStamp", "BufferSource", "SharedBufferSource"] {
            assert!(model.scope.lookup(Id::new(name)).is_some(), "{name} is missing");
        }
        assert_eq!(model.typedefs.len(), BuiltinType::BUFFER_TYPES.len() + 3);
        assert_eq!(sources.len(), 1);
    }
}
