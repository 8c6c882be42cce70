/// Reasons a namespace cannot be built from a backing source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamespaceError {
    #[error("backing source declares no export list")]
    MissingExportList,

    #[error("exported name '{name}' is not bound in the backing source")]
    UnboundExport { name: String },

    #[error("name '{name}' is exported more than once")]
    DuplicateExport { name: String },

    #[error("name '{name}' is known to be unsafe and cannot be exposed")]
    UnsafeName { name: String },

    #[error("'{name}' is not a valid identifier")]
    InvalidName { name: String },

    #[error("'{name}' is not a builtin function")]
    UnknownBuiltin { name: String },
}
