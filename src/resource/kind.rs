//! Kind-specific resource attributes.

use std::fmt;
use std::str::FromStr;

/// What a resource is, with the attributes only that kind carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceKind {
    Script(ScriptAttributes),
    Stylesheet(StyleAttributes),
    /// A plain file with no markup representation.
    #[default]
    File,
}

impl ResourceKind {
    /// Media type assumed when a descriptor has none.
    pub fn default_mime(&self) -> &'static str {
        match self {
            ResourceKind::Script(_) => "application/javascript",
            ResourceKind::Stylesheet(_) => "text/css",
            ResourceKind::File => "application/octet-stream",
        }
    }
}

/// How the browser should load a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptType {
    /// Classic script (`application/javascript`).
    #[default]
    Classic,
    /// ECMAScript module.
    Module,
}

impl ScriptType {
    /// Value for the `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Classic => "application/javascript",
            ScriptType::Module => "module",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "application/javascript" | "text/javascript" | "application/ecmascript" => {
                Ok(ScriptType::Classic)
            }
            "module" => Ok(ScriptType::Module),
            other => Err(format!("unknown script type '{}'", other)),
        }
    }
}

/// Script element attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptAttributes {
    pub script_type: ScriptType,
    pub is_async: bool,
    pub is_deferred: bool,
    pub is_no_module: bool,
}

/// Stylesheet link attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleAttributes {
    /// Media query for the `media` attribute.
    pub media: Option<String>,
}
