//! Typed view of the objects stored in a `project.pbxproj` file.
//!
//! Every object carries an `isa` property naming its class. Only the classes
//! that matter for file membership get their own variant; the rest are kept as
//! [`Object::Other`] so references to them still resolve.

use crate::plist::PlistValue;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of an object (24 hex digits in files written by Xcode).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an element's `path` combines with its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTree {
    /// `<absolute>`: the path is already absolute.
    Absolute,
    /// `<group>`: the path is relative to the enclosing group's location.
    Group,
    /// `SOURCE_ROOT`: the path is relative to the project's storage root.
    SourceRoot,
    /// Any build-setting rooted location such as `SDKROOT` or `BUILT_PRODUCTS_DIR`.
    Other(String),
}

impl SourceTree {
    pub fn parse(value: &str) -> Self {
        match value {
            "<absolute>" => SourceTree::Absolute,
            "<group>" => SourceTree::Group,
            "SOURCE_ROOT" => SourceTree::SourceRoot,
            other => SourceTree::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTree::Absolute => f.write_str("<absolute>"),
            SourceTree::Group => f.write_str("<group>"),
            SourceTree::SourceRoot => f.write_str("SOURCE_ROOT"),
            SourceTree::Other(root) => f.write_str(root),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhaseKind {
    Sources,
    Headers,
    Resources,
    Frameworks,
    CopyFiles,
    ShellScript,
    Other,
}

impl BuildPhaseKind {
    fn from_isa(isa: &str) -> Self {
        match isa {
            "PBXSourcesBuildPhase" => BuildPhaseKind::Sources,
            "PBXHeadersBuildPhase" => BuildPhaseKind::Headers,
            "PBXResourcesBuildPhase" => BuildPhaseKind::Resources,
            "PBXFrameworksBuildPhase" => BuildPhaseKind::Frameworks,
            "PBXCopyFilesBuildPhase" => BuildPhaseKind::CopyFiles,
            "PBXShellScriptBuildPhase" => BuildPhaseKind::ShellScript,
            _ => BuildPhaseKind::Other,
        }
    }
}

/// The root `PBXProject` object.
#[derive(Debug, Clone)]
pub struct ProjectObject {
    pub targets: Vec<ObjectId>,
    pub main_group: Option<ObjectId>,
    pub project_dir_path: Option<String>,
}

/// `PBXGroup` or `PBXVariantGroup`.
#[derive(Debug, Clone)]
pub struct Group {
    pub children: Vec<ObjectId>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
}

impl Group {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

/// `PBXFileReference`, or an `XCVersionGroup` bundle treated as a single file.
#[derive(Debug, Clone)]
pub struct FileReference {
    pub path: Option<String>,
    pub source_tree: SourceTree,
}

/// `PBXNativeTarget`, `PBXAggregateTarget` or `PBXLegacyTarget`.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub build_phases: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct BuildPhase {
    pub kind: BuildPhaseKind,
    pub files: Vec<ObjectId>,
}

/// `PBXBuildFile`. Swift package products have no `fileRef`.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub file_ref: Option<ObjectId>,
}

/// `PBXContainerItemProxy`: a reference to an object in another project.
#[derive(Debug, Clone)]
pub struct ContainerItemProxy {
    pub container_portal: ObjectId,
    pub remote_info: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Object {
    Project(ProjectObject),
    Group(Group),
    FileReference(FileReference),
    Target(Target),
    BuildPhase(BuildPhase),
    BuildFile(BuildFile),
    ContainerItemProxy(ContainerItemProxy),
    Other { isa: String },
}

impl Object {
    /// Build a typed object from its property dictionary.
    pub fn from_plist(id: &ObjectId, value: &PlistValue) -> Result<Self, String> {
        let fields = Fields::new(id, value)?;
        let isa = fields
            .string("isa")?
            .ok_or_else(|| format!("Object {id} has no isa"))?;

        Ok(match isa {
            "PBXProject" => Object::Project(ProjectObject {
                targets: fields.ids("targets")?,
                main_group: fields.id("mainGroup")?,
                project_dir_path: fields.owned_string("projectDirPath")?,
            }),
            "PBXGroup" | "PBXVariantGroup" => Object::Group(Group {
                children: fields.ids("children")?,
                name: fields.owned_string("name")?,
                path: fields.owned_string("path")?,
                source_tree: fields.source_tree()?,
            }),
            "PBXFileReference" | "XCVersionGroup" => Object::FileReference(FileReference {
                path: fields.owned_string("path")?,
                source_tree: fields.source_tree()?,
            }),
            "PBXNativeTarget" | "PBXAggregateTarget" | "PBXLegacyTarget" => {
                let name = match fields.owned_string("name")? {
                    Some(name) => name,
                    None => fields.owned_string("productName")?.unwrap_or_default(),
                };
                Object::Target(Target {
                    name,
                    build_phases: fields.ids("buildPhases")?,
                })
            }
            isa if isa.ends_with("BuildPhase") => Object::BuildPhase(BuildPhase {
                kind: BuildPhaseKind::from_isa(isa),
                files: fields.ids("files")?,
            }),
            "PBXBuildFile" => Object::BuildFile(BuildFile {
                file_ref: fields.id("fileRef")?,
            }),
            "PBXContainerItemProxy" => Object::ContainerItemProxy(ContainerItemProxy {
                container_portal: fields
                    .id("containerPortal")?
                    .ok_or_else(|| format!("Container proxy {id} has no containerPortal"))?,
                remote_info: fields.owned_string("remoteInfo")?,
            }),
            other => Object::Other {
                isa: other.to_string(),
            },
        })
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            Object::Project(_) => "project",
            Object::Group(_) => "group",
            Object::FileReference(_) => "file reference",
            Object::Target(_) => "target",
            Object::BuildPhase(_) => "build phase",
            Object::BuildFile(_) => "build file",
            Object::ContainerItemProxy(_) => "container item proxy",
            Object::Other { isa } => isa.as_str(),
        }
    }
}

struct Fields<'a> {
    id: &'a ObjectId,
    entries: &'a BTreeMap<String, PlistValue>,
}

impl<'a> Fields<'a> {
    fn new(id: &'a ObjectId, value: &'a PlistValue) -> Result<Self, String> {
        let entries = value
            .as_dictionary()
            .ok_or_else(|| format!("Object {id} is a {}, not a dictionary", value.kind()))?;
        Ok(Self { id, entries })
    }

    fn string(&self, key: &str) -> Result<Option<&'a str>, String> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(PlistValue::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(format!(
                "Object {} field {key} is a {}, expected a string",
                self.id,
                other.kind()
            )),
        }
    }

    fn owned_string(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.string(key)?.map(str::to_string))
    }

    fn id(&self, key: &str) -> Result<Option<ObjectId>, String> {
        Ok(self.string(key)?.map(ObjectId::new))
    }

    fn ids(&self, key: &str) -> Result<Vec<ObjectId>, String> {
        let Some(value) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let values = value.as_array().ok_or_else(|| {
            format!(
                "Object {} field {key} is a {}, expected an array",
                self.id,
                value.kind()
            )
        })?;
        values
            .iter()
            .map(|value| {
                value.as_str().map(ObjectId::new).ok_or_else(|| {
                    format!("Object {} field {key} contains a non-identifier", self.id)
                })
            })
            .collect()
    }

    fn source_tree(&self) -> Result<SourceTree, String> {
        Ok(SourceTree::parse(self.string("sourceTree")?.unwrap_or("<group>")))
    }
}
