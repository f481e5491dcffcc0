//! The object store of a loaded project and its derived parent index.

use crate::error::{Result, XcodeError};
use crate::object::{
    BuildFile, BuildPhase, ContainerItemProxy, FileReference, Group, Object, ObjectId,
    ProjectObject, Target,
};
use crate::plist::PlistValue;
use std::collections::{BTreeMap, HashMap};

/// Maps every group member to the group that lists it.
///
/// Built once when the graph is constructed and never modified afterwards.
/// Construction rejects members claimed by two groups and parent chains that
/// loop, so walking upward always terminates.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<ObjectId, ObjectId>,
}

impl ParentIndex {
    fn build(objects: &BTreeMap<ObjectId, Object>) -> std::result::Result<Self, String> {
        let mut parents = HashMap::new();
        for (id, object) in objects {
            let Object::Group(group) = object else {
                continue;
            };
            for child in &group.children {
                if let Some(previous) = parents.insert(child.clone(), id.clone()) {
                    if previous != *id {
                        return Err(format!(
                            "Object {child} is a member of both group {previous} and group {id}"
                        ));
                    }
                }
            }
        }

        let index = Self { parents };
        index.check_acyclic()?;
        Ok(index)
    }

    fn check_acyclic(&self) -> std::result::Result<(), String> {
        let limit = self.parents.len();
        for start in self.parents.keys() {
            let mut current = start;
            let mut steps = 0;
            while let Some(parent) = self.parents.get(current) {
                steps += 1;
                if steps > limit {
                    return Err(format!("Group hierarchy containing {start} forms a cycle"));
                }
                current = parent;
            }
        }
        Ok(())
    }

    pub fn parent(&self, id: &ObjectId) -> Option<&ObjectId> {
        self.parents.get(id)
    }

    /// Enclosing groups of `id`, innermost first.
    pub fn ancestors<'a>(&'a self, id: &'a ObjectId) -> impl Iterator<Item = &'a ObjectId> + 'a {
        std::iter::successors(self.parent(id), move |current| self.parent(current))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// All objects of a project keyed by identifier, plus the root project object.
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    objects: BTreeMap<ObjectId, Object>,
    root_object: ObjectId,
    parents: ParentIndex,
}

impl ObjectGraph {
    /// Build the graph from the parsed top-level dictionary of a `project.pbxproj`.
    pub fn from_plist(value: &PlistValue) -> std::result::Result<Self, String> {
        let root = value
            .as_dictionary()
            .ok_or_else(|| format!("Top-level value is a {}, not a dictionary", value.kind()))?;
        let entries = root
            .get("objects")
            .and_then(PlistValue::as_dictionary)
            .ok_or_else(|| "Missing objects dictionary".to_string())?;
        let root_object = root
            .get("rootObject")
            .and_then(PlistValue::as_str)
            .map(ObjectId::new)
            .ok_or_else(|| "Missing rootObject".to_string())?;

        let mut objects = BTreeMap::new();
        for (id, value) in entries {
            let id = ObjectId::new(id.as_str());
            let object = Object::from_plist(&id, value)?;
            objects.insert(id, object);
        }

        match objects.get(&root_object) {
            Some(Object::Project(_)) => {}
            Some(other) => {
                return Err(format!(
                    "rootObject {root_object} is a {}, not a project",
                    other.kind()
                ));
            }
            None => return Err(format!("rootObject {root_object} is not defined")),
        }

        let parents = ParentIndex::build(&objects)?;
        Ok(Self {
            objects,
            root_object,
            parents,
        })
    }

    pub fn get(&self, id: &ObjectId) -> Result<&Object> {
        self.objects
            .get(id)
            .ok_or_else(|| XcodeError::MissingObject(id.clone()))
    }

    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn root_id(&self) -> &ObjectId {
        &self.root_object
    }

    pub fn parents(&self) -> &ParentIndex {
        &self.parents
    }

    pub fn project(&self) -> Result<&ProjectObject> {
        match self.get(&self.root_object)? {
            Object::Project(project) => Ok(project),
            other => Err(unexpected(&self.root_object, "project", other)),
        }
    }

    pub fn group(&self, id: &ObjectId) -> Result<&Group> {
        match self.get(id)? {
            Object::Group(group) => Ok(group),
            other => Err(unexpected(id, "group", other)),
        }
    }

    pub fn file_reference(&self, id: &ObjectId) -> Result<&FileReference> {
        match self.get(id)? {
            Object::FileReference(file) => Ok(file),
            other => Err(unexpected(id, "file reference", other)),
        }
    }

    pub fn target(&self, id: &ObjectId) -> Result<&Target> {
        match self.get(id)? {
            Object::Target(target) => Ok(target),
            other => Err(unexpected(id, "target", other)),
        }
    }

    pub fn build_phase(&self, id: &ObjectId) -> Result<&BuildPhase> {
        match self.get(id)? {
            Object::BuildPhase(phase) => Ok(phase),
            other => Err(unexpected(id, "build phase", other)),
        }
    }

    pub fn build_file(&self, id: &ObjectId) -> Result<&BuildFile> {
        match self.get(id)? {
            Object::BuildFile(file) => Ok(file),
            other => Err(unexpected(id, "build file", other)),
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = (&ObjectId, &Group)> {
        self.objects.iter().filter_map(|(id, object)| match object {
            Object::Group(group) => Some((id, group)),
            _ => None,
        })
    }

    pub fn container_proxies(&self) -> impl Iterator<Item = (&ObjectId, &ContainerItemProxy)> {
        self.objects.iter().filter_map(|(id, object)| match object {
            Object::ContainerItemProxy(proxy) => Some((id, proxy)),
            _ => None,
        })
    }
}

fn unexpected(id: &ObjectId, expected: &'static str, found: &Object) -> XcodeError {
    XcodeError::UnexpectedObject {
        id: id.clone(),
        expected,
        found: found.kind().to_string(),
    }
}
