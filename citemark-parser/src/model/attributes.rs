use serde::{
    Serialize,
    ser::{SerializeMap, Serializer},
};

use super::location::Location;

pub const ID: &str = "id";
pub const TYPE: &str = "type";
pub const AUTHOR_ID: &str = "authorid";
pub const AUTHOR_ID2: &str = "authorid2";
pub const TITLE_ID: &str = "titleid";
pub const CHAPTER_ID: &str = "chapterid";

/// Attribute names the parser understands. Everything else is kept but reported.
pub const KNOWN: [&str; 6] = [ID, TYPE, AUTHOR_ID, AUTHOR_ID2, TITLE_ID, CHAPTER_ID];

/// An `AttributeName` represents the name of an attribute on a tag.
pub type AttributeName = String;

/// The value of the sentinel identifier that points at the commentary's root text.
pub const ROOT: &str = "ROOT";

/// One `name="value"` pair as written on a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Attribute {
    pub name: AttributeName,
    pub value: String,
    #[serde(skip)]
    pub location: Location,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location,
        }
    }
}

/// The open attribute map of a tag.
///
/// Attributes keep their source order, so re-serialising a tag writes them back in
/// the order they were read. Repeated names are kept as well; lookups always see the
/// first occurrence.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Attributes(Vec<Attribute>);

impl Serialize for Attributes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Repeated names are dropped here: only the first one is meaningful, the rest
        // show up as findings.
        let mut state = serializer.serialize_map(None)?;
        for (position, attribute) in self.0.iter().enumerate() {
            if self.first_position(&attribute.name) == Some(position) {
                state.serialize_entry(&attribute.name, &attribute.value)?;
            }
        }
        state.end()
    }
}

impl Attributes {
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an attribute. Repeated names are kept in order.
    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    /// Value of the first attribute with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|attribute| attribute.name == name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|attribute| attribute.name == name)
    }

    /// Every occurrence of a name after the first.
    pub fn repeats(&self) -> impl Iterator<Item = &Attribute> {
        self.0
            .iter()
            .enumerate()
            .filter(|(position, attribute)| self.first_position(&attribute.name) != Some(*position))
            .map(|(_, attribute)| attribute)
    }

    fn first_position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|attribute| attribute.name == name)
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether `name` is one of the load-bearing attribute names.
#[must_use]
pub fn is_known(name: &str) -> bool {
    KNOWN.contains(&name)
}
