//! Path parameters extracted from a matched url.

use crate::route::Route;

/// Represents path parameters extracted from the URL path of a request.
///
/// Path parameters are named segments in the route pattern that can be accessed by name
/// or by position. For example, in the pattern "/posts/{id}", "id" is a path parameter.
/// Extraction order is kept because callable handlers receive the values positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sets `name` to `value`. An existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Gets the value of a path parameter by its name
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Gets the value at `position` in extraction order
    pub fn at(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::empty();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Pulls the named placeholder values of `route` out of `url`.
///
/// Patterns without placeholders yield an empty set without running the regex. A
/// placeholder whose group did not participate, or a url the route does not match at
/// all, yields an empty string for that name.
pub fn extract(url: &str, route: &Route) -> PathParams {
    let pattern = route.pattern();
    if !pattern.has_placeholders() {
        return PathParams::empty();
    }

    let values = pattern.captures(url).unwrap_or_default();
    pattern
        .placeholders()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), values.get(i).map_or("", String::as_str)))
        .collect()
}
