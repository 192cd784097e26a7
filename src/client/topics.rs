/// The configured subscription set, in configured order.
///
/// Parsed from a pipe-delimited string such as `chat|notice`. Empty elements
/// are dropped and a blank string yields no topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topics {
    names: Vec<String>,
}

impl Topics {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        let names = raw
            .split('|')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Broker destinations, `/topic/<name>` for each topic.
    pub fn destinations(&self) -> impl Iterator<Item = String> + '_ {
        self.names.iter().map(|name| format!("/topic/{name}"))
    }
}
