//! Parser for archive manifests (`META-INF/MANIFEST.MF`).
//!
//! The format is a sequence of sections separated by blank lines. Each section is a
//! list of `Name: value` headers; a line starting with a single space continues the
//! value of the previous header. The first section is the *main* section, every
//! following section describes an entry of the archive.
//!
//! ```text
//! Manifest-Version: 1.0
//! Extension-List: xml tools
//! xml-Extension-Name: org.example.xml
//! xml-Specification-Version: 1.2
//! tools-Extension-Name: org.example.tool
//!  s
//!
//! Name: org/example/Task.class
//! Implementation-Title: task
//! ```
//!
//! Header names compare case-insensitively. Values are trimmed.

/// One section of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    attributes: Vec<(String, String)>,
}

impl Section {
    /// Look up an attribute by name, ignoring ASCII case.
    ///
    /// When a name is repeated the first occurrence wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in file order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A parsed manifest: the main section plus per-entry sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// The first section of the file
    pub main: Section,
    /// Every later section, in file order
    pub entries: Vec<Section>,
}

impl Manifest {
    /// The main section followed by every entry section.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        std::iter::once(&self.main).chain(self.entries.iter())
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns a description of the first syntax error: a header without a `:`
    /// separator, an empty header name, or a continuation line with no header to
    /// continue.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut sections: Vec<Section> = Vec::new();
        let mut current = Section::default();

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

            if line.trim().is_empty() {
                if !current.is_empty() || sections.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let Some((_, value)) = current.attributes.last_mut() else {
                    return Err(format!("line {line_no}: continuation line without a header"));
                };
                value.push_str(continuation);
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                return Err(format!("line {line_no}: expected 'Name: value', found '{line}'"));
            };
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(format!("line {line_no}: invalid header name '{name}'"));
            }

            current.attributes.push((name.to_string(), value.trim_start().to_string()));
        }

        if !current.is_empty() || sections.is_empty() {
            sections.push(current);
        }

        // Values may have gained trailing whitespace through continuations
        for section in &mut sections {
            for (_, value) in &mut section.attributes {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }

        let mut sections = sections.into_iter();
        let main = sections.next().unwrap_or_default();
        Ok(Self {
            main,
            entries: sections.collect(),
        })
    }
}
