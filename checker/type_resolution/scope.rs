use std::collections::HashMap;

use checker__syntax::ParsedFile;

/// Names a file brings into scope through its imports.
#[derive(Clone, Debug, Default)]
pub struct FileScope {
    imports_by_name: HashMap<String, String>,
    dot_imports: Vec<String>,
}

impl FileScope {
    /// `package_names` maps the import paths of workspace packages to their
    /// declared names; other imports fall back to the name Go tooling would
    /// guess from the path.
    #[must_use]
    pub fn from_imports(file: &ParsedFile, package_names: &HashMap<String, String>) -> Self {
        let mut scope = Self::default();
        for import in &file.imports {
            let name = match &import.name {
                Some(name) if name.name == "_" => continue,
                Some(name) if name.name == "." => {
                    scope.dot_imports.push(import.path.clone());
                    continue;
                }
                Some(name) => name.name.clone(),
                None => package_names
                    .get(&import.path)
                    .cloned()
                    .unwrap_or_else(|| guess_package_name(&import.path)),
            };
            scope.imports_by_name.insert(name, import.path.clone());
        }
        scope
    }

    #[must_use]
    pub fn import_path(&self, name: &str) -> Option<&str> {
        self.imports_by_name.get(name).map(String::as_str)
    }

    pub fn dot_imports(&self) -> impl Iterator<Item = &str> {
        self.dot_imports.iter().map(String::as_str)
    }
}

/// `gopkg.in/yaml.v3` is `yaml`, `github.com/x/go-cmp/v2` is `cmp`.
fn guess_package_name(import_path: &str) -> String {
    let mut segments = import_path.rsplit('/');
    let mut last = segments.next().unwrap_or(import_path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|character| character.is_ascii_digit());
    if is_major_version && let Some(previous) = segments.next() {
        last = previous;
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.split(['.', '-'])
        .next()
        .unwrap_or(last)
        .to_string()
}

