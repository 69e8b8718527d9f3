use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use checker__analysis_framework::{Analyzer, FactStore, PassFile, PassInput, run_analyzer};
use checker__diagnostics::AnalysisDiagnostic;
use checker__package_graph::{ImportEdge, PackageGraph};
use checker__parsing::parse_file;
use checker__reports::{CheckFailure, CheckFailureDetail, CheckFailureKind, RenderedDiagnostic};
use checker__source::{FileId, FileRole, display_relative_to, path_to_key};
use checker__syntax::ParsedFile;
use checker__type_resolution::resolve_package;
use checker__types::TypeUniverse;
use checker__workspace::{discover_workspace, find_workspace_root, select_packages};
use tracing::{debug, warn};

pub use checker__workspace::BuildContext;

/// How files become packages.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Files excluded by their name suffix or build constraint are dropped
    /// before parsing.
    pub build_context: BuildContext,
    /// Also analyze each matched package with its `_test.go` files, plus
    /// its external `_test` package.
    pub include_tests: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            build_context: BuildContext::host(),
            include_tests: true,
        }
    }
}

/// A Go source file held in memory. The path is used as given, both for
/// rendering and for the external-file check. Names ending in `_test.go`
/// are test files.
#[derive(Clone, Debug)]
pub struct InMemoryFile {
    pub path: PathBuf,
    pub source: String,
}

#[derive(Clone, Debug)]
pub struct InMemoryPackage {
    pub import_path: String,
    pub files: Vec<InMemoryFile>,
}

impl InMemoryPackage {
    pub fn new(import_path: impl Into<String>, files: &[(&str, &str)]) -> Self {
        Self {
            import_path: import_path.into(),
            files: files
                .iter()
                .map(|(path, source)| InMemoryFile {
                    path: PathBuf::from(path),
                    source: (*source).to_string(),
                })
                .collect(),
        }
    }
}

pub struct CheckedPackages {
    /// Diagnostics of the root packages, sorted by path and position.
    pub diagnostics: Vec<RenderedDiagnostic>,
    pub fact_store: FactStore,
}

struct FileUnit {
    id: FileId,
    role: FileRole,
    absolute_path: PathBuf,
    display_path: String,
    source: String,
}

struct PackageUnit {
    import_path: String,
    files: Vec<FileUnit>,
    is_root: bool,
}

struct ParsedPackage<'a> {
    unit: &'a PackageUnit,
    package_name: String,
    files: Vec<ParsedUnit<'a>>,
    /// `_test.go` files declaring the package itself.
    test_files: Vec<ParsedUnit<'a>>,
    /// `_test.go` files declaring `<name>_test`.
    external_test_files: Vec<ParsedUnit<'a>>,
}

impl<'a> ParsedPackage<'a> {
    fn all_test_files(&self) -> impl Iterator<Item = &ParsedUnit<'a>> {
        self.test_files.iter().chain(&self.external_test_files)
    }
}

/// Analyzes packages given as source text. Every package is a root package.
pub fn check_sources(
    analyzer: &dyn Analyzer,
    options: &LoadOptions,
    packages: &[InMemoryPackage],
) -> Result<CheckedPackages, CheckFailure> {
    let mut next_file_id = 0usize;
    let units = packages
        .iter()
        .map(|package| PackageUnit {
            import_path: package.import_path.clone(),
            files: package
                .files
                .iter()
                .map(|file| {
                    let id = FileId(next_file_id);
                    next_file_id += 1;
                    FileUnit {
                        id,
                        role: FileRole::from_path(&file.path).unwrap_or(FileRole::Source),
                        absolute_path: file.path.clone(),
                        display_path: path_to_key(&file.path),
                        source: file.source.clone(),
                    }
                })
                .collect(),
            is_root: true,
        })
        .collect();
    analyze_packages(analyzer, options, units)
}

/// Analyzes the packages of the workspace enclosing `working_directory`
/// that match `patterns`. Packages they import are analyzed too, for their
/// facts, but only the matched packages report diagnostics.
pub fn check_patterns(
    analyzer: &dyn Analyzer,
    options: &LoadOptions,
    working_directory: &Path,
    patterns: &[String],
) -> Result<CheckedPackages, CheckFailure> {
    let root = find_workspace_root(working_directory).map_err(|error| {
        CheckFailure::new(
            CheckFailureKind::WorkspaceNotFound,
            error.message,
            error.path.map(|path| path_to_key(&path)),
        )
    })?;
    let workspace = discover_workspace(&root).map_err(|errors| CheckFailure {
        kind: CheckFailureKind::WorkspaceDiscoveryFailed,
        message: "workspace discovery failed".to_string(),
        path: Some(path_to_key(&root.directory)),
        details: errors
            .into_iter()
            .map(|error| CheckFailureDetail {
                message: error.message,
                path: error.path.map(|path| path_to_key(&path)),
            })
            .collect(),
    })?;
    let selected: BTreeSet<_> = select_packages(&workspace, working_directory, patterns)
        .map_err(|error| {
            CheckFailure::new(
                CheckFailureKind::InvalidPackagePattern,
                error.message,
                error.path.map(|path| path_to_key(&path)),
            )
        })?
        .into_iter()
        .collect();
    debug!(
        root = %workspace.root_directory().display(),
        packages = workspace.packages().len(),
        selected = selected.len(),
        "discovered workspace"
    );

    let mut units = Vec::new();
    for package in workspace.packages() {
        let mut files = Vec::new();
        for source_file in &package.source_files {
            let absolute_path = workspace.absolute_path(&source_file.workspace_relative_path);
            let display_path = display_relative_to(&absolute_path, working_directory);
            let source = fs::read_to_string(&absolute_path).map_err(|error| {
                CheckFailure::new(
                    CheckFailureKind::ReadSource,
                    error.to_string(),
                    Some(display_path.clone()),
                )
            })?;
            files.push(FileUnit {
                id: source_file.id,
                role: source_file.role,
                absolute_path,
                display_path,
                source,
            });
        }
        units.push(PackageUnit {
            import_path: package.import_path.clone(),
            files,
            is_root: selected.contains(&package.id),
        });
    }
    analyze_packages(analyzer, options, units)
}

type ParsedUnit<'a> = (&'a FileUnit, ParsedFile);

fn analyze_packages(
    analyzer: &dyn Analyzer,
    options: &LoadOptions,
    units: Vec<PackageUnit>,
) -> Result<CheckedPackages, CheckFailure> {
    let mut parse_failures: BTreeMap<&str, Vec<CheckFailureDetail>> = BTreeMap::new();
    let mut clause_failures: BTreeMap<&str, Vec<CheckFailureDetail>> = BTreeMap::new();
    let mut parsed_packages: BTreeMap<String, ParsedPackage<'_>> = BTreeMap::new();
    for unit in &units {
        let mut sources = Vec::new();
        let mut tests = Vec::new();
        for file in &unit.files {
            if file.role == FileRole::Test && !options.include_tests {
                continue;
            }
            if !options
                .build_context
                .includes(&file.absolute_path, &file.source)
            {
                continue;
            }
            match parse_file(&file.source) {
                Ok(parsed) if file.role == FileRole::Test => tests.push((file, parsed)),
                Ok(parsed) => sources.push((file, parsed)),
                Err(diagnostics) => {
                    let details = parse_failures.entry(unit.import_path.as_str()).or_default();
                    details.extend(diagnostics.into_iter().map(|diagnostic| {
                        CheckFailureDetail {
                            message: format!(
                                "{}:{}: {}",
                                diagnostic.span.line, diagnostic.span.column, diagnostic.message
                            ),
                            path: Some(file.display_path.clone()),
                        }
                    }));
                }
            }
        }
        match assemble_package(unit, sources, tests) {
            Ok(Some(package)) => {
                parsed_packages.insert(unit.import_path.clone(), package);
            }
            Ok(None) => {}
            Err(details) => clause_failures
                .entry(unit.import_path.as_str())
                .or_default()
                .extend(details),
        }
    }

    let import_edges = import_edges(&parsed_packages);
    let full_graph = PackageGraph::new(
        units.iter().map(|unit| unit.import_path.clone()),
        &import_edges,
    );
    let mut needed: BTreeSet<String> = BTreeSet::new();
    for unit in units.iter().filter(|unit| unit.is_root) {
        needed.insert(unit.import_path.clone());
        needed.extend(full_graph.transitive_imports(&unit.import_path));
        if !options.include_tests {
            continue;
        }
        if let Some(package) = parsed_packages.get(&unit.import_path) {
            needed.extend(imports_of(&full_graph, package.all_test_files()));
        }
    }

    let mut details = Vec::new();
    for (import_path, failures) in parse_failures {
        if needed.contains(import_path) {
            details.extend(failures);
        } else {
            warn!(package = import_path, "skipping package with syntax errors");
        }
    }
    if !details.is_empty() {
        return Err(CheckFailure {
            kind: CheckFailureKind::ParseFailed,
            message: format!("failed to parse {} source file(s)", count_files(&details)),
            path: None,
            details,
        });
    }

    let mut details = Vec::new();
    let mut conflicting_packages = 0usize;
    for (import_path, failures) in clause_failures {
        if needed.contains(import_path) {
            conflicting_packages += 1;
            details.extend(failures);
        } else {
            warn!(package = import_path, "skipping package with conflicting package clauses");
        }
    }
    if !details.is_empty() {
        return Err(CheckFailure {
            kind: CheckFailureKind::PackageClauseMismatch,
            message: format!("conflicting package clauses in {conflicting_packages} package(s)"),
            path: None,
            details,
        });
    }

    let graph = PackageGraph::new(
        needed
            .iter()
            .filter(|import_path| parsed_packages.contains_key(*import_path))
            .cloned(),
        &import_edges,
    );
    let order = graph.dependency_order().map_err(|error| CheckFailure {
        kind: CheckFailureKind::ImportCycle,
        message: error.to_string(),
        path: error.path.as_deref().map(path_to_key),
        details: Vec::new(),
    })?;

    let package_names: HashMap<String, String> = parsed_packages
        .iter()
        .map(|(import_path, package)| (import_path.clone(), package.package_name.clone()))
        .collect();
    let display_path_by_file: HashMap<FileId, &str> = units
        .iter()
        .flat_map(|unit| &unit.files)
        .map(|file| (file.id, file.display_path.as_str()))
        .collect();
    let in_order = |imports: &BTreeSet<String>| -> Vec<String> {
        order
            .iter()
            .filter(|path| imports.contains(*path))
            .cloned()
            .collect()
    };

    let mut universe = TypeUniverse::new();
    let mut fact_store = FactStore::new();
    let mut diagnostics = Vec::new();
    for import_path in &order {
        let Some(package) = parsed_packages.get(import_path) else {
            continue;
        };
        let variant = PackageVariant {
            package_path: import_path.clone(),
            package_name: package.package_name.clone(),
            files: package.files.iter().map(|(file, parsed)| (*file, parsed)).collect(),
            imported_package_paths: in_order(&graph.transitive_imports(import_path)),
        };
        let found =
            analyze_variant(analyzer, &mut universe, &mut fact_store, &package_names, variant)?;
        if package.unit.is_root {
            diagnostics.extend(found);
        }
    }

    // Test variants see the universe and facts of the plain packages but
    // never leak into them.
    if options.include_tests {
        for import_path in &order {
            let Some(package) = parsed_packages.get(import_path) else {
                continue;
            };
            if !package.unit.is_root {
                continue;
            }
            let mut test_universe = universe.clone();
            let mut test_facts = fact_store.clone();

            if !package.test_files.is_empty() {
                let mut imports = graph.transitive_imports(import_path);
                imports.extend(imports_of(&graph, &package.test_files));
                imports.remove(import_path);
                let variant = PackageVariant {
                    package_path: import_path.clone(),
                    package_name: package.package_name.clone(),
                    files: package
                        .files
                        .iter()
                        .chain(&package.test_files)
                        .map(|(file, parsed)| (*file, parsed))
                        .collect(),
                    imported_package_paths: in_order(&imports),
                };
                diagnostics.extend(analyze_variant(
                    analyzer,
                    &mut test_universe,
                    &mut test_facts,
                    &package_names,
                    variant,
                )?);
            }

            if !package.external_test_files.is_empty() {
                let imports = imports_of(&graph, &package.external_test_files);
                let variant = PackageVariant {
                    package_path: format!("{import_path}_test"),
                    package_name: format!("{}_test", package.package_name),
                    files: package
                        .external_test_files
                        .iter()
                        .map(|(file, parsed)| (*file, parsed))
                        .collect(),
                    imported_package_paths: in_order(&imports),
                };
                diagnostics.extend(analyze_variant(
                    analyzer,
                    &mut test_universe,
                    &mut test_facts,
                    &package_names,
                    variant,
                )?);
            }
        }
    }

    let mut diagnostics: Vec<RenderedDiagnostic> = diagnostics
        .into_iter()
        .map(|diagnostic| render_diagnostic(&display_path_by_file, diagnostic))
        .collect();
    diagnostics.sort_by(|left, right| {
        left.path
            .cmp(&right.path)
            .then(left.line.cmp(&right.line))
            .then(left.column.cmp(&right.column))
            .then(left.message.cmp(&right.message))
    });
    // A test variant repeats the findings of its plain package.
    diagnostics.dedup();

    Ok(CheckedPackages {
        diagnostics,
        fact_store,
    })
}

/// One set of files analyzed as a package: a plain package, its test
/// variant or its external test package.
struct PackageVariant<'a> {
    package_path: String,
    package_name: String,
    files: Vec<(&'a FileUnit, &'a ParsedFile)>,
    imported_package_paths: Vec<String>,
}

fn analyze_variant(
    analyzer: &dyn Analyzer,
    universe: &mut TypeUniverse,
    fact_store: &mut FactStore,
    package_names: &HashMap<String, String>,
    variant: PackageVariant<'_>,
) -> Result<Vec<AnalysisDiagnostic>, CheckFailure> {
    let resolver_files: Vec<(FileId, &ParsedFile)> = variant
        .files
        .iter()
        .map(|&(file, parsed)| (file.id, parsed))
        .collect();
    let type_info = resolve_package(universe, &variant.package_path, &resolver_files, package_names);

    let package_path = variant.package_path.clone();
    let input = PassInput {
        package_name: variant.package_name,
        package_path: variant.package_path,
        files: variant
            .files
            .iter()
            .map(|&(file, parsed)| PassFile {
                id: file.id,
                absolute_path: &file.absolute_path,
                parsed,
            })
            .collect(),
        type_info: &type_info,
        universe: &*universe,
        imported_package_paths: variant.imported_package_paths,
    };
    let diagnostics = run_analyzer(analyzer, input, fact_store).map_err(|error| {
        CheckFailure::new(
            CheckFailureKind::AnalysisFailed,
            error.to_string(),
            Some(package_path.clone()),
        )
    })?;
    debug!(
        package = %package_path,
        diagnostics = diagnostics.len(),
        "analyzed package"
    );
    Ok(diagnostics)
}

/// Sorts test files into in-package and external ones. The package name
/// comes from the non-test files, or from the test files when there are
/// none. A file disagreeing with it makes the package unloadable; no single
/// file decides the name for the others.
fn assemble_package<'a>(
    unit: &'a PackageUnit,
    sources: Vec<ParsedUnit<'a>>,
    tests: Vec<ParsedUnit<'a>>,
) -> Result<Option<ParsedPackage<'a>>, Vec<CheckFailureDetail>> {
    let candidates: BTreeSet<&str> = if sources.is_empty() {
        tests
            .iter()
            .map(|(_, parsed)| {
                let name = parsed.package_name.name.as_str();
                name.strip_suffix("_test").unwrap_or(name)
            })
            .collect()
    } else {
        sources
            .iter()
            .map(|(_, parsed)| parsed.package_name.name.as_str())
            .collect()
    };
    let package_name = {
        let mut names = candidates.into_iter();
        match (names.next(), names.next()) {
            (None, _) => return Ok(None),
            (Some(name), None) => name.to_string(),
            (Some(_), Some(_)) => return Err(clause_details(&sources, &tests)),
        }
    };

    let external_name = format!("{package_name}_test");
    let mut test_files = Vec::new();
    let mut external_test_files = Vec::new();
    for test in &tests {
        let clause = test.1.package_name.name.as_str();
        if clause != package_name && clause != external_name {
            return Err(clause_details(&sources, &tests));
        }
    }
    for (file, parsed) in tests {
        if parsed.package_name.name == package_name {
            test_files.push((file, parsed));
        } else {
            external_test_files.push((file, parsed));
        }
    }
    Ok(Some(ParsedPackage {
        unit,
        package_name,
        files: sources,
        test_files,
        external_test_files,
    }))
}

fn clause_details(sources: &[ParsedUnit<'_>], tests: &[ParsedUnit<'_>]) -> Vec<CheckFailureDetail> {
    sources
        .iter()
        .chain(tests)
        .map(|(file, parsed)| CheckFailureDetail {
            message: format!("package {}", parsed.package_name.name),
            path: Some(file.display_path.clone()),
        })
        .collect()
}

/// Workspace packages imported by `files`, with their own transitive
/// imports.
fn imports_of<'p, 'f: 'p>(
    graph: &PackageGraph,
    files: impl IntoIterator<Item = &'p ParsedUnit<'f>>,
) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    for (_, parsed) in files {
        for import in &parsed.imports {
            let transitive = graph.transitive_imports(&import.path);
            if graph.contains(&import.path) {
                imports.insert(import.path.clone());
            }
            imports.extend(transitive);
        }
    }
    imports
}

fn import_edges(parsed_packages: &BTreeMap<String, ParsedPackage<'_>>) -> Vec<ImportEdge> {
    let mut edges = Vec::new();
    for (import_path, package) in parsed_packages {
        for (file, parsed) in &package.files {
            for import in &parsed.imports {
                edges.push(ImportEdge {
                    source_package_path: import_path.clone(),
                    target_package_path: import.path.clone(),
                    source_path: PathBuf::from(&file.display_path),
                    import_span: import.span.clone(),
                });
            }
        }
    }
    edges
}

fn count_files(details: &[CheckFailureDetail]) -> usize {
    details
        .iter()
        .filter_map(|detail| detail.path.as_deref())
        .collect::<BTreeSet<_>>()
        .len()
}

fn render_diagnostic(
    display_path_by_file: &HashMap<FileId, &str>,
    diagnostic: AnalysisDiagnostic,
) -> RenderedDiagnostic {
    RenderedDiagnostic {
        analyzer: diagnostic.analyzer.to_string(),
        path: display_path_by_file
            .get(&diagnostic.position.file)
            .map_or_else(|| diagnostic.position.to_string(), ToString::to_string),
        line: diagnostic.position.span.line,
        column: diagnostic.position.span.column,
        message: diagnostic.message,
    }
}
