use std::collections::HashMap;
use std::path::PathBuf;

use checker__analysis_framework::{
    AnalysisError, Analyzer, FactStore, Pass, PackageFact, PassFile, PassInput, run_analyzer,
};
use checker__parsing::parse_file;
use checker__source::{FileId, Position};
use checker__syntax::{ParsedFile, Spec, is_exported};
use checker__type_resolution::{PackageTypeInfo, resolve_package};
use checker__types::TypeUniverse;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ExportedTypes {
    names: Vec<String>,
}

impl PackageFact for ExportedTypes {}

/// Reports exported type names that an imported package already exports.
struct DuplicateExports;

impl Analyzer for DuplicateExports {
    fn name(&self) -> &'static str {
        "duplicateexports"
    }

    fn doc(&self) -> &'static str {
        "report exported type names shadowing an imported package's"
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<(), AnalysisError> {
        let imported: Vec<String> = pass
            .all_package_facts::<ExportedTypes>()?
            .into_iter()
            .flat_map(|(_, fact)| fact.names)
            .collect();

        let mut names = Vec::new();
        let mut reports = Vec::new();
        for file in pass.files() {
            for declaration in file.parsed.generic_declarations() {
                for spec in &declaration.specs {
                    let Spec::Type(spec) = spec else {
                        continue;
                    };
                    if !is_exported(&spec.name.name) {
                        continue;
                    }
                    if imported.contains(&spec.name.name) {
                        reports.push((
                            Position::new(file.id, spec.name.span.clone()),
                            format!("{} is already exported", spec.name.name),
                        ));
                    }
                    names.push(spec.name.name.clone());
                }
            }
        }
        for (position, message) in reports {
            pass.report(position, message);
        }
        pass.export_package_fact(&ExportedTypes { names })
    }
}

struct ResolvedPackage {
    path: String,
    parsed: ParsedFile,
    file: FileId,
    absolute_path: PathBuf,
}

fn package(path: &str, file: usize, source: &str) -> ResolvedPackage {
    ResolvedPackage {
        path: path.to_string(),
        parsed: parse_file(source).unwrap_or_else(|diagnostics| panic!("{diagnostics:?}")),
        file: FileId(file),
        absolute_path: PathBuf::from(format!("/work/{path}/file.go")),
    }
}

fn run(
    package: &ResolvedPackage,
    info: &PackageTypeInfo,
    universe: &TypeUniverse,
    imported_package_paths: &[&str],
    fact_store: &mut FactStore,
) -> Result<Vec<checker__diagnostics::AnalysisDiagnostic>, AnalysisError> {
    let input = PassInput {
        package_name: package.parsed.package_name.name.clone(),
        package_path: package.path.clone(),
        files: vec![PassFile {
            id: package.file,
            absolute_path: &package.absolute_path,
            parsed: &package.parsed,
        }],
        type_info: info,
        universe,
        imported_package_paths: imported_package_paths
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    run_analyzer(&DuplicateExports, input, fact_store)
}

#[test]
fn facts_flow_from_dependencies_to_importers() {
    let base = package("m/base", 0, "package base\n\ntype Shared struct{}\ntype Base int\n");
    let top = package(
        "m/top",
        1,
        "package top\n\nimport \"m/base\"\n\ntype Shared struct{}\ntype Local struct{}\n\nvar _ base.Base\n",
    );
    let mut universe = TypeUniverse::new();
    let names = HashMap::new();
    let base_info = resolve_package(&mut universe, &base.path, &[(base.file, &base.parsed)], &names);
    let top_info = resolve_package(&mut universe, &top.path, &[(top.file, &top.parsed)], &names);
    let mut fact_store = FactStore::new();

    let base_diagnostics = run(&base, &base_info, &universe, &[], &mut fact_store).unwrap();
    assert!(base_diagnostics.is_empty());
    assert_eq!(
        fact_store.import::<ExportedTypes>("duplicateexports", "m/base").unwrap(),
        Some(ExportedTypes {
            names: vec!["Shared".to_string(), "Base".to_string()]
        })
    );

    let top_diagnostics = run(&top, &top_info, &universe, &["m/base"], &mut fact_store).unwrap();
    assert_eq!(top_diagnostics.len(), 1);
    assert_eq!(top_diagnostics[0].analyzer, "duplicateexports");
    assert_eq!(top_diagnostics[0].message, "Shared is already exported");
    assert_eq!(top_diagnostics[0].position.file, FileId(1));
    assert_eq!(top_diagnostics[0].position.span.line, 5);
    assert_eq!(
        fact_store.packages_with_facts("duplicateexports").collect::<Vec<_>>(),
        vec!["m/base", "m/top"]
    );
}

#[test]
fn facts_of_packages_not_imported_are_invisible() {
    let first = package("m/first", 0, "package first\n\ntype Shared struct{}\n");
    let second = package("m/second", 1, "package second\n\ntype Shared struct{}\n");
    let mut universe = TypeUniverse::new();
    let names = HashMap::new();
    let first_info =
        resolve_package(&mut universe, &first.path, &[(first.file, &first.parsed)], &names);
    let second_info =
        resolve_package(&mut universe, &second.path, &[(second.file, &second.parsed)], &names);
    let mut fact_store = FactStore::new();

    run(&first, &first_info, &universe, &[], &mut fact_store).unwrap();
    let diagnostics = run(&second, &second_info, &universe, &[], &mut fact_store).unwrap();
    assert!(diagnostics.is_empty());
}

#[test]
fn malformed_facts_are_framework_failures() {
    let top = package("m/top", 0, "package top\n\ntype Shared struct{}\n");
    let mut universe = TypeUniverse::new();
    let info = resolve_package(
        &mut universe,
        &top.path,
        &[(top.file, &top.parsed)],
        &HashMap::new(),
    );
    let mut fact_store = FactStore::new();
    fact_store.insert_encoded("duplicateexports", "m/base", "{\"names\": 3}".to_string());

    let error = run(&top, &info, &universe, &["m/base"], &mut fact_store)
        .expect_err("decoding should fail");
    assert!(matches!(
        &error,
        AnalysisError::MalformedFact { package_path, .. } if package_path == "m/base"
    ));
    assert!(
        error
            .to_string()
            .starts_with("malformed duplicateexports fact for package m/base")
    );
}
