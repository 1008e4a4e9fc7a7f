//! End-to-end runs over header directories on disk.

use portgen::{DirectorySink, PipelineError, PortgenConfig, WorkspaceError, run};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VEC2: &str = r#"
typedef union hmm_vec2
{
    struct
    {
        float X, Y;
    };

    float Elements[2];
} hmm_vec2;
"#;

const MAT2: &str = r#"
typedef struct hmm_mat2
{
    float Elements[2][2];
} hmm_mat2;

static float HMM_Clamp01(float Value)
{
    return Value;
}

float HMM_Lerp(float A, float Time, float B)
{
    return (1.0f - Time) * A + Time * B;
}
"#;

const BROKEN: &str = r#"
typedef union hmm_broken
{
    float X float Y;
} hmm_broken;
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A project with three headers under `include/`, one of them malformed.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "include/a.h", VEC2);
    write(dir.path(), "include/c.h", BROKEN);
    write(dir.path(), "include/sub/b.h", MAT2);
    write(dir.path(), "include/README.md", "not a header");
    dir
}

#[test]
fn test_partial_failure_batch() {
    let dir = project();
    let config = PortgenConfig::load(dir.path());
    let mut sink = DirectorySink::new(config.output_dir());

    let report = run(&config, &mut sink).unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("c.h"));
    assert_eq!(report.types, 2);
    assert_eq!(report.functions, 1);
    assert_eq!(
        report.written,
        vec!["IVector.cs", "Functions.cs", "Vector2.cs", "Matrix2.cs"]
    );

    let out = dir.path().join("generated");
    let vector2 = fs::read_to_string(out.join("Vector2.cs")).unwrap();
    assert!(vector2.contains("    [FieldOffset(4)] public float Y;\n"));
    assert!(vector2.contains("public unsafe partial struct Vector2 : IVector<Vector2, float>"));

    let functions = fs::read_to_string(out.join("Functions.cs")).unwrap();
    assert!(functions.contains("    public static float HMM_Lerp(float A, float Time, float B)\n"));
    assert!(!functions.contains("HMM_Clamp01"));

    let matrix2 = fs::read_to_string(out.join("Matrix2.cs")).unwrap();
    insta::assert_snapshot!(matrix2);
}

#[test]
fn test_config_file_and_stale_output() {
    let dir = project();
    write(
        dir.path(),
        ".portgen/config.toml",
        "input_dir = \"include/sub\"\noutput_dir = \"cs\"\n",
    );
    write(dir.path(), "cs/Numerics.csproj", "<Project Sdk=\"Microsoft.NET.Sdk\" />");
    write(dir.path(), "cs/Vector9.cs", "// stale");

    let config = PortgenConfig::load(dir.path());
    let mut sink = DirectorySink::new(config.output_dir());
    let report = run(&config, &mut sink).unwrap();

    assert_eq!(report.files, 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.removed, 1);

    let out = dir.path().join("cs");
    assert!(out.join("Numerics.csproj").exists());
    assert!(!out.join("Vector9.cs").exists());
    assert!(out.join("Matrix2.cs").exists());
    assert!(!out.join("Vector2.cs").exists());
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = project();
    // A regular file where the output directory should be.
    write(dir.path(), "generated", "occupied");

    let config = PortgenConfig::load(dir.path());
    let mut sink = DirectorySink::new(config.output_dir());
    let err = run(&config, &mut sink).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Workspace(WorkspaceError::Unwritable { .. })
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("generated")).unwrap(),
        "occupied"
    );
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = PortgenConfig::load(dir.path());
    let mut sink = DirectorySink::new(config.output_dir());
    let err = run(&config, &mut sink).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(_)));
    assert!(!dir.path().join("generated").exists());
}
