//! Emitting C# from collected entity graphs.

use portgen_codegen::ir::{EntityGraph, FieldInfo, TypeInfo};
use portgen_codegen::{EmitOptions, collect_unit, emit_all};
use portgen_index::parse_cpp;

fn scalar(name: &str, offset: u64) -> FieldInfo {
    FieldInfo {
        name: name.into(),
        source_type: "float".into(),
        target_type: "float".into(),
        offset,
        array_len: None,
        placeholder: false,
    }
}

fn graph_with(ty: TypeInfo) -> EntityGraph {
    let mut graph = EntityGraph::new();
    graph.push_type(ty);
    graph
}

#[test]
fn test_vector2d_without_interfaces() {
    let graph = graph_with(TypeInfo {
        name: "Vector2D".into(),
        source_name: "Vector2D".into(),
        size: 8,
        fields: vec![scalar("X", 0), scalar("Y", 4)],
        methods: Vec::new(),
    });
    let options = EmitOptions {
        emit_interfaces: false,
        ..EmitOptions::default()
    };
    let files = emit_all(&graph, &options);
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["Functions.cs", "Vector2D.cs"]);

    let text = &files[1].contents;
    assert!(text.contains("[FieldOffset(0)] public float X;"));
    assert!(text.contains("[FieldOffset(4)] public float Y;"));
    assert!(!text.contains("IVector"));
    insta::assert_snapshot!(text);
}

#[test]
fn test_three_component_type_gets_two_component_swizzle() {
    let graph = graph_with(TypeInfo {
        name: "Vector3".into(),
        source_name: "hmm_vec3".into(),
        size: 12,
        fields: vec![scalar("X", 0), scalar("Y", 4), scalar("Z", 8)],
        methods: Vec::new(),
    });
    let files = emit_all(&graph, &EmitOptions::default());
    let vector3 = files.iter().find(|f| f.path == "Vector3.cs").unwrap();
    assert!(
        vector3
            .contents
            .contains("    public Vector2 XY => new Vector2 { X = X, Y = Y };\n")
    );
    let swizzles = vector3
        .contents
        .lines()
        .filter(|line| line.starts_with("    public Vector") && line.contains(" => new "))
        .count();
    assert_eq!(swizzles, 36);
}

const HEADER: &str = r#"
typedef union hmm_vec2
{
    struct
    {
        float X, Y;
    };

    float Elements[2];
} hmm_vec2;

typedef union hmm_vec3
{
    struct
    {
        float X, Y, Z;
    };

    struct
    {
        hmm_vec2 XY;
        float Ignored0_;
    };

    float Elements[3];
} hmm_vec3;

hmm_vec3 HMM_AddVec3(hmm_vec3 Left, hmm_vec3 Right)
{
    hmm_vec3 Result;
    Result.X = Left.X + Right.X;
    Result.Y = Left.Y + Right.Y;
    Result.Z = Left.Z + Right.Z;
    return Result;
}

float HMM_DotVec2(hmm_vec2 A, hmm_vec2 B)
{
    return (A.X * B.X) + (A.Y * B.Y);
}
"#;

#[test]
fn test_header_to_csharp() {
    let unit = parse_cpp(HEADER).unwrap();
    let graph = collect_unit(&unit);
    assert_eq!(graph.warning_count(), 0, "{:?}", graph.diagnostics);

    let files = emit_all(&graph, &EmitOptions::default());
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["IVector.cs", "Functions.cs", "Vector2.cs", "Vector3.cs"]);

    let vector3 = &files[3].contents;
    assert!(vector3.contains("[StructLayout(LayoutKind.Explicit, Size = 12)]"));
    assert!(vector3.contains("public unsafe partial struct Vector3 : IVector<Vector3, float>"));
    assert!(vector3.contains("    [FieldOffset(8)] public float Z;\n"));
    assert!(vector3.contains("    [FieldOffset(0)] public Vector2 XY;\n"));
    assert!(vector3.contains("    [FieldOffset(8)] public float Ignored0_;\n"));
    assert!(vector3.contains("    [FieldOffset(0)] public fixed float Elements[3];\n"));
    assert!(!vector3.contains("public Vector2 XY =>"));
    assert!(vector3.contains("    public Vector2 YX => new Vector2 { X = Y, Y = X };\n"));

    let functions = &files[1].contents;
    assert!(functions.contains(
        "    public static Vector3 HMM_AddVec3(Vector3 Left, Vector3 Right)\n    {\n        \
         Vector3 Result = default;\n        Result.X = Left.X + Right.X;\n"
    ));
    assert!(functions.contains("        return (A.X * B.X) + (A.Y * B.Y);\n"));
}

#[test]
fn test_named_anonymous_member_is_not_stored_as_pointer() {
    let unit = parse_cpp("struct Outer { struct { float a, b, c; } inner; float tail; };").unwrap();
    let graph = collect_unit(&unit);
    assert!(
        graph
            .diagnostics
            .iter()
            .any(|d| d.entity == "Outer.inner" && d.message.contains("placeholder"))
    );

    let files = emit_all(&graph, &EmitOptions::default());
    let outer = files.iter().find(|f| f.path == "Outer.cs").unwrap();
    let text = &outer.contents;
    assert!(text.contains("[StructLayout(LayoutKind.Explicit, Size = 16)]"));
    assert!(!text.contains("nint inner"));
    assert!(text.contains(
        "    // [FieldOffset(0)] inner: unrecognised type `(anonymous struct)`, not emitted\n"
    ));
    assert!(text.contains("    [FieldOffset(12)] public float tail;\n"));
}
